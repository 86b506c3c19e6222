//! Ctrl-C wiring for `assetfetch run`: the first interrupt stops the run at the
//! next entry boundary, a second one exits immediately.

use assetfetch_core::control::RunControl;
use std::io;

/// Exit status after a second interrupt (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InterruptAction {
    /// A stop was requested; the in-flight entry finishes first.
    StopRequested,
    /// A stop was already pending; give up without waiting.
    Exit,
}

pub(crate) fn on_interrupt(control: &RunControl) -> InterruptAction {
    if control.is_stop_requested() {
        InterruptAction::Exit
    } else {
        control.request_stop();
        InterruptAction::StopRequested
    }
}

/// Listen for Ctrl-C on a background thread with its own single-threaded runtime.
pub(crate) fn spawn_interrupt_listener(control: RunControl) -> io::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::Builder::new()
        .name("assetfetch-interrupt".to_string())
        .spawn(move || {
            rt.block_on(async move {
                loop {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::warn!(error = %e, "interrupt listener stopped");
                        return;
                    }
                    match on_interrupt(&control) {
                        InterruptAction::StopRequested => {
                            tracing::info!("interrupt received; stopping after the current entry");
                            eprintln!("Stopping after the current entry (Ctrl-C again to quit now).");
                        }
                        InterruptAction::Exit => {
                            tracing::warn!("second interrupt; exiting");
                            std::process::exit(INTERRUPTED_EXIT_CODE);
                        }
                    }
                }
            })
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_interrupt_stops_second_exits() {
        let control = RunControl::new();
        let runner_side = control.clone();
        assert_eq!(on_interrupt(&control), InterruptAction::StopRequested);
        assert!(runner_side.check().is_err());
        assert_eq!(on_interrupt(&control), InterruptAction::Exit);
    }
}
