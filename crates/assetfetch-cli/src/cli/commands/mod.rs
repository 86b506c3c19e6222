//! CLI command handlers, one file per subcommand.

mod interrupt;
mod placeholder;
mod plan;
mod run;

pub use placeholder::run_placeholder;
pub use plan::run_plan;
pub use run::run_batch;
