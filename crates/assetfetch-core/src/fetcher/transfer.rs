//! One HTTP GET streamed into the destination file.

use super::error::FetchError;
use crate::config::HttpConfig;
use crate::http::{self, ResponseHead};
use crate::media::MediaKind;
use crate::storage::DestinationWriter;
use std::cell::{Cell, RefCell};
use std::io;
use std::path::Path;
use std::time::Duration;

/// Abort the transfer when throughput stays below this many bytes/s for the stall timeout.
const LOW_SPEED_LIMIT: u32 = 1024;

/// What happens to body bytes of the final response.
enum Sink {
    /// No body bytes seen yet.
    Undecided,
    Writing(DestinationWriter),
    /// Error statuses: the body is read and dropped, never written to disk.
    Discarding,
    /// Partial response for an offset we did not ask for; transfer aborted.
    RangeMismatch(Option<u64>),
    /// A document where media was expected; transfer aborted.
    WrongType(String),
    /// Local write failed; transfer aborted.
    Failed(io::Error),
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Report {
    /// Offset the server resumed from (0 for a full response).
    pub offset: u64,
    pub written: u64,
    pub file_len: u64,
    pub total: Option<u64>,
}

pub(super) enum TransferEnd {
    Done(Report),
    /// 206 for a different start than requested; nothing was written.
    RangeNotHonored { got_start: Option<u64> },
    /// 416; `total` from `Content-Range: bytes */N` if present.
    Unsatisfiable { total: Option<u64> },
}

/// Performs one GET. With `offset > 0` a `Range: bytes=offset-` header is sent.
pub(super) fn transfer(
    url: &str,
    destination: &Path,
    offset: u64,
    kind: MediaKind,
    cfg: &HttpConfig,
    progress: &mut dyn FnMut(u64, Option<u64>),
) -> Result<TransferEnd, FetchError> {
    let mut easy = http::base_handle(url, cfg).map_err(FetchError::Transport)?;
    let chunk_size = cfg.chunk_size_bytes.max(1);
    easy.buffer_size(chunk_size).map_err(FetchError::Transport)?;
    easy.low_speed_limit(LOW_SPEED_LIMIT)
        .map_err(FetchError::Transport)?;
    easy.low_speed_time(Duration::from_secs(cfg.stall_timeout_secs))
        .map_err(FetchError::Transport)?;
    if offset > 0 {
        easy.range(&format!("{}-", offset))
            .map_err(FetchError::Transport)?;
    }

    let head = RefCell::new(ResponseHead::default());
    let sink = RefCell::new(Sink::Undecided);
    let total: Cell<Option<u64>> = Cell::new(None);

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|line| {
                head.borrow_mut().on_line(line);
                true
            })
            .map_err(FetchError::Transport)?;
        transfer
            .write_function(|data| {
                let mut sink = sink.borrow_mut();
                if matches!(*sink, Sink::Undecided) {
                    let (next, t) = decide(&head.borrow(), offset, kind, destination);
                    *sink = next;
                    total.set(t);
                }
                let write_result = match &mut *sink {
                    Sink::Writing(w) => {
                        let mut result = Ok(());
                        for chunk in data.chunks(chunk_size) {
                            if let Err(e) = w.write_chunk(chunk) {
                                result = Err(e);
                                break;
                            }
                            progress(w.file_len(), total.get());
                        }
                        result
                    }
                    Sink::Discarding => return Ok(data.len()),
                    _ => return Ok(0),
                };
                match write_result {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        *sink = Sink::Failed(e);
                        Ok(0)
                    }
                }
            })
            .map_err(FetchError::Transport)?;
        transfer.perform()
    };

    let sink = sink.into_inner();
    let head = head.into_inner();

    if let Err(e) = performed {
        return match sink {
            Sink::Failed(io_err) => Err(FetchError::local_io(destination, io_err)),
            Sink::RangeMismatch(got_start) if e.is_write_error() => {
                Ok(TransferEnd::RangeNotHonored { got_start })
            }
            Sink::WrongType(content_type) if e.is_write_error() => Err(FetchError::ContentType {
                expected: kind,
                content_type,
            }),
            _ => Err(FetchError::Transport(e)),
        };
    }

    let status = easy.response_code().map_err(FetchError::Transport)?;
    match status {
        200 | 206 => {}
        416 => {
            return Ok(TransferEnd::Unsatisfiable {
                total: head.content_range.and_then(|r| r.total),
            })
        }
        other => return Err(FetchError::Http { status: other }),
    }

    let writer = match sink {
        Sink::Writing(w) => w,
        _ => return Err(FetchError::EmptyBody),
    };
    let report = Report {
        offset: writer.start_offset(),
        written: writer.written(),
        file_len: writer.file_len(),
        total: total.get(),
    };
    if let Some(expected) = report.total {
        if report.file_len < expected {
            return Err(FetchError::ShortTransfer {
                expected,
                received: report.file_len,
            });
        }
    }
    Ok(TransferEnd::Done(report))
}

/// Pick how to handle the body once the final response's headers are known.
fn decide(
    head: &ResponseHead,
    offset: u64,
    kind: MediaKind,
    destination: &Path,
) -> (Sink, Option<u64>) {
    let status = head.status.unwrap_or(0);
    if status != 200 && status != 206 {
        return (Sink::Discarding, None);
    }
    if let Some(ct) = head.content_type.as_deref() {
        if is_document_type(ct) {
            return (Sink::WrongType(ct.to_string()), None);
        }
    }

    let (opened, total) = if status == 206 {
        let start = head.content_range.and_then(|r| r.start);
        let honored = start == Some(offset) || (offset == 0 && start.is_none());
        if !honored {
            return (Sink::RangeMismatch(start), None);
        }
        let total = head
            .content_range
            .and_then(|r| r.total)
            .or_else(|| head.content_length.map(|len| offset + len));
        let opened = if offset > 0 {
            DestinationWriter::open_append(destination)
        } else {
            DestinationWriter::create_truncate(destination)
        };
        (opened, total)
    } else {
        if offset > 0 {
            tracing::info!(
                destination = %destination.display(),
                offset,
                %kind,
                "server ignored range request; rewriting from offset 0"
            );
        }
        (
            DestinationWriter::create_truncate(destination),
            head.content_length,
        )
    };

    match opened {
        Ok(w) => (Sink::Writing(w), total),
        Err(e) => (Sink::Failed(e), None),
    }
}

/// Error pages and API payloads that must never land in a media file.
fn is_document_type(content_type: &str) -> bool {
    let ct = content_type.trim().to_ascii_lowercase();
    ct.starts_with("text/html") || ct.starts_with("application/json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_are_rejected() {
        assert!(is_document_type("text/html; charset=utf-8"));
        assert!(is_document_type("Application/JSON"));
        assert!(!is_document_type("image/jpeg"));
        assert!(!is_document_type("video/mp4"));
        assert!(!is_document_type("application/octet-stream"));
    }

    fn head(status: u32, range: Option<&str>, len: Option<u64>) -> ResponseHead {
        ResponseHead {
            status: Some(status),
            content_length: len,
            content_range: range.and_then(crate::http::ContentRange::parse),
            content_type: None,
        }
    }

    #[test]
    fn mismatched_partial_response_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("x.mp4");
        std::fs::write(&p, vec![1u8; 50]).unwrap();
        let (sink, _) = decide(
            &head(206, Some("bytes 0-99/100"), Some(100)),
            50,
            MediaKind::Video,
            &p,
        );
        assert!(matches!(sink, Sink::RangeMismatch(Some(0))));
        assert_eq!(std::fs::read(&p).unwrap().len(), 50);
    }

    #[test]
    fn honored_range_appends_and_reports_full_total() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("x.mp4");
        std::fs::write(&p, vec![1u8; 50]).unwrap();
        let (sink, total) = decide(&head(206, None, Some(50)), 50, MediaKind::Video, &p);
        assert!(matches!(sink, Sink::RangeMismatch(None)));
        assert_eq!(total, None);

        let (sink, total) = decide(
            &head(206, Some("bytes 50-99/100"), Some(50)),
            50,
            MediaKind::Video,
            &p,
        );
        match sink {
            Sink::Writing(w) => assert_eq!(w.start_offset(), 50),
            _ => panic!("expected append writer"),
        }
        assert_eq!(total, Some(100));
    }

    #[test]
    fn full_response_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("x.jpg");
        std::fs::write(&p, vec![1u8; 50]).unwrap();
        let (sink, total) = decide(&head(200, None, Some(80)), 50, MediaKind::Image, &p);
        match sink {
            Sink::Writing(w) => assert_eq!(w.start_offset(), 0),
            _ => panic!("expected truncating writer"),
        }
        assert_eq!(total, Some(80));
        assert_eq!(std::fs::read(&p).unwrap().len(), 0);
    }
}
