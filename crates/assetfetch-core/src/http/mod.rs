//! Shared libcurl handle setup and small metadata requests.
//!
//! Every request runs on the calling thread with a fresh `Easy` handle; the
//! engine processes one entry at a time so handles are never shared.

mod headers;

pub use headers::{ContentRange, ResponseHead};

use crate::config::HttpConfig;
use std::cell::RefCell;
use std::time::Duration;

/// Builds an easy handle with redirects, connect timeout and user agent applied.
pub fn base_handle(url: &str, cfg: &HttpConfig) -> Result<curl::easy::Easy, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))?;
    easy.useragent(&cfg.user_agent)?;
    Ok(easy)
}

/// Body and status of a small (metadata) GET.
#[derive(Debug, Clone)]
pub struct TextResponse {
    pub status: u32,
    pub body: String,
}

/// GET a small document (e.g. a search API response) into memory.
/// Applies the whole-call metadata timeout.
pub fn get_text(
    url: &str,
    headers: &[(&str, &str)],
    cfg: &HttpConfig,
) -> Result<TextResponse, curl::Error> {
    let mut easy = base_handle(url, cfg)?;
    easy.timeout(Duration::from_secs(cfg.metadata_timeout_secs))?;

    let mut list = curl::easy::List::new();
    for (k, v) in headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !headers.is_empty() {
        easy.http_headers(list)?;
    }

    let body = RefCell::new(Vec::new());
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.borrow_mut().extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(TextResponse {
        status,
        body: String::from_utf8_lossy(&body.into_inner()).into_owned(),
    })
}
