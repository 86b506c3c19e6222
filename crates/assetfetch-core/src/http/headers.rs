//! Incremental parsing of response header lines as libcurl delivers them.

/// Parsed `Content-Range` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    /// First byte of the returned range (`None` for `bytes */N`).
    pub start: Option<u64>,
    /// Last byte, inclusive.
    pub end: Option<u64>,
    /// Full resource size if the server reported it.
    pub total: Option<u64>,
}

impl ContentRange {
    /// Parse `bytes 100-199/200`, `bytes 100-199/*` or `bytes */200`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let rest = value
            .get(..6)
            .filter(|p| p.eq_ignore_ascii_case("bytes "))
            .map(|_| value[6..].trim())?;
        let (range, total) = rest.split_once('/')?;
        let total = match total.trim() {
            "*" => None,
            t => Some(t.parse::<u64>().ok()?),
        };
        let (start, end) = match range.trim() {
            "*" => (None, None),
            r => {
                let (a, b) = r.split_once('-')?;
                (Some(a.trim().parse().ok()?), Some(b.trim().parse().ok()?))
            }
        };
        Some(ContentRange { start, end, total })
    }
}

/// Status and the headers the fetcher cares about, for the final response of a transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: Option<u32>,
    pub content_length: Option<u64>,
    pub content_range: Option<ContentRange>,
    pub content_type: Option<String>,
}

impl ResponseHead {
    /// Feed one raw header line. A new status line (redirect hop, `100 Continue`)
    /// resets everything collected so far.
    pub fn on_line(&mut self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if line.starts_with("HTTP/") {
            *self = ResponseHead::default();
            self.status = line
                .split_whitespace()
                .nth(1)
                .and_then(|code| code.parse().ok());
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                self.content_length = value.parse().ok();
            } else if name.eq_ignore_ascii_case("content-range") {
                self.content_range = ContentRange::parse(value);
            } else if name.eq_ignore_ascii_case("content-type") {
                self.content_type = Some(value.to_string());
            }
        }
    }
}
