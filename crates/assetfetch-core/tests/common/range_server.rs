//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves static resources by path. GET honors `Range: bytes=N-` with 206
//! (or ignores it when ranges are off), answers an out-of-range start with
//! 416 `bytes */N`, and can be told to fail or cut the body short for the
//! first few requests, or leave out Content-Length so the body ends when the
//! connection closes. Every request is counted and its headers kept.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Resource {
    pub body: Vec<u8>,
    pub content_type: String,
}

impl Resource {
    pub fn new(body: Vec<u8>, content_type: &str) -> Self {
        Self {
            body,
            content_type: content_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// Status every failing request is answered with (no body written to a sink).
    pub fail_status: Option<u16>,
    /// How many requests fail with `fail_status`; `None` means all of them.
    pub fail_times: Option<usize>,
    /// The first this-many successful GETs advertise the full length but send half and close.
    pub truncate_times: usize,
    /// Send bodies without Content-Length; the close marks the end.
    pub omit_length: bool,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            support_ranges: true,
            fail_status: None,
            fail_times: None,
            truncate_times: 0,
            omit_length: false,
        }
    }
}

/// Recorded request: method, path (without query), raw header lines.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl SeenRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Start offset of a `Range: bytes=N-` header.
    pub fn range_start(&self) -> Option<u64> {
        let value = self.header("range")?;
        let bounds = value.trim().strip_prefix("bytes=")?;
        bounds.split_once('-')?.0.trim().parse().ok()
    }
}

#[derive(Clone)]
pub struct TestServer {
    base: String,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
    counter: Arc<AtomicUsize>,
}

impl TestServer {
    /// `http://127.0.0.1:PORT` without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    pub fn request_count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn start(resources: Vec<(&str, Resource)>) -> TestServer {
    start_with_options(resources, RangeServerOptions::default())
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start_with_options(resources: Vec<(&str, Resource)>, opts: RangeServerOptions) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Resource>> = Arc::new(
        resources
            .into_iter()
            .map(|(p, r)| (format!("/{}", p.trim_start_matches('/')), r))
            .collect(),
    );
    let server = TestServer {
        base: format!("http://127.0.0.1:{}", port),
        requests: Arc::new(Mutex::new(Vec::new())),
        counter: Arc::new(AtomicUsize::new(0)),
    };
    let truncated = Arc::new(AtomicUsize::new(0));
    let shared = server.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let shared = shared.clone();
            let truncated = Arc::clone(&truncated);
            thread::spawn(move || handle(stream, &routes, opts, &shared, &truncated));
        }
    });
    server
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Resource>,
    opts: RangeServerOptions,
    server: &TestServer,
    truncated: &AtomicUsize,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let request = match read_head(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let index = server.counter.fetch_add(1, Ordering::SeqCst);
    server.requests.lock().unwrap().push(request.clone());

    if let Some(status) = opts.fail_status {
        if opts.fail_times.map_or(true, |n| index < n) {
            let body = b"<html>temporarily unavailable</html>";
            let head = format!(
                "HTTP/1.1 {} Test Failure\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
            return;
        }
    }

    let Some(resource) = routes.get(&request.target) else {
        let _ = stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        );
        return;
    };
    if !request.method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let body = &resource.body;
    let total = body.len() as u64;
    let range_start = if opts.support_ranges { request.range_start() } else { None };
    let (status, content_range, slice) = match range_start {
        Some(start) if start >= total => (
            "416 Range Not Satisfiable",
            Some(format!("bytes */{}", total)),
            &body[0..0],
        ),
        Some(start) => (
            "206 Partial Content",
            Some(format!("bytes {}-{}/{}", start, total - 1, total)),
            &body[start as usize..],
        ),
        None => ("200 OK", None, &body[..]),
    };

    let cut = !slice.is_empty() && truncated.fetch_add(1, Ordering::SeqCst) < opts.truncate_times;
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nConnection: close\r\n",
        status, resource.content_type
    );
    if !opts.omit_length {
        head.push_str(&format!("Content-Length: {}\r\n", slice.len()));
    }
    if let Some(cr) = content_range {
        head.push_str(&format!("Content-Range: {}\r\n", cr));
    }
    if opts.support_ranges {
        head.push_str("Accept-Ranges: bytes\r\n");
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let sent = if cut { &slice[..slice.len() / 2] } else { slice };
    let _ = stream.write_all(sent);
    let _ = stream.flush();
}

fn read_head(stream: &mut TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let text = String::from_utf8_lossy(&buf).into_owned();
    let mut lines = text.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let target = first.next()?;
    let target = target.split('?').next().unwrap_or(target).to_string();
    let headers = lines
        .take_while(|l| !l.trim().is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();
    Some(SeenRequest {
        method,
        target,
        headers,
    })
}
