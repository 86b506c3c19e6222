//! Integration tests: the range-aware fetcher against a local HTTP server.

mod common;

use assetfetch_core::config::HttpConfig;
use assetfetch_core::fetcher::{FetchError, FetchState, FetchStatus, RangeAwareFetcher};
use assetfetch_core::media::MediaKind;
use assetfetch_core::retry::{FailureClass, RetryPolicy};
use common::range_server::{self, RangeServerOptions, Resource};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn body(len: usize) -> Vec<u8> {
    (0u8..251).cycle().take(len).collect()
}

fn fetcher() -> RangeAwareFetcher {
    RangeAwareFetcher::new(HttpConfig::default(), 0.95)
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(40),
        jitter: false,
    }
}

#[test]
fn fresh_download_matches_body() {
    let data = body(100 * 1024);
    let server = range_server::start(vec![("clip.mp4", Resource::new(data.clone(), "video/mp4"))]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("nested").join("clip.mp4");

    let mut reports = Vec::new();
    let out = fetcher()
        .fetch(&server.url("clip.mp4"), &dest, MediaKind::Video, &mut |b, t| reports.push((b, t)))
        .unwrap();

    assert_eq!(fs::read(&dest).unwrap(), data);
    assert_eq!(out.bytes_on_disk, data.len() as u64);
    assert_eq!(out.resumed_from, 0);
    assert_eq!(out.total, Some(data.len() as u64));
    assert!(!out.restarted_from_zero);
    // Progress never decreases and ends at the total.
    assert!(reports.windows(2).all(|w| w[0].0 <= w[1].0));
    assert_eq!(reports.last().unwrap().0, data.len() as u64);
    assert!(reports.iter().all(|(_, t)| *t == Some(data.len() as u64)));
    assert!(server.requests()[0].range_start().is_none());
}

#[test]
fn resume_appends_from_existing_length() {
    let data = body(80 * 1024);
    let half = data.len() / 2;
    let server = range_server::start(vec![("a.jpg", Resource::new(data.clone(), "image/jpeg"))]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("a.jpg");
    fs::write(&dest, &data[..half]).unwrap();

    let out = fetcher()
        .fetch(&server.url("a.jpg"), &dest, MediaKind::Image, &mut |_, _| {})
        .unwrap();

    assert_eq!(fs::read(&dest).unwrap(), data, "resumed file must be byte-identical");
    assert_eq!(out.resumed_from, half as u64);
    assert_eq!(out.bytes_transferred, (data.len() - half) as u64);
    assert_eq!(out.total, Some(data.len() as u64));
    assert_eq!(server.requests()[0].range_start(), Some(half as u64));
}

#[test]
fn ignored_range_rewrites_from_zero() {
    let data = body(50 * 1024);
    let opts = RangeServerOptions {
        support_ranges: false,
        ..RangeServerOptions::default()
    };
    let server = range_server::start_with_options(
        vec![("a.jpg", Resource::new(data.clone(), "image/jpeg"))],
        opts,
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("a.jpg");
    fs::write(&dest, vec![0xAAu8; 10_000]).unwrap();

    let out = fetcher()
        .fetch(&server.url("a.jpg"), &dest, MediaKind::Image, &mut |_, _| {})
        .unwrap();

    assert_eq!(fs::read(&dest).unwrap(), data);
    assert_eq!(out.resumed_from, 0);
    assert!(out.restarted_from_zero);
    assert_eq!(server.request_count(), 1, "rewrite happens within the same response");
}

#[test]
fn unsatisfiable_range_on_complete_file_is_done() {
    let data = body(4096);
    let server = range_server::start(vec![("a.jpg", Resource::new(data.clone(), "image/jpeg"))]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("a.jpg");
    fs::write(&dest, &data).unwrap();

    let out = fetcher()
        .fetch(&server.url("a.jpg"), &dest, MediaKind::Image, &mut |_, _| {})
        .unwrap();

    assert_eq!(out.bytes_transferred, 0);
    assert_eq!(out.bytes_on_disk, data.len() as u64);
    assert_eq!(server.request_count(), 1);
    assert_eq!(fs::read(&dest).unwrap(), data);
}

#[test]
fn unsatisfiable_range_on_oversized_file_refetches() {
    let data = body(4096);
    let server = range_server::start(vec![("a.jpg", Resource::new(data.clone(), "image/jpeg"))]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("a.jpg");
    fs::write(&dest, vec![7u8; 5000]).unwrap();

    let out = fetcher()
        .fetch(&server.url("a.jpg"), &dest, MediaKind::Image, &mut |_, _| {})
        .unwrap();

    assert!(out.restarted_from_zero);
    assert_eq!(fs::read(&dest).unwrap(), data);
    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].range_start(), Some(5000));
    assert!(requests[1].range_start().is_none());
}

#[test]
fn not_found_is_permanent_and_not_retried() {
    let server = range_server::start(vec![]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("a.jpg");
    let mut state = FetchState::new();

    let err = fetcher()
        .fetch_with_retry(&fast_policy(), &server.url("missing.jpg"), &dest, MediaKind::Image, &mut state, &mut |_| {})
        .unwrap_err();

    assert!(matches!(err, FetchError::Http { status: 404 }));
    assert_eq!(err.class(), FailureClass::PermanentRemote);
    assert_eq!(server.request_count(), 1);
    assert_eq!(state.status, FetchStatus::Failed);
    assert!(!dest.exists() || fs::read(&dest).unwrap().is_empty());
}

#[test]
fn server_errors_are_retried_up_to_the_bound() {
    let opts = RangeServerOptions {
        fail_status: Some(503),
        ..RangeServerOptions::default()
    };
    let server = range_server::start_with_options(
        vec![("a.jpg", Resource::new(body(1000), "image/jpeg"))],
        opts,
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("a.jpg");
    let mut state = FetchState::new();

    let err = fetcher()
        .fetch_with_retry(&fast_policy(), &server.url("a.jpg"), &dest, MediaKind::Image, &mut state, &mut |_| {})
        .unwrap_err();

    assert_eq!(err.class(), FailureClass::TransientNetwork);
    assert_eq!(server.request_count(), 3);
    assert_eq!(state.attempt, 3);
    // The error page never reaches the destination.
    assert!(!dest.exists() || fs::read(&dest).unwrap().is_empty());
}

#[test]
fn short_transfer_resumes_on_next_attempt() {
    let data = body(64 * 1024);
    let opts = RangeServerOptions {
        truncate_times: 1,
        ..RangeServerOptions::default()
    };
    let server = range_server::start_with_options(
        vec![("clip.mp4", Resource::new(data.clone(), "video/mp4"))],
        opts,
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("clip.mp4");
    let mut state = FetchState::new();
    let mut seen = Vec::new();

    let out = fetcher()
        .fetch_with_retry(
            &fast_policy(),
            &server.url("clip.mp4"),
            &dest,
            MediaKind::Video,
            &mut state,
            &mut |s| seen.push(s.bytes_written),
        )
        .unwrap();

    assert_eq!(fs::read(&dest).unwrap(), data);
    assert_eq!(state.attempt, 2);
    assert_eq!(state.status, FetchStatus::Complete);
    assert_eq!(state.restarts, 0);
    assert_eq!(out.resumed_from, (data.len() / 2) as u64);
    assert_eq!(server.requests()[1].range_start(), Some((data.len() / 2) as u64));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn document_response_is_rejected() {
    let server = range_server::start(vec![(
        "a.jpg",
        Resource::new(b"<html>login required</html>".to_vec(), "text/html; charset=utf-8"),
    )]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("a.jpg");

    let err = fetcher()
        .fetch(&server.url("a.jpg"), &dest, MediaKind::Image, &mut |_, _| {})
        .unwrap_err();

    assert!(matches!(err, FetchError::ContentType { .. }), "{err}");
    assert_eq!(err.class(), FailureClass::PermanentRemote);
    assert!(!dest.exists() || fs::read(&dest).unwrap().is_empty());
}

#[test]
fn unknown_length_reports_bytes_only() {
    let data = body(64 * 1024);
    let opts = RangeServerOptions {
        omit_length: true,
        ..RangeServerOptions::default()
    };
    let server = range_server::start_with_options(vec![("b.jpg", Resource::new(data.clone(), "image/jpeg"))], opts);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("b.jpg");

    let mut state = FetchState::new();
    let mut seen = Vec::new();
    let out = fetcher()
        .fetch_with_retry(&fast_policy(), &server.url("b.jpg"), &dest, MediaKind::Image, &mut state, &mut |s| {
            seen.push(s.clone())
        })
        .unwrap();

    assert_eq!(fs::read(&dest).unwrap(), data);
    assert_eq!(out.total, None);
    assert_eq!(out.bytes_on_disk, data.len() as u64);
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|s| s.bytes_expected.is_none()));
    assert!(seen.windows(2).all(|w| w[0].bytes_written <= w[1].bytes_written));
    assert_eq!(state.bytes_written, data.len() as u64);
    assert_eq!(state.status, FetchStatus::Complete);
    assert_eq!(server.request_count(), 1);
}
