//! Integration tests for the availability prober
//!
//! These tests bind real loopback listeners so that connect success, connect
//! refusal, and resolution failure are all exercised end to end.

use std::collections::HashSet;
use std::time::Duration;

use ntpscout::models::{Region, ServerCandidate};
use ntpscout::probe::AvailabilityProber;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn candidate(name: &str) -> ServerCandidate {
    ServerCandidate::new(name, "测试", Region::Domestic)
}

/// Bind a loopback listener and keep it alive for the test's duration
async fn open_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A loopback port with nothing listening on it
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

// ============================================================================
// Single probe behavior
// ============================================================================

/// An open listener on the probed port yields available=true
#[tokio::test]
async fn test_open_listener_is_available() {
    let (_listener, port) = open_listener().await;
    let prober = AvailabilityProber::new(1, Duration::from_secs(1)).with_port(port);

    let result = prober.probe_one(candidate("127.0.0.1")).await;

    assert!(result.available);
    assert_eq!(result.resolved_addr, "127.0.0.1");
    assert!(result.latency_ms.unwrap() >= 0.0);
}

#[tokio::test]
async fn test_closed_port_is_unavailable_with_latency() {
    let port = closed_port().await;
    let prober = AvailabilityProber::new(1, Duration::from_secs(1)).with_port(port);

    let result = prober.probe_one(candidate("127.0.0.1")).await;

    assert!(!result.available);
    // Connect-stage failures keep their measured elapsed time
    assert!(result.latency_ms.is_some());
    assert_eq!(result.resolved_addr, "127.0.0.1");
}

/// An unresolvable name yields no address and no latency
#[tokio::test]
async fn test_unresolvable_name_degrades() {
    let prober = AvailabilityProber::new(1, Duration::from_secs(1));

    let result = prober
        .probe_one(candidate("definitely-not-a-real-host.invalid"))
        .await;

    assert!(!result.available);
    assert_eq!(result.resolved_addr, "");
    assert!(result.latency_ms.is_none());
}

// ============================================================================
// Batch behavior
// ============================================================================

/// Exactly one result per candidate, no duplicates, no omissions
#[tokio::test]
async fn test_batch_yields_one_result_per_candidate() {
    let (_listener, open) = open_listener().await;
    let prober = AvailabilityProber::new(3, Duration::from_secs(1)).with_port(open);

    let candidates: Vec<ServerCandidate> = vec![
        candidate("127.0.0.1"),
        candidate("localhost"),
        candidate("definitely-not-a-real-host.invalid"),
        candidate("another-bogus-host.invalid"),
    ];
    let expected: HashSet<String> = candidates.iter().map(|c| c.name.clone()).collect();

    let mut rx = prober.probe_all(candidates, CancellationToken::new());
    let mut seen = Vec::new();
    while let Some(result) = rx.recv().await {
        seen.push(result);
    }

    assert_eq!(seen.len(), 4);
    let names: HashSet<String> = seen.iter().map(|r| r.name().to_string()).collect();
    assert_eq!(names, expected);
}

/// One failing probe never prevents the rest from completing
#[tokio::test]
async fn test_failures_are_isolated() {
    let (_listener, open) = open_listener().await;
    let prober = AvailabilityProber::new(2, Duration::from_secs(1)).with_port(open);

    let candidates = vec![
        candidate("definitely-not-a-real-host.invalid"),
        candidate("127.0.0.1"),
    ];

    let mut rx = prober.probe_all(candidates, CancellationToken::new());
    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        results.push(result);
    }

    assert_eq!(results.len(), 2);
    assert!(results.iter().any(|r| r.available));
    assert!(results.iter().any(|r| !r.available));
}

/// Worker pool smaller than the batch still drains everything
#[tokio::test]
async fn test_more_candidates_than_workers() {
    let (_listener, open) = open_listener().await;
    let prober = AvailabilityProber::new(2, Duration::from_secs(1)).with_port(open);

    let candidates: Vec<ServerCandidate> = (0..12).map(|_| candidate("127.0.0.1")).collect();

    let mut rx = prober.probe_all(candidates, CancellationToken::new());
    let mut count = 0;
    while let Some(result) = rx.recv().await {
        assert!(result.available);
        count += 1;
    }

    assert_eq!(count, 12);
}

/// Cancellation abandons the remaining queue without hanging
#[tokio::test]
async fn test_cancellation_abandons_batch() {
    // Non-routable address so every connect waits out its timeout
    let prober = AvailabilityProber::new(1, Duration::from_secs(10));
    let cancel = CancellationToken::new();

    let candidates: Vec<ServerCandidate> =
        (0..8).map(|i| candidate(&format!("10.255.255.{}", i + 1))).collect();

    let mut rx = prober.probe_all(candidates, cancel.clone());

    cancel.cancel();

    // The channel must close long before 8 sequential 10s timeouts
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        let mut n = 0;
        while rx.recv().await.is_some() {
            n += 1;
        }
        n
    })
    .await;

    assert!(drained.is_ok(), "Cancelled batch must terminate promptly");
    assert!(drained.unwrap() < 8);
}
