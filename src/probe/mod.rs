//! Concurrent reachability probing
//!
//! Each probe resolves a candidate's hostname and attempts a timed TCP
//! connect to port 123. Real NTP speaks UDP; the TCP connect is a
//! reachability and latency heuristic, kept as documented behavior.
//!
//! Probes run on a fixed pool of worker tasks pulling from one shared job
//! queue and pushing into one completion channel. Results arrive in
//! completion order, exactly one per candidate, and no failure of a single
//! probe can abort the batch: resolution and connect errors degrade to an
//! unavailable result inside the worker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::models::{ProbeResult, ServerCandidate};

/// Conventional NTP port probed for reachability
pub const NTP_PORT: u16 = 123;

/// Default size of the probe worker pool
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Default per-probe connect timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Concurrent availability prober
#[derive(Debug, Clone)]
pub struct AvailabilityProber {
    /// Per-probe connect timeout
    timeout: Duration,

    /// Number of concurrent worker tasks
    max_workers: usize,

    /// Target port, [`NTP_PORT`] outside of tests
    port: u16,
}

impl Default for AvailabilityProber {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKERS, DEFAULT_TIMEOUT)
    }
}

impl AvailabilityProber {
    pub fn new(max_workers: usize, timeout: Duration) -> Self {
        Self {
            // A zero-sized pool would never drain the queue
            max_workers: max_workers.max(1),
            timeout,
            port: NTP_PORT,
        }
    }

    /// Override the probed port, for tests against local listeners
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Probe a single candidate
    ///
    /// Never fails: resolution errors yield an unreachable result with no
    /// latency, connect errors and timeouts yield an unavailable result that
    /// keeps its measured elapsed time. The socket is dropped on every path.
    pub async fn probe_one(&self, candidate: ServerCandidate) -> ProbeResult {
        let mut addrs = match tokio::net::lookup_host((candidate.name.clone(), self.port)).await {
            Ok(addrs) => addrs,
            Err(e) => {
                tracing::debug!(host = %candidate.name, error = %e, "Resolution failed");
                return ProbeResult::unreachable(candidate);
            }
        };

        let Some(addr) = addrs.next() else {
            tracing::debug!(host = %candidate.name, "Resolution returned no addresses");
            return ProbeResult::unreachable(candidate);
        };

        let start = Instant::now();
        let available = matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await,
            Ok(Ok(_))
        );
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::trace!(
            host = %candidate.name,
            addr = %addr,
            available,
            latency_ms,
            "Probe completed"
        );

        ProbeResult {
            candidate,
            resolved_addr: addr.ip().to_string(),
            latency_ms: Some(latency_ms),
            available,
        }
    }

    /// Probe all candidates concurrently, yielding results in completion order
    ///
    /// Spawns a fixed pool of workers sharing one job queue; the returned
    /// receiver closes once every submitted probe has produced a result.
    /// Cancelling the token abandons queued candidates and interrupts
    /// in-flight connects; results completed before cancellation are still
    /// delivered.
    pub fn probe_all(
        &self,
        candidates: Vec<ServerCandidate>,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<ProbeResult> {
        let total = candidates.len();
        let (job_tx, job_rx) = mpsc::channel::<ServerCandidate>(total.max(1));
        let (result_tx, result_rx) = mpsc::channel::<ProbeResult>(total.max(1));

        // Queue the whole batch up front; the buffer is sized to it
        for candidate in candidates {
            if job_tx.try_send(candidate).is_err() {
                tracing::error!("Probe job queue unexpectedly full");
                break;
            }
        }
        drop(job_tx);

        let job_rx = Arc::new(Mutex::new(job_rx));

        tracing::debug!(
            total,
            workers = self.max_workers,
            timeout_secs = self.timeout.as_secs_f64(),
            "Starting probe batch"
        );

        for worker_id in 0..self.max_workers {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let cancel = cancel.clone();
            let prober = self.clone();

            tokio::spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }

                    let job = {
                        let mut rx = job_rx.lock().await;
                        rx.recv().await
                    };

                    let Some(candidate) = job else {
                        break; // Queue drained
                    };

                    let result = tokio::select! {
                        _ = cancel.cancelled() => break,
                        result = prober.probe_one(candidate) => result,
                    };

                    if result_tx.send(result).await.is_err() {
                        break; // Receiver dropped, nothing left to report to
                    }
                }

                tracing::debug!(worker_id, "Probe worker shutting down");
            });
        }

        // Workers hold the remaining senders; the channel closes when the
        // last worker exits.
        drop(result_tx);

        result_rx
    }
}
