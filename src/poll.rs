//! Poll passes.
//!
//! A pass fetches every provider in the registry once and produces exactly
//! one [`StatusResult`] per provider, in registry order.  Failures never
//! abort a pass: they become `unknown` rows.
//!
//! Fetches fan out over a small dedicated [`rayon`] pool.  Providers are
//! independent, and rayon's indexed `collect` puts results back in registry
//! order, so nothing here needs a lock.
//!
//! The web server runs a pass per page load.  The terminal dashboard uses
//! [`spawn`], which keeps a background thread polling on a timer.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::fetch::Fetch;
use crate::registry::{ProviderDescriptor, Registry};
use crate::source::source_for;
use crate::status::{tally, Indicator, StatusResult};

pub const FETCH_FAILED: &str = "fetch failed";
pub const PARSE_FAILED: &str = "parse failed";

/// Fetch and assess a single provider.  Never fails.
pub fn poll_provider(provider: &ProviderDescriptor, fetcher: &dyn Fetch) -> StatusResult {
    let assessment = match fetcher.get(&provider.url) {
        Err(e) => {
            warn!(provider = %provider.name, url = %provider.url, error = %e, "fetch failed");
            Err(FETCH_FAILED)
        }
        Ok(body) => source_for(provider.kind)
            .assess(&body, &provider.parse_hints, Utc::now())
            .map_err(|e| {
                warn!(provider = %provider.name, kind = %provider.kind, error = %e, "parse failed");
                PARSE_FAILED
            }),
    };

    let (indicator, message) = match assessment {
        Ok(a) => (a.indicator, a.message),
        Err(reason) => (Indicator::Unknown, Some(reason.to_string())),
    };
    debug!(provider = %provider.name, %indicator, "assessed");

    StatusResult {
        provider_name: provider.name.clone(),
        kind: provider.kind,
        link: provider.link.clone(),
        indicator,
        message,
        fetched_at: Utc::now(),
    }
}

/// Owns the registry, the fetcher, and the worker pool.
pub struct Poller {
    registry: Registry,
    fetcher: Arc<dyn Fetch>,
    pool: rayon::ThreadPool,
}

impl Poller {
    /// `workers` is clamped to at least one thread.
    pub fn new(
        registry: Registry,
        fetcher: Arc<dyn Fetch>,
        workers: usize,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("poll-worker-{i}"))
            .build()?;
        Ok(Self {
            registry,
            fetcher,
            pool,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run one poll pass.  Blocks until every provider has answered or
    /// timed out.
    pub fn poll_pass(&self) -> Vec<StatusResult> {
        let started = Instant::now();
        let fetcher = self.fetcher.as_ref();
        let results: Vec<StatusResult> = self.pool.install(|| {
            self.registry
                .providers()
                .par_iter()
                .map(|p| poll_provider(p, fetcher))
                .collect()
        });

        let [green, yellow, red, unknown] = tally(&results).map(|(_, n)| n);
        info!(
            providers = results.len(),
            green,
            yellow,
            red,
            unknown,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "poll pass complete"
        );
        results
    }
}

/// Messages sent from the poller thread to the terminal UI.
pub enum PollMsg {
    /// A pass has started.
    Started,
    /// A pass finished with these results.
    Pass(Vec<StatusResult>),
}

/// Handle to a background poller.
pub struct PollHandle {
    /// Results and progress, drained by the UI on every tick.
    pub rx: mpsc::Receiver<PollMsg>,
    refresh_tx: mpsc::Sender<()>,
}

impl PollHandle {
    /// Ask for a pass now instead of waiting for the timer.
    pub fn refresh(&self) {
        // A closed channel means the poller already stopped; nothing to do.
        let _ = self.refresh_tx.send(());
    }
}

/// Spawn the background polling thread.
///
/// Runs a pass immediately, then again whenever `interval` elapses or
/// [`PollHandle::refresh`] is called.  The thread exits once the handle is
/// dropped.
pub fn spawn(poller: Arc<Poller>, interval: Duration) -> PollHandle {
    let (tx, rx) = mpsc::channel();
    let (refresh_tx, refresh_rx) = mpsc::channel::<()>();

    thread::spawn(move || loop {
        if tx.send(PollMsg::Started).is_err() {
            return;
        }
        let results = poller.poll_pass();
        // If the receiver is gone the UI has exited; stop polling.
        if tx.send(PollMsg::Pass(results)).is_err() {
            return;
        }

        match refresh_rx.recv_timeout(interval) {
            Ok(()) => {
                // Collapse key-mashing into a single extra pass.
                while refresh_rx.try_recv().is_ok() {}
                debug!("manual refresh");
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }
    });

    PollHandle { rx, refresh_tx }
}
