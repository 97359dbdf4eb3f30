//! The discovery session controller.
//!
//! [`ControlPoint`] owns the session shared state and the background worker
//! that runs searches. Initialization is deferred until the first dialog
//! opens because it can take a moment; teardown happens at host shutdown.

use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use ssdp_client::SearchTarget;
use tracing::{info, warn};

use crate::error::{DiscoveryError, Result};
use crate::session::DiscoverySession;
use crate::worker::{spawn_discovery_worker, Command};

/// How long a search waits for devices to answer. Some NAS boxes take half
/// a minute to show up, so this is generous.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-request timeout for description document fetches.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

struct WorkerHandle {
    command_tx: mpsc::Sender<Command>,
    thread: JoinHandle<()>,
}

/// UPnP control point: initializes the discovery machinery, starts
/// asynchronous searches, and tears everything down again.
///
/// State machine: uninitialized until [`ensure_initialized`] succeeds, then
/// searches can run; [`teardown`] returns to the uninitialized state and is
/// always safe to call.
///
/// [`ensure_initialized`]: ControlPoint::ensure_initialized
/// [`teardown`]: ControlPoint::teardown
pub struct ControlPoint {
    session: Arc<DiscoverySession>,
    worker: Mutex<Option<WorkerHandle>>,
}

impl ControlPoint {
    /// Create a control point. Cheap; nothing is initialized yet.
    pub fn new() -> Self {
        Self {
            session: Arc::new(DiscoverySession::new()),
            worker: Mutex::new(None),
        }
    }

    /// The session a dialog attaches to.
    pub fn session(&self) -> Arc<DiscoverySession> {
        Arc::clone(&self.session)
    }

    /// Initialize the discovery machinery. Idempotent.
    ///
    /// The worker runtime and the HTTP client are built on the caller
    /// thread so that a partial failure unwinds completely before the
    /// error is reported.
    pub fn ensure_initialized(&self) -> Result<()> {
        let mut slot = self
            .worker
            .lock()
            .map_err(|_| DiscoveryError::Sync("worker state lock poisoned".to_string()))?;

        if slot.is_some() {
            return Ok(());
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DiscoveryError::Initialization(format!("worker runtime: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| DiscoveryError::Initialization(format!("HTTP client: {e}")))?;

        let (command_tx, command_rx) = mpsc::channel();
        let thread = spawn_discovery_worker(runtime, http, self.session(), command_rx);

        self.session.reopen();
        *slot = Some(WorkerHandle { command_tx, thread });
        info!("discovery control point initialized");
        Ok(())
    }

    /// Start an asynchronous search for `target`, e.g.
    /// [`MEDIA_SERVER_DEVICE_TYPE`](crate::MEDIA_SERVER_DEVICE_TYPE).
    ///
    /// Returns immediately; completion is observed only through the
    /// [`ScanFinished`](crate::SessionNotice::ScanFinished) notice.
    pub fn start_search(&self, target: &str, timeout: Duration) -> Result<()> {
        let target: SearchTarget = target
            .parse()
            .map_err(|e| DiscoveryError::Parse(format!("invalid search target '{target}': {e}")))?;

        let slot = self
            .worker
            .lock()
            .map_err(|_| DiscoveryError::Sync("worker state lock poisoned".to_string()))?;

        match slot.as_ref() {
            Some(handle) => handle
                .command_tx
                .send(Command::Search { target, timeout })
                .map_err(|_| DiscoveryError::WorkerDisconnected),
            None => Err(DiscoveryError::NotInitialized),
        }
    }

    /// Shut the worker down. Idempotent, and safe to call even if
    /// [`ensure_initialized`](ControlPoint::ensure_initialized) never ran.
    pub fn teardown(&self) {
        // Invalidate the session first so in-flight events no-op instead
        // of racing the worker shutdown.
        self.session.close();

        let handle = match self.worker.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => return,
        };

        if let Some(handle) = handle {
            let _ = handle.command_tx.send(Command::Shutdown);
            if handle.thread.join().is_err() {
                warn!("discovery worker panicked during shutdown");
            }
            info!("discovery control point torn down");
        }
    }
}

impl Default for ControlPoint {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ControlPoint {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MEDIA_SERVER_DEVICE_TYPE;

    #[test]
    fn search_before_init_is_an_error() {
        let control = ControlPoint::new();
        let result = control.start_search(MEDIA_SERVER_DEVICE_TYPE, Duration::from_secs(1));
        assert!(matches!(result, Err(DiscoveryError::NotInitialized)));
    }

    #[test]
    fn teardown_without_init_is_safe() {
        let control = ControlPoint::new();
        control.teardown();
        control.teardown();
    }

    #[test]
    fn ensure_initialized_is_idempotent() {
        let control = ControlPoint::new();
        control.ensure_initialized().unwrap();
        control.ensure_initialized().unwrap();
        control.teardown();
    }

    #[test]
    fn bad_search_target_is_a_parse_error() {
        let control = ControlPoint::new();
        control.ensure_initialized().unwrap();
        let result = control.start_search("definitely not a search target", Duration::from_secs(1));
        assert!(matches!(result, Err(DiscoveryError::Parse(_))));
        control.teardown();
    }

    #[test]
    fn teardown_closes_the_session() {
        let control = ControlPoint::new();
        control.ensure_initialized().unwrap();
        assert!(control.session().is_open());

        control.teardown();
        assert!(!control.session().is_open());

        // re-initialization reopens it
        control.ensure_initialized().unwrap();
        assert!(control.session().is_open());
        control.teardown();
    }
}
