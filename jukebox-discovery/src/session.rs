//! Discovery session state and the event adapter.
//!
//! A [`DiscoverySession`] is the explicit object shared between the control
//! point's worker thread and whatever dialog is currently attached: the
//! device registry, the listener slot, and a liveness flag checked before
//! any event touches shared state. Events delivered after the session is
//! closed are a silent no-op, which is how in-flight discovery callbacks
//! racing with teardown are tolerated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Mutex};

use tracing::{debug, trace, warn};

use crate::device::DeviceDescription;
use crate::error::{DiscoveryError, Result};
use crate::event::{DiscoveryEvent, SessionNotice};
use crate::registry::DeviceRegistry;

/// Shared state of one discovery session.
pub struct DiscoverySession {
    registry: DeviceRegistry,
    listener: Mutex<Option<mpsc::Sender<SessionNotice>>>,
    open: AtomicBool,
}

impl DiscoverySession {
    pub(crate) fn new() -> Self {
        Self {
            registry: DeviceRegistry::new(),
            listener: Mutex::new(None),
            open: AtomicBool::new(true),
        }
    }

    /// The media servers discovered so far.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Attach a dialog's notice channel. At most one listener is attached
    /// at a time; a second attach replaces the first.
    pub fn attach(&self, listener: mpsc::Sender<SessionNotice>) {
        if let Ok(mut slot) = self.listener.lock() {
            *slot = Some(listener);
        }
    }

    /// Detach the current listener. Discovery keeps running; later
    /// notices are simply dropped.
    pub fn detach(&self) {
        if let Ok(mut slot) = self.listener.lock() {
            *slot = None;
        }
    }

    /// Whether events are still accepted.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Invalidate the session. Must happen before the worker is torn down
    /// so that events already in flight no-op instead of touching state
    /// mid-destruction.
    pub(crate) fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub(crate) fn reopen(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    /// Process one discovery event.
    ///
    /// This is the adapter between the SSDP search and the registry: it
    /// fetches and filters description documents, deduplicates by UDN, and
    /// notifies the attached dialog. Normally driven by the control point's
    /// worker; public so events can also be injected in-process, which is
    /// how the session is exercised without a network.
    pub async fn deliver(&self, http: &reqwest::Client, event: DiscoveryEvent) {
        if !self.is_open() {
            return;
        }

        match event {
            DiscoveryEvent::Alive { usn, location } => {
                self.handle_alive(http, &usn, &location).await;
            }
            DiscoveryEvent::ByeBye { usn } => {
                // Staleness is accepted within a session; the registry is
                // rebuilt when the dialog reopens.
                trace!(%usn, "device left, keeping its entry until the next session");
            }
            DiscoveryEvent::SearchTimeout => {
                debug!("search window ended");
                self.notify(SessionNotice::ScanFinished);
            }
        }
    }

    async fn handle_alive(&self, http: &reqwest::Client, usn: &str, location: &str) {
        let xml = match fetch_description(http, location).await {
            Ok(xml) => xml,
            Err(e) => {
                // One unreachable device never aborts the session.
                warn!(%usn, %location, "fetching device description failed: {e}");
                return;
            }
        };

        let description = match DeviceDescription::from_xml(&xml) {
            Ok(description) => description,
            Err(e) => {
                trace!(%usn, %location, "discarding description: {e}");
                return;
            }
        };

        // Plenty of non-matching devices advertise on the same multicast
        // group; dropping them here is the expected path, not an error.
        if description.udn().is_empty() || !description.is_media_server() {
            trace!(%usn, %location, "not a media server");
            return;
        }

        let device = match description.into_server_device(location) {
            Ok(device) => device,
            Err(e) => {
                trace!(%usn, %location, "discarding description: {e}");
                return;
            }
        };

        if self.registry.insert_if_absent(device) {
            debug!(%usn, %location, "media server added");
            self.notify(SessionNotice::DeviceListChanged);
        }
    }

    /// Post a notice to the attached dialog, if any. The sender is cloned
    /// out of the slot so no lock is held across the send.
    fn notify(&self, notice: SessionNotice) {
        let listener = match self.listener.lock() {
            Ok(slot) => slot.clone(),
            Err(_) => return,
        };

        if let Some(tx) = listener {
            let _ = tx.send(notice);
        }
    }
}

impl std::fmt::Debug for DiscoverySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoverySession")
            .field("devices", &self.registry.len())
            .field("open", &self.is_open())
            .finish()
    }
}

async fn fetch_description(http: &reqwest::Client, location: &str) -> Result<String> {
    let response = http
        .get(location)
        .send()
        .await
        .map_err(|e| DiscoveryError::Network(e.to_string()))?
        .error_for_status()
        .map_err(|e| DiscoveryError::Network(e.to_string()))?;

    response
        .text()
        .await
        .map_err(|e| DiscoveryError::Network(e.to_string()))
}
