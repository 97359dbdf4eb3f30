//! The scanner module the host's module framework registers.

use std::sync::mpsc;
use std::time::Duration;

use jukebox_discovery::{ControlPoint, DEFAULT_SEARCH_TIMEOUT, MEDIA_SERVER_DEVICE_TYPE};
use tracing::info;

use crate::error::{Result, SourceError};
use crate::picker::SelectionView;

/// Identifier of a chosen source: the server's UDN.
pub type SourceId = String;

/// Menu label for the one source kind this module offers.
pub const ADD_SERVER_LABEL: &str = "Add an UPnP/DLNA server";

/// What the host's module-registration framework expects from a scanner
/// module.
pub trait SourceScanner {
    /// Name shown in the module list.
    fn display_name(&self) -> &str;

    /// Labels for the source kinds offered in the "add source" menu.
    fn source_kinds(&self) -> Vec<&str>;

    /// Run the add-source flow for `kind`, using `view` as the modal
    /// selection surface. Returns the chosen source's identifier, or
    /// `None` if the user cancelled.
    fn add_sources(&self, kind: usize, view: &mut dyn SelectionView) -> Result<Option<SourceId>>;

    /// Called once when the host unloads the module for good.
    fn last_unload(&self);
}

/// Adds UPnP/DLNA media servers as music sources.
pub struct UpnpSourceModule {
    control: ControlPoint,
    search_timeout: Duration,
}

impl UpnpSourceModule {
    pub fn new() -> Self {
        Self::with_search_timeout(DEFAULT_SEARCH_TIMEOUT)
    }

    /// Mostly for tests and demos; the default timeout is generous
    /// because slow NAS boxes can take half a minute to answer.
    pub fn with_search_timeout(search_timeout: Duration) -> Self {
        Self {
            control: ControlPoint::new(),
            search_timeout,
        }
    }
}

impl Default for UpnpSourceModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceScanner for UpnpSourceModule {
    fn display_name(&self) -> &str {
        "Read UPnP/DLNA servers"
    }

    fn source_kinds(&self) -> Vec<&str> {
        vec![ADD_SERVER_LABEL]
    }

    fn add_sources(&self, kind: usize, view: &mut dyn SelectionView) -> Result<Option<SourceId>> {
        if kind != 0 {
            return Err(SourceError::UnknownSourceKind(kind));
        }

        // Initialization can take a moment, so it is deferred to here
        // rather than module load.
        self.control.ensure_initialized()?;

        let session = self.control.session();
        session.registry().clear();

        let (notice_tx, notice_rx) = mpsc::channel();
        session.attach(notice_tx);

        if let Err(e) = self
            .control
            .start_search(MEDIA_SERVER_DEVICE_TYPE, self.search_timeout)
        {
            session.detach();
            return Err(e.into());
        }

        // Modal: runs on the caller's (GUI) thread until confirm/cancel.
        // The search itself keeps running after the dialog closes; the
        // registry is rebuilt the next time anyway.
        let picked = view.run(session.registry(), &notice_rx);
        session.detach();

        if let Some(device) = &picked {
            info!(udn = %device.udn, name = %device.friendly_name, "media server selected");
        }
        Ok(picked.map(|device| device.udn))
    }

    fn last_unload(&self) {
        self.control.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jukebox_discovery::{DeviceRegistry, ServerDevice, SessionNotice};
    use std::sync::mpsc::Receiver;

    /// A view that immediately confirms the first listed server, or
    /// cancels if the list is empty.
    struct AutoPick;

    impl SelectionView for AutoPick {
        fn run(
            &mut self,
            registry: &DeviceRegistry,
            _notices: &Receiver<SessionNotice>,
        ) -> Option<ServerDevice> {
            registry.snapshot().into_iter().next()
        }
    }

    /// A view that records what it saw and cancels.
    struct Cancelling {
        saw_empty_registry: bool,
    }

    impl SelectionView for Cancelling {
        fn run(
            &mut self,
            registry: &DeviceRegistry,
            _notices: &Receiver<SessionNotice>,
        ) -> Option<ServerDevice> {
            self.saw_empty_registry = registry.is_empty();
            None
        }
    }

    #[test]
    fn offers_exactly_one_source_kind() {
        let module = UpnpSourceModule::new();
        assert_eq!(module.source_kinds(), vec![ADD_SERVER_LABEL]);
    }

    #[test]
    fn unknown_kind_is_rejected_without_initializing() {
        let module = UpnpSourceModule::new();
        let mut view = AutoPick;
        let result = module.add_sources(3, &mut view);
        assert!(matches!(result, Err(SourceError::UnknownSourceKind(3))));
    }

    #[test]
    fn cancel_reports_no_selection() {
        let module = UpnpSourceModule::with_search_timeout(Duration::from_secs(1));
        let mut view = Cancelling {
            saw_empty_registry: false,
        };

        let picked = module.add_sources(0, &mut view).unwrap();
        assert_eq!(picked, None);
        // the registry was cleared before the dialog opened
        assert!(view.saw_empty_registry);

        module.last_unload();
    }

    #[test]
    fn registry_is_cleared_between_invocations() {
        let module = UpnpSourceModule::with_search_timeout(Duration::from_secs(1));

        // leave a stale entry behind, as a previous session would
        module.control.ensure_initialized().unwrap();
        module.control.session().registry().insert_if_absent(ServerDevice {
            udn: "uuid:stale".to_string(),
            device_type: MEDIA_SERVER_DEVICE_TYPE.to_string(),
            friendly_name: "Stale".to_string(),
            base_url: "http://192.168.1.9/".to_string(),
            presentation_url: None,
        });

        let mut view = Cancelling {
            saw_empty_registry: false,
        };
        module.add_sources(0, &mut view).unwrap();
        assert!(view.saw_empty_registry);

        module.last_unload();
    }

    #[test]
    fn last_unload_is_idempotent() {
        let module = UpnpSourceModule::new();
        module.last_unload();
        module.last_unload();
    }
}
