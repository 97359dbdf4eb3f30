//! The headless model behind the server-selection dialog.
//!
//! A front end owns the actual widgets; this module owns everything else:
//! the rows, the selection, the scanning indicator, and the Info popup
//! text. The front end's job is reduced to "drain notices, call `apply`,
//! redraw from `rows()`".

use std::sync::mpsc::Receiver;

use jukebox_discovery::{DeviceRegistry, ServerDevice, SessionNotice};

/// The modal surface a front end provides for picking a server.
///
/// `run` blocks until the user confirms or cancels. Implementations drain
/// `notices` from their own event loop, feed each one to a
/// [`PickerState`], and redraw; they must never touch the registry from
/// another thread than their own event loop.
pub trait SelectionView {
    fn run(
        &mut self,
        registry: &DeviceRegistry,
        notices: &Receiver<SessionNotice>,
    ) -> Option<ServerDevice>;
}

/// Render state of the selection dialog.
#[derive(Debug)]
pub struct PickerState {
    rows: Vec<ServerDevice>,
    /// UDN of the selected row, so the selection survives redraws while
    /// new servers are still being inserted.
    selected: Option<String>,
    scanning: bool,
}

impl PickerState {
    /// A fresh dialog: empty list, scan still running.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            selected: None,
            scanning: true,
        }
    }

    /// Re-read the registry. The selection is kept if the device is still
    /// listed.
    pub fn refresh(&mut self, registry: &DeviceRegistry) {
        self.rows = registry.snapshot();
        if let Some(udn) = &self.selected {
            if !self.rows.iter().any(|device| &device.udn == udn) {
                self.selected = None;
            }
        }
    }

    /// React to a session notice.
    pub fn apply(&mut self, notice: SessionNotice, registry: &DeviceRegistry) {
        match notice {
            SessionNotice::DeviceListChanged => self.refresh(registry),
            SessionNotice::ScanFinished => self.scanning = false,
        }
    }

    /// Rows to render, ordered as the registry snapshot orders them.
    pub fn rows(&self) -> &[ServerDevice] {
        &self.rows
    }

    /// Whether the "still scanning" indicator should show.
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Status text to show instead of (or next to) the list, if any.
    pub fn status_line(&self) -> Option<&'static str> {
        if self.scanning {
            Some("(still scanning)")
        } else if self.rows.is_empty() {
            Some("no servers found")
        } else {
            None
        }
    }

    /// The currently selected server, if any.
    pub fn selected(&self) -> Option<&ServerDevice> {
        let udn = self.selected.as_ref()?;
        self.rows.iter().find(|device| &device.udn == udn)
    }

    /// Index of the selected row.
    pub fn selected_index(&self) -> Option<usize> {
        let udn = self.selected.as_ref()?;
        self.rows.iter().position(|device| &device.udn == udn)
    }

    /// Select a row by index. Returns whether the index was valid.
    pub fn select(&mut self, index: usize) -> bool {
        match self.rows.get(index) {
            Some(device) => {
                self.selected = Some(device.udn.clone());
                true
            }
            None => false,
        }
    }

    /// Move the selection down, or to the first row if nothing is
    /// selected.
    pub fn select_next(&mut self) {
        let next = match self.selected_index() {
            Some(index) => (index + 1).min(self.rows.len().saturating_sub(1)),
            None => 0,
        };
        self.select(next);
    }

    /// Move the selection up.
    pub fn select_previous(&mut self) {
        let previous = match self.selected_index() {
            Some(index) => index.saturating_sub(1),
            None => 0,
        };
        self.select(previous);
    }

    /// The Info popup text for the selected server.
    pub fn device_info(&self) -> Option<String> {
        self.selected().map(|device| {
            format!(
                "friendlyName: {}\ndeviceType: {}\nUDN: {}\nURLBase: {}\npresentationURL: {}",
                device.friendly_name,
                device.device_type,
                device.udn,
                device.base_url,
                device.presentation_url.as_deref().unwrap_or("-"),
            )
        })
    }
}

impl Default for PickerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jukebox_discovery::MEDIA_SERVER_DEVICE_TYPE;

    fn server(udn: &str, name: &str) -> ServerDevice {
        ServerDevice {
            udn: udn.to_string(),
            device_type: MEDIA_SERVER_DEVICE_TYPE.to_string(),
            friendly_name: name.to_string(),
            base_url: "http://192.168.1.2:8200/".to_string(),
            presentation_url: Some("http://192.168.1.2/".to_string()),
        }
    }

    fn registry_with(devices: &[ServerDevice]) -> DeviceRegistry {
        let registry = DeviceRegistry::new();
        for device in devices {
            registry.insert_if_absent(device.clone());
        }
        registry
    }

    #[test]
    fn starts_scanning_with_empty_list() {
        let state = PickerState::new();
        assert!(state.is_scanning());
        assert!(state.rows().is_empty());
        assert_eq!(state.status_line(), Some("(still scanning)"));
        assert!(state.selected().is_none());
    }

    #[test]
    fn scan_finished_clears_indicator_and_shows_empty_state() {
        let registry = DeviceRegistry::new();
        let mut state = PickerState::new();

        state.apply(SessionNotice::ScanFinished, &registry);
        assert!(!state.is_scanning());
        assert_eq!(state.status_line(), Some("no servers found"));
    }

    #[test]
    fn list_changed_refreshes_rows() {
        let registry = registry_with(&[server("udn-1", "Attic"), server("udn-2", "Kitchen")]);
        let mut state = PickerState::new();

        state.apply(SessionNotice::DeviceListChanged, &registry);
        assert_eq!(state.rows().len(), 2);
        assert_eq!(state.status_line(), Some("(still scanning)"));

        state.apply(SessionNotice::ScanFinished, &registry);
        assert_eq!(state.status_line(), None);
    }

    #[test]
    fn selection_survives_refresh_while_servers_appear() {
        let registry = registry_with(&[server("udn-k", "Kitchen")]);
        let mut state = PickerState::new();
        state.refresh(&registry);
        state.select(0);
        assert_eq!(state.selected().unwrap().udn, "udn-k");

        // a new server sorts ahead of the selected one
        registry.insert_if_absent(server("udn-a", "Attic"));
        state.refresh(&registry);

        assert_eq!(state.rows().len(), 2);
        assert_eq!(state.selected().unwrap().udn, "udn-k");
        assert_eq!(state.selected_index(), Some(1));
    }

    #[test]
    fn selection_cleared_when_registry_resets() {
        let registry = registry_with(&[server("udn-1", "A")]);
        let mut state = PickerState::new();
        state.refresh(&registry);
        state.select(0);

        registry.clear();
        state.refresh(&registry);
        assert!(state.selected().is_none());
    }

    #[test]
    fn keyboard_navigation_clamps_at_the_ends() {
        let registry = registry_with(&[server("udn-1", "A"), server("udn-2", "B")]);
        let mut state = PickerState::new();
        state.refresh(&registry);

        state.select_next();
        assert_eq!(state.selected_index(), Some(0));
        state.select_next();
        assert_eq!(state.selected_index(), Some(1));
        state.select_next();
        assert_eq!(state.selected_index(), Some(1));

        state.select_previous();
        assert_eq!(state.selected_index(), Some(0));
        state.select_previous();
        assert_eq!(state.selected_index(), Some(0));
    }

    #[test]
    fn select_rejects_out_of_range_index() {
        let registry = registry_with(&[server("udn-1", "A")]);
        let mut state = PickerState::new();
        state.refresh(&registry);

        assert!(!state.select(5));
        assert!(state.selected().is_none());
    }

    #[test]
    fn device_info_renders_all_fields() {
        let registry = registry_with(&[server("udn-1", "Diskstation")]);
        let mut state = PickerState::new();
        state.refresh(&registry);
        state.select(0);

        let info = state.device_info().unwrap();
        assert!(info.contains("friendlyName: Diskstation"));
        assert!(info.contains(&format!("deviceType: {MEDIA_SERVER_DEVICE_TYPE}")));
        assert!(info.contains("UDN: udn-1"));
        assert!(info.contains("URLBase: http://192.168.1.2:8200/"));
        assert!(info.contains("presentationURL: http://192.168.1.2/"));
    }

    #[test]
    fn device_info_needs_a_selection() {
        let state = PickerState::new();
        assert!(state.device_info().is_none());
    }
}
