//! Console walk-through of the full add-source flow: scan, pick, done.
//!
//! Usage: cargo run -p jukebox-sdk-sources --example add_server_source [timeout_secs]

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use jukebox_discovery::{DeviceRegistry, ServerDevice, SessionNotice};
use jukebox_sources::{PickerState, SelectionView, SourceScanner, UpnpSourceModule};
use tracing_subscriber::EnvFilter;

struct ConsolePicker;

impl ConsolePicker {
    fn draw(state: &PickerState) {
        println!();
        println!("1. Select server:");
        for (index, server) in state.rows().iter().enumerate() {
            println!("   [{index}] {} ({})", server.friendly_name, server.base_url);
        }
        if let Some(status) = state.status_line() {
            println!("   {status}");
        }
    }
}

impl SelectionView for ConsolePicker {
    fn run(
        &mut self,
        registry: &DeviceRegistry,
        notices: &Receiver<SessionNotice>,
    ) -> Option<ServerDevice> {
        let mut state = PickerState::new();
        state.refresh(registry);
        Self::draw(&state);

        // redraw as servers appear, until the scan finishes
        while state.is_scanning() {
            match notices.recv_timeout(Duration::from_millis(500)) {
                Ok(notice) => {
                    state.apply(notice, registry);
                    Self::draw(&state);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if state.rows().is_empty() {
            return None;
        }

        print!("Pick a server index (or press Enter to cancel): ");
        io::stdout().flush().ok();

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        let index: usize = line.trim().parse().ok()?;
        if !state.select(index) {
            return None;
        }

        if let Some(info) = state.device_info() {
            println!("{info}");
        }
        state.selected().cloned()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let timeout = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    let module = UpnpSourceModule::with_search_timeout(Duration::from_secs(timeout));
    let mut picker = ConsolePicker;

    match module.add_sources(0, &mut picker) {
        Ok(Some(udn)) => println!("Added media server source: {udn}"),
        Ok(None) => println!("Nothing added."),
        Err(e) => eprintln!("Could not scan for servers: {e}"),
    }

    module.last_unload();
}
