//! Scan the local network for DLNA media servers and print them as JSON.
//!
//! Usage: cargo run -p jukebox-sdk-discovery --example list_media_servers [timeout_secs]

use std::sync::mpsc;
use std::time::Duration;

use jukebox_discovery::{ControlPoint, SessionNotice, MEDIA_SERVER_DEVICE_TYPE};
use tracing_subscriber::EnvFilter;

fn main() -> jukebox_discovery::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let timeout = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    let control = ControlPoint::new();
    control.ensure_initialized()?;

    let session = control.session();
    session.registry().clear();

    let (notice_tx, notice_rx) = mpsc::channel();
    session.attach(notice_tx);
    control.start_search(MEDIA_SERVER_DEVICE_TYPE, Duration::from_secs(timeout))?;

    for notice in notice_rx.iter() {
        match notice {
            SessionNotice::DeviceListChanged => {
                eprintln!("... {} server(s) so far", session.registry().len());
            }
            SessionNotice::ScanFinished => break,
        }
    }
    session.detach();

    let servers = session.registry().snapshot();
    println!("{}", serde_json::to_string_pretty(&servers).unwrap());

    control.teardown();
    Ok(())
}
