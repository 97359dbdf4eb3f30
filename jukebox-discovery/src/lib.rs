//! UPnP/DLNA media server discovery for the jukebox music library
//!
//! This crate is the control-point side of adding a DLNA media server as a
//! music source: it asks the network which `MediaServer:1` devices exist,
//! fetches and parses their description documents, and keeps the results in
//! a lock-guarded registry that a selection dialog can render. The SSDP wire
//! protocol itself is delegated to the `ssdp-client` crate; this crate only
//! reacts to its responses.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::mpsc;
//! use std::time::Duration;
//! use jukebox_discovery::{ControlPoint, SessionNotice, MEDIA_SERVER_DEVICE_TYPE};
//!
//! # fn main() -> jukebox_discovery::Result<()> {
//! let control = ControlPoint::new();
//! control.ensure_initialized()?;
//!
//! let session = control.session();
//! session.registry().clear();
//!
//! let (notice_tx, notice_rx) = mpsc::channel();
//! session.attach(notice_tx);
//! control.start_search(MEDIA_SERVER_DEVICE_TYPE, Duration::from_secs(10))?;
//!
//! for notice in notice_rx {
//!     match notice {
//!         SessionNotice::DeviceListChanged => {
//!             for server in session.registry().snapshot() {
//!                 println!("{} ({})", server.friendly_name, server.base_url);
//!             }
//!         }
//!         SessionNotice::ScanFinished => break,
//!     }
//! }
//! session.detach();
//! # Ok(())
//! # }
//! ```
//!
//! # Threading model
//!
//! Discovery runs on a background worker thread owned by [`ControlPoint`];
//! the public API is fully synchronous and never blocks the caller. The
//! worker posts [`SessionNotice`] values over a plain `mpsc` channel, which
//! a GUI thread can drain from its own event loop.

mod controller;
pub mod device;
mod error;
mod event;
mod registry;
mod session;
mod worker;

pub use controller::{ControlPoint, DEFAULT_SEARCH_TIMEOUT};
pub use device::{DeviceDescription, ServerDevice, MEDIA_SERVER_DEVICE_TYPE};
pub use error::{DiscoveryError, Result};
pub use event::{DiscoveryEvent, SessionNotice};
pub use registry::DeviceRegistry;
pub use session::DiscoverySession;
