//! Host-application integration for UPnP/DLNA music sources.
//!
//! The jukebox's module-registration framework asks each scanner module for
//! the source kinds it offers and calls `add_sources` when the user picks
//! one from the "add source" menu. This crate provides that module for
//! UPnP/DLNA media servers, plus the headless state model behind the
//! server-selection dialog so any front end (GUI, TUI, console) can render
//! it.
//!
//! ```no_run
//! use jukebox_sources::{SourceScanner, UpnpSourceModule};
//! # use jukebox_sources::SelectionView;
//! # use jukebox_discovery::{DeviceRegistry, ServerDevice, SessionNotice};
//! # use std::sync::mpsc::Receiver;
//! # struct MyDialog;
//! # impl SelectionView for MyDialog {
//! #     fn run(&mut self, _: &DeviceRegistry, _: &Receiver<SessionNotice>) -> Option<ServerDevice> { None }
//! # }
//!
//! let module = UpnpSourceModule::new();
//! let mut dialog = MyDialog;
//! match module.add_sources(0, &mut dialog) {
//!     Ok(Some(udn)) => println!("added server {udn}"),
//!     Ok(None) => println!("cancelled"),
//!     Err(e) => eprintln!("discovery unavailable: {e}"),
//! }
//! module.last_unload();
//! ```

mod error;
mod module;
mod picker;

pub use error::{Result, SourceError};
pub use module::{SourceId, SourceScanner, UpnpSourceModule, ADD_SERVER_LABEL};
pub use picker::{PickerState, SelectionView};
