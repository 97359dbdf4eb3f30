//! Device description parsing and media server filtering.
//!
//! A discovered location URL points at a UPnP description document; this
//! module turns that XML into an immutable [`ServerDevice`] record and
//! decides whether the device is a media server at all.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DiscoveryError, Result};

/// The UPnP device type this crate is looking for.
pub const MEDIA_SERVER_DEVICE_TYPE: &str = "urn:schemas-upnp-org:device:MediaServer:1";

/// Immutable snapshot of one discovered media server.
///
/// Built once from the description document at discovery time and never
/// mutated afterwards; the registry owns these, the dialog only copies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerDevice {
    /// Unique device name assigned by the vendor, stable across
    /// advertisements. Registry key.
    pub udn: String,
    /// Device type URI, e.g. `urn:schemas-upnp-org:device:MediaServer:1`.
    pub device_type: String,
    /// Human-readable name shown in the selection dialog.
    pub friendly_name: String,
    /// Base URL for the device's services.
    pub base_url: String,
    /// Optional presentation page (usually the device's web UI).
    pub presentation_url: Option<String>,
}

/// UPnP description document root element.
#[derive(Debug, Deserialize)]
struct Root {
    #[serde(rename = "URLBase")]
    url_base: Option<String>,
    device: DeviceDescription,
}

/// The `<device>` element of a description document.
///
/// Identity fields default to empty strings so that an incomplete document
/// is rejected by the filter rather than by the parser; many devices on the
/// multicast group are simply not what we are looking for.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    #[serde(default)]
    device_type: String,
    #[serde(default)]
    friendly_name: String,
    #[serde(rename = "UDN", default)]
    udn: String,
    #[serde(rename = "presentationURL")]
    presentation_url: Option<String>,
    #[serde(skip)]
    url_base: Option<String>,
}

impl DeviceDescription {
    /// Parse a description document.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Parse`] if the XML does not deserialize at
    /// all. Missing identity fields are not an error here.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root: Root = quick_xml::de::from_str(xml)
            .map_err(|e| DiscoveryError::Parse(format!("bad description document: {e}")))?;

        let mut device = root.device;
        device.url_base = root.url_base;
        Ok(device)
    }

    /// The device's unique name; empty if the document did not carry one.
    pub fn udn(&self) -> &str {
        &self.udn
    }

    /// Whether the device advertises the media server device type.
    pub fn is_media_server(&self) -> bool {
        self.device_type == MEDIA_SERVER_DEVICE_TYPE
    }

    /// Convert into a [`ServerDevice`] record.
    ///
    /// The base URL is the document's `URLBase` when present; UPnP 1.1
    /// devices omit it, in which case it is derived from the description
    /// location.
    pub fn into_server_device(self, location: &str) -> Result<ServerDevice> {
        let base_url = match self.url_base.as_deref().filter(|base| !base.is_empty()) {
            Some(base) => base.to_string(),
            None => base_url_from_location(location)?,
        };

        let friendly_name = if self.friendly_name.is_empty() {
            "Unknown".to_string()
        } else {
            self.friendly_name
        };

        Ok(ServerDevice {
            udn: self.udn,
            device_type: self.device_type,
            friendly_name,
            base_url,
            presentation_url: self.presentation_url,
        })
    }
}

/// Derive `scheme://host:port/` from a description location URL.
fn base_url_from_location(location: &str) -> Result<String> {
    let mut url = Url::parse(location)
        .map_err(|e| DiscoveryError::Parse(format!("bad description location '{location}': {e}")))?;
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}
