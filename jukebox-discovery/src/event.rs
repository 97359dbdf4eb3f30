//! Event types flowing through a discovery session.
//!
//! Discovery yields a closed set of event kinds; dispatching over this enum
//! replaces any open-ended callback plumbing. `SessionNotice` is the much
//! smaller vocabulary the attached dialog sees.

/// A control-point event, as reported by the SSDP search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    /// A device advertised itself or answered the search. The description
    /// document at `location` still has to be fetched and filtered.
    Alive { usn: String, location: String },

    /// A device announced it is leaving the network. Ignored within a
    /// session: the registry is rebuilt from scratch the next time the
    /// dialog opens, so stale entries are acceptable until then.
    ByeBye { usn: String },

    /// The search window ended without being cancelled.
    SearchTimeout,
}

/// What an attached dialog is told about the session.
///
/// Notices are posted over a non-blocking channel; the dialog drains them
/// from its own event loop and re-reads the registry to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    /// A new media server was added to the registry.
    DeviceListChanged,
    /// Scanning has finished; the "still scanning" indicator can go away.
    ScanFinished,
}
