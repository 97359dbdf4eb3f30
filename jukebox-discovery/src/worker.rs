//! Background worker thread for the discovery search.
//!
//! The worker owns a current-thread tokio runtime and drives the SSDP
//! search, forwarding each response into the session adapter. The public
//! side of the control point stays fully synchronous.

use std::collections::HashSet;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use futures::StreamExt;
use ssdp_client::SearchTarget;
use tracing::{debug, info, warn};

use crate::event::DiscoveryEvent;
use crate::session::DiscoverySession;

/// Commands sent from the control point to the worker.
#[derive(Debug)]
pub(crate) enum Command {
    /// Run one asynchronous search.
    Search {
        target: SearchTarget,
        timeout: Duration,
    },
    /// Stop the worker.
    Shutdown,
}

/// MX value for the M-SEARCH request (seconds devices may delay replies).
const SEARCH_MX: usize = 2;

const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Spawn the worker thread. The runtime and HTTP client are built by the
/// caller so that initialization failures surface there.
pub(crate) fn spawn_discovery_worker(
    runtime: tokio::runtime::Runtime,
    http: reqwest::Client,
    session: Arc<DiscoverySession>,
    command_rx: mpsc::Receiver<Command>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        runtime.block_on(run_command_loop(http, session, command_rx));
    })
}

async fn run_command_loop(
    http: reqwest::Client,
    session: Arc<DiscoverySession>,
    command_rx: mpsc::Receiver<Command>,
) {
    info!("discovery worker started");

    loop {
        let command = match next_command(&command_rx).await {
            Some(command) => command,
            None => break,
        };

        match command {
            Command::Shutdown => break,
            Command::Search { target, timeout } => {
                // A shutdown must be able to interrupt a long search.
                tokio::select! {
                    _ = run_search(&session, &http, &target, timeout) => {}
                    _ = shutdown_requested(&command_rx) => break,
                }
            }
        }
    }

    info!("discovery worker shut down");
}

/// Wait for the next command; `None` when the control point is gone.
async fn next_command(command_rx: &mpsc::Receiver<Command>) -> Option<Command> {
    loop {
        match command_rx.try_recv() {
            Ok(command) => return Some(command),
            Err(TryRecvError::Empty) => tokio::time::sleep(COMMAND_POLL_INTERVAL).await,
            Err(TryRecvError::Disconnected) => return None,
        }
    }
}

/// Resolves once a shutdown arrives while a search is active. A second
/// search request during an active one is dropped: there is one search per
/// dialog session.
async fn shutdown_requested(command_rx: &mpsc::Receiver<Command>) {
    loop {
        match command_rx.try_recv() {
            Ok(Command::Shutdown) => return,
            Ok(Command::Search { .. }) => {
                warn!("search already active, ignoring new search request");
            }
            Err(TryRecvError::Empty) => tokio::time::sleep(COMMAND_POLL_INTERVAL).await,
            Err(TryRecvError::Disconnected) => return,
        }
    }
}

async fn run_search(
    session: &DiscoverySession,
    http: &reqwest::Client,
    target: &SearchTarget,
    timeout: Duration,
) {
    debug!(%target, ?timeout, "starting media server search");

    let responses = match ssdp_client::search(target, timeout, SEARCH_MX, None).await {
        Ok(responses) => responses,
        Err(e) => {
            warn!("SSDP search failed to start: {e}");
            // the dialog must never wait on a search that will not report
            session.deliver(http, DiscoveryEvent::SearchTimeout).await;
            return;
        }
    };
    futures::pin_mut!(responses);

    // Devices answer an M-SEARCH several times; skip repeat locations
    // before fetching anything.
    let mut seen_locations = HashSet::new();

    while let Some(response) = responses.next().await {
        match response {
            Ok(response) => {
                let location = response.location().to_string();
                if !seen_locations.insert(location.clone()) {
                    continue;
                }
                session
                    .deliver(
                        http,
                        DiscoveryEvent::Alive {
                            usn: response.usn().to_string(),
                            location,
                        },
                    )
                    .await;
            }
            Err(e) => debug!("discarding unparsable search response: {e}"),
        }
    }

    // stream end is the search timeout
    session.deliver(http, DiscoveryEvent::SearchTimeout).await;
}
