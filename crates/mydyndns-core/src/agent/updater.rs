//! Alias updater
//!
//! Owns the baseline: the address the alias was last confirmed to point at.
//! Each polled address is compared against it; a difference triggers one
//! `update_alias()` call whose returned address becomes the new baseline.
//! A failed update keeps the old baseline, so the next poll retries.

use super::{AgentEvent, EventSink};
use crate::address::same_address;
use crate::traits::ApiClient;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub(super) async fn update_dns(
    client: Arc<dyn ApiClient>,
    start_ip: IpAddr,
    mut latest_ips: mpsc::Receiver<IpAddr>,
    events: EventSink,
    shutdown: CancellationToken,
) {
    let mut previous = start_ip;

    debug!(starting_ip = %start_ip, "Waiting for refreshed IP address");
    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!(reason = "cancelled", "Shutdown requested");
                break;
            }

            received = latest_ips.recv() => {
                let Some(latest) = received else {
                    debug!("Refresh loop has exited, stopping updates");
                    break;
                };
                previous = reconcile(client.as_ref(), previous, latest, &events).await;
            }
        }
    }
}

/// Compare `latest` against the baseline and update the alias if needed
///
/// Returns the baseline to use from now on.
async fn reconcile(
    client: &dyn ApiClient,
    previous: IpAddr,
    latest: IpAddr,
    events: &EventSink,
) -> IpAddr {
    if same_address(previous, latest) {
        debug!(ip = %latest, "No change in latest IP address");
        events.emit(AgentEvent::Unchanged { ip: latest });
        return previous;
    }

    debug!(%previous, new = %latest, "IP address change detected");
    match client.update_alias().await {
        Ok(alias_ip) => {
            info!(ip = %alias_ip, "Updated IP alias");
            events.emit(AgentEvent::Updated {
                previous,
                ip: alias_ip,
            });
            alias_ip
        }
        Err(e) => {
            error!(error = %e, "Error updating DNS alias");
            events.emit(AgentEvent::UpdateFailed { error: e.to_string() });
            previous
        }
    }
}
