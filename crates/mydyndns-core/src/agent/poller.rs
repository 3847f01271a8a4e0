//! Apparent-IP poller
//!
//! Fetches the apparent IP once per interval and hands successful results to
//! the updater. Fetch failures are logged and the next tick tries again.
//!
//! The hand-off channel holds a single value. When the updater is still busy
//! with the previous one, the send waits, which delays the next tick rather
//! than dropping it.

use super::{AgentEvent, EventSink};
use crate::traits::ApiClient;
use chrono::{SecondsFormat, Utc};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub(super) async fn poll_ip(
    client: Arc<dyn ApiClient>,
    interval: Duration,
    polled_ips: mpsc::Sender<IpAddr>,
    events: EventSink,
    shutdown: CancellationToken,
) {
    debug!(?interval, "Starting periodic refresh");

    // First tick fires one full interval after start, like a ticker.
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = IntervalStream::new(ticker);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!(reason = "cancelled", "Shutdown requested");
                break;
            }

            Some(_) = ticks.next() => {
                let trigger_ts = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
                debug!(%trigger_ts, "Fetching my IP address...");

                let ip = match client.my_ip().await {
                    Ok(ip) => ip,
                    Err(e) => {
                        error!(%trigger_ts, error = %e, "Error fetching my IP address");
                        events.emit(AgentEvent::PollFailed { error: e.to_string() });
                        continue;
                    }
                };

                info!(%trigger_ts, %ip, "Fetched my IP address");
                events.emit(AgentEvent::Polled { ip });

                tokio::select! {
                    biased;

                    _ = shutdown.cancelled() => {
                        debug!(reason = "cancelled", %ip, "Shutdown requested before hand-off");
                        break;
                    }

                    sent = polled_ips.send(ip) => {
                        if sent.is_err() {
                            debug!("Update loop has exited, stopping refresh");
                            break;
                        }
                    }
                }
            }
        }
    }
}
