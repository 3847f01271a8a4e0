//! MyDynDNS agent
//!
//! The Agent keeps the managed DNS alias pointed at this host's apparent IP:
//! - Performs a blind alias update at startup to establish a baseline
//! - Polls the apparent IP at a fixed interval
//! - Requests an alias update whenever the polled IP differs from the baseline
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────┐
//!                    │  ApiClient   │
//!                    └──────────────┘
//!                      ▲          ▲
//!              my_ip() │          │ update_alias()
//!                      │          │
//! ┌─────────────┐   capacity 1   ┌─────────────┐
//! │   Poller    │───── IpAddr ──▶│   Updater   │
//! │ ("refresh") │                │ ("update")  │
//! └─────────────┘                └─────────────┘
//!        │                              │
//!        └──────── CancellationToken ───┘
//! ```
//!
//! ## Lifecycle
//!
//! 1. STARTING: one `update_alias()` call; its result becomes the baseline
//! 2. RUNNING: poller and updater run as separate tasks
//! 3. STOPPED: both tasks exited after cancellation, `run()` returns `Ok(())`
//!
//! A failed startup update ends in FAILED: `run()` returns
//! [`Error::Startup`], or [`Error::StartupCancelled`] when shutdown was
//! requested before or during that call. Neither task is started.

mod poller;
mod updater;

use crate::error::{Error, Result};
use crate::traits::ApiClient;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

/// Default interval between apparent-IP polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Default capacity of the agent event channel
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the Agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// Startup update succeeded; `ip` is the initial baseline
    Started { ip: IpAddr },

    /// Poller fetched the apparent IP
    Polled { ip: IpAddr },

    /// Poller failed to fetch the apparent IP
    PollFailed { error: String },

    /// Polled IP matched the baseline, nothing to do
    Unchanged { ip: IpAddr },

    /// Alias updated; `ip` is the new baseline as reported by the service
    Updated { previous: IpAddr, ip: IpAddr },

    /// Alias update failed; the baseline is unchanged
    UpdateFailed { error: String },

    /// Both agent tasks have exited
    Stopped,
}

/// Agent settings
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Time between apparent-IP polls (must be non-zero)
    pub poll_interval: Duration,

    /// Capacity of the event channel returned by [`Agent::new`]
    ///
    /// When full, new events are dropped with a warning.
    pub event_channel_capacity: usize,
}

impl AgentConfig {
    /// Create a configuration with the given poll interval
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::config("poll interval must be greater than zero"));
        }
        if self.event_channel_capacity == 0 {
            return Err(Error::config("event channel capacity must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

/// Lossy sender for [`AgentEvent`]s, shared by the agent tasks
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    tx: mpsc::Sender<AgentEvent>,
}

impl EventSink {
    pub(crate) fn emit(&self, event: AgentEvent) {
        // A dropped receiver just means nobody is watching.
        if let Err(mpsc::error::TrySendError::Full(event)) = self.tx.try_send(event) {
            warn!(?event, "Event channel full, dropping event");
        }
    }
}

/// MyDynDNS agent
///
/// The client is injected; the agent holds no global state and can be run
/// more than once (each run is an independent session).
pub struct Agent {
    /// Client for the MyDynDNS service
    client: Arc<dyn ApiClient>,

    /// Time between apparent-IP polls
    poll_interval: Duration,

    /// Event sender for external monitoring
    events: EventSink,
}

impl Agent {
    /// Create a new agent
    ///
    /// # Returns
    ///
    /// A tuple of (agent, event_receiver) where event_receiver yields agent
    /// events. Dropping the receiver is fine.
    pub fn new(
        client: Arc<dyn ApiClient>,
        config: AgentConfig,
    ) -> Result<(Self, mpsc::Receiver<AgentEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let agent = Self {
            client,
            poll_interval: config.poll_interval,
            events: EventSink { tx },
        };

        Ok((agent, rx))
    }

    /// Run the agent until `shutdown` is cancelled
    ///
    /// # Returns
    ///
    /// - `Ok(())`: startup succeeded and both tasks exited after cancellation
    /// - `Err(Error::Startup)`: the startup alias update failed
    /// - `Err(Error::StartupCancelled)`: shutdown was requested before start
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        info!("Initializing agent...");
        let start_ip = self.bootstrap(&shutdown).await?;

        let (tx, rx) = mpsc::channel::<IpAddr>(1);

        let refresh = tokio::spawn(
            poller::poll_ip(
                Arc::clone(&self.client),
                self.poll_interval,
                tx,
                self.events.clone(),
                shutdown.clone(),
            )
            .instrument(info_span!("agent", agent_operation = "refresh")),
        );

        let update = tokio::spawn(
            updater::update_dns(
                Arc::clone(&self.client),
                start_ip,
                rx,
                self.events.clone(),
                shutdown.clone(),
            )
            .instrument(info_span!("agent", agent_operation = "update")),
        );

        let (refresh_result, update_result) = tokio::join!(refresh, update);

        warn!("Agent stopped");
        self.events.emit(AgentEvent::Stopped);

        for (task, result) in [("refresh", refresh_result), ("update", update_result)] {
            if let Err(e) = result {
                error!(task, error = %e, "Agent task terminated abnormally");
                return Err(Error::Other(format!("agent {task} task failed: {e}")));
            }
        }

        Ok(())
    }

    /// Perform the startup alias update
    async fn bootstrap(&self, shutdown: &CancellationToken) -> Result<IpAddr> {
        let outcome = tokio::select! {
            biased;
            result = self.client.update_alias() => result,
            _ = shutdown.cancelled() => Err(Error::Cancelled),
        };

        match outcome {
            Ok(ip) => {
                info!(%ip, "Initialized with IP address after DNS update");
                self.events.emit(AgentEvent::Started { ip });
                Ok(ip)
            }
            Err(e) => {
                if shutdown.is_cancelled() {
                    warn!(reason = %Error::Cancelled, "Shutdown requested before start");
                    error!(error = %e, "Error getting initial IP address");
                    Err(Error::StartupCancelled(Box::new(e)))
                } else {
                    error!(error = %e, "Error getting initial IP address");
                    Err(Error::Startup(Box::new(e)))
                }
            }
        }
    }
}
