//! `agent start`

use crate::settings::Settings;
use crate::signals;
use anyhow::Result;
use mydyndns_core::{Agent, CancellationToken};
use mydyndns_sdk::Client;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Validate, then run the agent until a shutdown signal arrives
pub async fn start(settings: &Settings) -> Result<()> {
    settings.config.validate()?;

    let shutdown = CancellationToken::new();
    signals::cancel_on_signal(shutdown.clone())?;

    let client = Client::new(&settings.config.api_url, &settings.config.api_key)?;
    info!(
        api_url = %client.base_url(),
        interval = %settings.interval_display(),
        "Starting agent"
    );

    let (agent, mut events) = Agent::new(Arc::new(client), settings.config.agent_config())?;

    // Drain events so the channel never fills up.
    let watcher = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "Agent event");
        }
    });

    let result = agent.run(shutdown).await;
    drop(agent);
    join_watcher(watcher).await;

    if let Err(e) = &result
        && e.is_cancelled()
    {
        warn!(error = %e, "Shutdown requested before the agent started");
    }
    Ok(result?)
}

/// Wait for the event drain task, reporting a panic instead of dropping it
async fn join_watcher(watcher: JoinHandle<()>) -> bool {
    match watcher.await {
        Ok(()) => true,
        Err(e) => {
            error!(task = "events", error = %e, "Agent task terminated abnormally");
            false
        }
    }
}
