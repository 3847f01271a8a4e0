//! Test doubles and common utilities for agent contract tests
//!
//! The scripted client answers each call from a queue so tests can lay out a
//! whole poll/update conversation up front, then count what the agent did.

#![allow(dead_code)]

use mydyndns_core::agent::{Agent, AgentConfig, AgentEvent};
use mydyndns_core::error::{Error, Result};
use mydyndns_core::traits::ApiClient;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Poll interval used by the contract tests (time is paused, so it is free)
pub const INTERVAL: Duration = Duration::from_millis(10);

/// One scripted answer
#[derive(Debug, Clone)]
pub enum Reply {
    /// Succeed with this address
    Ip(IpAddr),
    /// Fail with an HTTP error carrying this message
    Fail(&'static str),
    /// Fail with the error a client reports for an aborted request
    Cancelled,
    /// Never complete
    Hang,
}

impl Reply {
    pub fn ip(s: &str) -> Self {
        Self::Ip(ip(s))
    }

    async fn resolve(self) -> Result<IpAddr> {
        match self {
            Reply::Ip(ip) => Ok(ip),
            Reply::Fail(msg) => Err(Error::http(msg)),
            Reply::Cancelled => Err(Error::Cancelled),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// An ApiClient that replays scripted replies and counts calls
#[derive(Default)]
pub struct ScriptedClient {
    fetches: Mutex<VecDeque<Reply>>,
    updates: Mutex<VecDeque<Reply>>,
    fetch_fallback: Option<Reply>,
    update_fallback: Option<Reply>,
    update_delay: Option<Duration>,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for my_ip()
    pub fn fetch(self, reply: Reply) -> Self {
        self.fetches.lock().unwrap().push_back(reply);
        self
    }

    /// Queue a reply for update_alias()
    pub fn update(self, reply: Reply) -> Self {
        self.updates.lock().unwrap().push_back(reply);
        self
    }

    /// Reply used by my_ip() once its queue is empty
    pub fn fetch_otherwise(mut self, reply: Reply) -> Self {
        self.fetch_fallback = Some(reply);
        self
    }

    /// Reply used by update_alias() once its queue is empty
    pub fn update_otherwise(mut self, reply: Reply) -> Self {
        self.update_fallback = Some(reply);
        self
    }

    /// Make every update_alias() call take this long
    pub fn update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = Some(delay);
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn next(queue: &Mutex<VecDeque<Reply>>, fallback: &Option<Reply>) -> Reply {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| fallback.clone())
            .unwrap_or(Reply::Fail("no scripted reply"))
    }
}

#[async_trait::async_trait]
impl ApiClient for ScriptedClient {
    async fn my_ip(&self) -> Result<IpAddr> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.fetches, &self.fetch_fallback).resolve().await
    }

    async fn update_alias(&self) -> Result<IpAddr> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let reply = Self::next(&self.updates, &self.update_fallback);
        if let Some(delay) = self.update_delay {
            tokio::time::sleep(delay).await;
        }
        reply.resolve().await
    }
}

/// A running agent under test
pub struct RunningAgent {
    pub handle: JoinHandle<Result<()>>,
    pub events: mpsc::Receiver<AgentEvent>,
    pub shutdown: CancellationToken,
}

impl RunningAgent {
    /// Wait for the next updater decision (Unchanged / Updated / UpdateFailed)
    pub async fn next_decision(&mut self) -> AgentEvent {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(60), self.events.recv())
                .await
                .expect("timed out waiting for an updater decision")
                .expect("event channel closed");

            match event {
                AgentEvent::Unchanged { .. }
                | AgentEvent::Updated { .. }
                | AgentEvent::UpdateFailed { .. } => return event,
                _ => continue,
            }
        }
    }

    /// Cancel and wait for `run()` to return
    pub async fn stop(self) -> (Result<()>, mpsc::Receiver<AgentEvent>) {
        self.shutdown.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("agent should stop within 5 seconds")
            .expect("agent task should not panic");
        (result, self.events)
    }
}

/// Spawn an agent polling every [`INTERVAL`]
pub fn start_agent(client: Arc<ScriptedClient>) -> RunningAgent {
    start_agent_with(client, CancellationToken::new())
}

/// Spawn an agent with a caller-provided shutdown token
pub fn start_agent_with(client: Arc<ScriptedClient>, shutdown: CancellationToken) -> RunningAgent {
    let config = AgentConfig {
        poll_interval: INTERVAL,
        event_channel_capacity: 256,
    };
    let (agent, events) = Agent::new(client, config).expect("agent construction succeeds");

    let token = shutdown.clone();
    let handle = tokio::spawn(async move { agent.run(token).await });

    RunningAgent {
        handle,
        events,
        shutdown,
    }
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid test address")
}
