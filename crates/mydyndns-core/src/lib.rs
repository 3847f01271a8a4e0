// # mydyndns-core
//
// Core library for the MyDynDNS dynamic DNS client.
//
// ## Architecture Overview
//
// - **ApiClient**: Trait for the two MyDynDNS service operations
//   (fetch apparent IP, update alias)
// - **Agent**: Supervisor that bootstraps a baseline IP, then runs a poller
//   and an updater concurrently until cancelled
// - **ClientConfig**: Effective configuration, validation and config files
//
// ## Design Principles
//
// 1. **Injected client**: The agent receives its client; no globals
// 2. **Single-slot hand-off**: Poller and updater share only a capacity-1 channel
// 3. **Cooperative shutdown**: One `CancellationToken` observed by every task
// 4. **Library-First**: The CLI is a thin layer over this crate

pub mod address;
pub mod agent;
pub mod config;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use address::same_address;
pub use agent::{Agent, AgentConfig, AgentEvent};
pub use config::{ClientConfig, ConfigFormat};
pub use error::{Error, Result};
pub use traits::ApiClient;
pub use tokio_util::sync::CancellationToken;
