// # API Client Trait
//
// Defines the interface the agent uses to talk to the MyDynDNS web service.
//
// ## Implementations
//
// - HTTP: `mydyndns-sdk` crate
// - Test doubles: `tests/common/mod.rs`
//
// ## Usage
//
// ```rust,ignore
// use mydyndns_core::ApiClient;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let client = /* ApiClient implementation */;
//
//     // Read-only lookup
//     let apparent = client.my_ip().await?;
//
//     // Point the alias at the apparent IP
//     let aliased = client.update_alias().await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for MyDynDNS API client implementations
///
/// Both operations resolve to the IP address reported by the remote service.
///
/// # Cancellation
///
/// Returned futures must be cancel-safe: dropping one aborts the in-flight
/// request without side effects on the caller. The agent relies on this to
/// abandon its startup update when shutdown is requested.
///
/// # Thread Safety
///
/// Implementations must be usable from several tasks at once; the agent
/// shares one client between its poller and its updater.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetch the apparent public IP address of this host
    ///
    /// Must not modify any DNS state on the remote service.
    async fn my_ip(&self) -> Result<IpAddr, crate::Error>;

    /// Point the managed DNS alias at this host's apparent IP address
    ///
    /// Returns the address the alias now resolves to, which callers treat as
    /// authoritative.
    ///
    /// # Idempotency
    ///
    /// Calling this when the alias already matches must succeed and return
    /// the existing address.
    async fn update_alias(&self) -> Result<IpAddr, crate::Error>;
}
