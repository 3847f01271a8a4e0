//! Core traits for the MyDynDNS client
//!
//! - [`ApiClient`]: Fetch the apparent IP and update the managed DNS alias

pub mod api_client;

pub use api_client::ApiClient;
