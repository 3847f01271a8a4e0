//! `api my-ip` and `api update-alias`

use crate::settings::Settings;
use anyhow::Result;
use mydyndns_sdk::Client;
use std::io::Write;

fn client(settings: &Settings) -> Result<Client> {
    settings.config.validate_client()?;
    Ok(Client::new(&settings.config.api_url, &settings.config.api_key)?)
}

/// Print the apparent IP address
pub async fn my_ip(settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let ip = client(settings)?.my_ip().await?;
    writeln!(out, "{ip}")?;
    Ok(())
}

/// Update the alias and print the address it now points to
pub async fn update_alias(settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let ip = client(settings)?.update_alias().await?;
    writeln!(out, "{ip}")?;
    Ok(())
}
