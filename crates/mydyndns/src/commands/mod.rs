//! Subcommand implementations
//!
//! Commands write their results to the supplied writer (stdout in
//! production) and report failures through the returned error.

mod agent;
mod api;
mod config;

use crate::cli::{AgentCommand, ApiCommand, Cli, Command, ConfigCommand, TypesCommand, render_tree};
use crate::settings::Settings;
use anyhow::Result;
use clap::CommandFactory;
use std::io::Write;

/// Run `command` against the resolved settings
pub async fn run(command: Command, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Agent(AgentCommand::Start) => agent::start(settings).await,
        Command::Api(ApiCommand::MyIp) => api::my_ip(settings, out).await,
        Command::Api(ApiCommand::UpdateAlias) => api::update_alias(settings, out).await,
        Command::Config(ConfigCommand::Show) => config::show(settings, out),
        Command::Config(ConfigCommand::Validate) => config::validate(settings),
        Command::Config(ConfigCommand::Write(args)) => config::write(settings, &args, out),
        Command::Config(ConfigCommand::Types(TypesCommand::List { bare })) => {
            config::list_types(bare, out)
        }
        Command::Config(ConfigCommand::Types(TypesCommand::Check { name })) => {
            config::check_type(&name)
        }
        Command::CommandTree => {
            write!(out, "{}", render_tree(&Cli::command()))?;
            Ok(())
        }
    }
}
