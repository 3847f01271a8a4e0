//! Command-line definition
//!
//! ```text
//! mydyndns
//! ├── agent
//! │   └── start
//! ├── api
//! │   ├── my-ip
//! │   └── update-alias
//! └── config
//!     ├── show
//!     ├── types
//!     │   ├── check
//!     │   └── list
//!     ├── validate
//!     └── write
//! ```
//!
//! Every global flag can also be set through a `MYDYNDNS_<FLAG>` environment
//! variable (`--api-url` reads `MYDYNDNS_API_URL`).

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use mydyndns_core::ConfigFormat;
use mydyndns_core::config::parse_duration;
use std::path::PathBuf;
use std::time::Duration;

/// Prefix of the environment variables bound to global flags
pub const ENV_PREFIX: &str = "MYDYNDNS";

/// `mydyndns` command line
#[derive(Parser, Debug)]
#[command(
    name = "mydyndns",
    version,
    about = "Dynamic DNS utility",
    long_about = "mydyndns is a dynamic DNS utility. It offers a configurable agent which can be used to \
                  periodically refresh from and send updates to a remote DNS management service."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every subcommand
///
/// Unset directives are `None` so they can fall back to the config file.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Explicitly set a config file (disables config file discovery)
    #[arg(long, global = true, env = "MYDYNDNS_CONFIG_FILE", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Search path for config file discovery when --config-file is not set to an absolute path
    #[arg(
        long,
        global = true,
        env = "MYDYNDNS_CONFIG_PATH",
        default_value = ".",
        value_name = "DIR"
    )]
    pub config_path: PathBuf,

    /// Base URL for the mydyndns control API
    #[arg(short = 'u', long, global = true, env = "MYDYNDNS_API_URL")]
    pub api_url: Option<String>,

    /// How often to poll for a new IP [default: 1h0m0s]
    #[arg(
        short = 'i',
        long,
        global = true,
        env = "MYDYNDNS_INTERVAL",
        value_parser = parse_interval
    )]
    pub interval: Option<Duration>,

    /// Client API secret
    #[arg(
        short = 'k',
        long,
        global = true,
        env = "MYDYNDNS_API_KEY",
        hide_env_values = true
    )]
    pub api_key: Option<String>,

    /// Increase logging verbosity level (default WARN)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub log_verbosity: u8,

    /// Whether to output JSON logs
    #[arg(
        long,
        global = true,
        env = "MYDYNDNS_LOG_JSON",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Controls the mydyndns agent
    #[command(subcommand)]
    Agent(AgentCommand),

    /// mydyndns API client operations
    #[command(subcommand)]
    Api(ApiCommand),

    /// Utilities to assist with configuring the mydyndns agent
    #[command(
        subcommand,
        long_about = "mydyndns reads configuration directives from the following sources (in order of \
                      precedence): CLI flags, environment variables, and a configuration file. When \
                      --config-file is not set, mydyndns looks in --config-path for a file named \
                      \"mydyndns.<ext>\", where <ext> is any supported config file extension."
    )]
    Config(ConfigCommand),

    /// Prints an ASCII tree of the (sub)command hierarchy
    #[command(hide = true)]
    CommandTree,
}

#[derive(Subcommand, Debug)]
pub enum AgentCommand {
    /// Starts the agent (as a long-running process)
    #[command(
        long_about = "Starts a long-running agent process that periodically polls for the external-facing \
                      IP address of the host machine by querying the configured mydyndns API service. When \
                      the address changes, the service is asked to point the DNS alias at the new IP."
    )]
    Start,
}

#[derive(Subcommand, Debug)]
pub enum ApiCommand {
    /// Show the external-facing IP address
    MyIp,

    /// Request a DNS update that points to the external-facing IP address
    UpdateAlias,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Displays the effective configuration
    Show,

    /// Utilities for supported configuration file types
    #[command(subcommand)]
    Types(TypesCommand),

    /// Checks the effective agent configuration for issues
    Validate,

    /// Writes one or more config files based on the effective configuration
    Write(WriteArgs),
}

#[derive(Subcommand, Debug)]
pub enum TypesCommand {
    /// Check if the supplied configuration file type is supported
    Check {
        /// Bare type ("toml") or filename ("config.toml")
        name: String,
    },

    /// Print the supported configuration file types (as extensions)
    List {
        /// Outputs one extension per line
        #[arg(long)]
        bare: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct WriteArgs {
    /// Bare type ("toml" writes mydyndns.toml) or filename ("example.json")
    #[arg(required = true, num_args = 1.., value_name = "[FILENAME.]EXT", value_parser = parse_config_name)]
    pub names: Vec<String>,

    /// Directory where output files specified with relative paths will be written
    #[arg(short = 'd', long, default_value = ".")]
    pub directory: PathBuf,

    /// Fails when an existing file would be overwritten
    #[arg(long)]
    pub safe: bool,

    /// Ensures that the effective configuration is valid before writing any file(s)
    #[arg(long)]
    pub validate: bool,

    /// Do not print filenames as they are written
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Ignore effective configuration and write default directive values
    #[arg(long)]
    pub defaults: bool,
}

fn parse_interval(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

fn parse_config_name(value: &str) -> Result<String, String> {
    ConfigFormat::from_name(value)
        .map(|_| value.to_string())
        .map_err(|e| e.to_string())
}

/// Render the visible command hierarchy as an ASCII tree
///
/// Hidden commands and `help` are left out; siblings are sorted by name.
pub fn render_tree(cmd: &clap::Command) -> String {
    let mut out = format!("{}\n", cmd.get_name());
    render_children(cmd, "", &mut out);
    out
}

fn render_children(cmd: &clap::Command, prefix: &str, out: &mut String) {
    let mut children: Vec<_> = cmd
        .get_subcommands()
        .filter(|c| !c.is_hide_set() && c.get_name() != "help")
        .collect();
    children.sort_by_key(|c| c.get_name());

    let last = children.len().saturating_sub(1);
    for (i, child) in children.into_iter().enumerate() {
        let (branch, indent) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(child.get_name());
        out.push('\n');
        render_children(child, &format!("{prefix}{indent}"), out);
    }
}
