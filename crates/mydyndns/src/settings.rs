//! Layered configuration
//!
//! Each directive resolves as: CLI flag > `MYDYNDNS_*` environment variable >
//! config file > built-in default. Clap already merges flags and environment
//! variables, so this module only fills the gaps from the config file.

use crate::cli::{ENV_PREFIX, GlobalArgs};
use mydyndns_core::config::{self, format_duration};
use mydyndns_core::{ClientConfig, Error, Result};
use std::path::{Path, PathBuf};

/// Effective configuration plus where it came from
#[derive(Debug, Clone)]
pub struct Settings {
    /// Resolved directives
    pub config: ClientConfig,

    /// Config file actually read, if any
    pub config_file: Option<PathBuf>,

    /// Directory searched for config files
    pub config_path: PathBuf,
}

impl Settings {
    /// Resolve settings from parsed global flags and the process environment
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        Self::resolve_with_env(args, |key| std::env::var(key).ok())
    }

    fn resolve_with_env(args: &GlobalArgs, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config_file = locate_config_file(args.config_file.as_deref(), &args.config_path)?;
        let file = match &config_file {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };

        // A counted flag cannot come from clap's env support.
        let log_verbosity = if args.log_verbosity > 0 {
            args.log_verbosity
        } else {
            let key = format!("{ENV_PREFIX}_LOG_VERBOSITY");
            match env(&key) {
                Some(value) => value.trim().parse().map_err(|_| {
                    Error::config(format!("invalid value {value:?} for {key}"))
                })?,
                None => file.log_verbosity,
            }
        };

        let config = ClientConfig {
            api_url: args.api_url.clone().unwrap_or(file.api_url),
            api_key: args.api_key.clone().unwrap_or(file.api_key),
            interval: args.interval.unwrap_or(file.interval),
            log_verbosity,
            log_json: args.log_json.unwrap_or(file.log_json),
        };

        Ok(Self {
            config,
            config_file,
            config_path: args.config_path.clone(),
        })
    }

    /// `(key, value)` pairs for display, sorted by key
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = self.config.entries();
        entries.push((
            "config-file",
            self.config_file
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        ));
        entries.push(("config-path", self.config_path.display().to_string()));
        entries.sort_by_key(|(key, _)| *key);
        entries
    }

    /// Poll interval rendered the way it is written in config files
    pub fn interval_display(&self) -> String {
        format_duration(self.config.interval)
    }
}

/// An explicit file must exist; otherwise discovery may find nothing
fn locate_config_file(explicit: Option<&Path>, search_path: &Path) -> Result<Option<PathBuf>> {
    let Some(file) = explicit else {
        return Ok(config::discover(search_path));
    };

    let path = if file.is_absolute() {
        file.to_path_buf()
    } else {
        search_path.join(file)
    };

    if !path.is_file() {
        return Err(Error::config(format!(
            "config file {} does not exist",
            path.display()
        )));
    }
    Ok(Some(path))
}
