//! Configuration types for the MyDynDNS client
//!
//! [`ClientConfig`] is the effective configuration shared by every CLI
//! command. It round-trips through JSON, TOML and YAML config files using the same
//! key names as the CLI flags, with durations written Go-style (`"1h0m0s"`).

use crate::agent::{AgentConfig, DEFAULT_POLL_INTERVAL};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File stem used for discovered and generated config files
pub const CONFIG_FILE_STEM: &str = "mydyndns";

/// Shortest poll interval accepted by [`ClientConfig::validate_poll_interval`]
pub const MINIMUM_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Config file extensions, in discovery order
pub const SUPPORTED_EXTENSIONS: &[&str] = &["json", "toml", "yaml", "yml"];

/// Effective client configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClientConfig {
    /// Base URL of the MyDynDNS API (must be HTTPS)
    pub api_url: String,

    /// Client API secret
    pub api_key: String,

    /// How often the agent polls for a new IP
    #[serde(with = "go_duration")]
    pub interval: Duration,

    /// 0 = WARN, 1 = INFO, 2+ = DEBUG
    pub log_verbosity: u8,

    /// Emit JSON log lines instead of text
    pub log_json: bool,
}

impl ClientConfig {
    /// Load a config file, choosing the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        format.parse(&content).map_err(|e| {
            Error::config(format!("error reading config file {}: {e}", path.display()))
        })
    }

    /// Write this config to `path`, choosing the format from its extension
    ///
    /// With `safe`, an existing file is never overwritten.
    pub fn write(&self, path: &Path, safe: bool) -> Result<()> {
        let format = ConfigFormat::from_path(path)?;
        let content = format.render(self)?;

        let mut options = fs::OpenOptions::new();
        options.write(true);
        if safe {
            options.create_new(true);
        } else {
            options.create(true).truncate(true);
        }

        let mut file = options.open(path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::config(format!(
                "config file {} already exists",
                path.display()
            )),
            _ => Error::Io(e),
        })?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Settings for the agent derived from this config
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig::new(self.interval)
    }

    /// Key/value pairs of every directive, sorted by key
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api-key", self.api_key.clone()),
            ("api-url", self.api_url.clone()),
            ("interval", format_duration(self.interval)),
            ("log-json", self.log_json.to_string()),
            ("log-verbosity", self.log_verbosity.to_string()),
        ]
    }

    /// Require an API key
    pub fn validate_api_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::config("missing API key directive"));
        }
        Ok(())
    }

    /// Require an HTTPS base URL
    pub fn validate_base_url(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(Error::config("missing API base URL directive"));
        }
        if !self.api_url.to_lowercase().starts_with("https://") {
            return Err(Error::config(format!(
                "SSL is required for API Base URL (received {:?})",
                self.api_url
            )));
        }
        Ok(())
    }

    /// Require a poll interval of at least [`MINIMUM_POLL_INTERVAL`]
    pub fn validate_poll_interval(&self) -> Result<()> {
        if self.interval < MINIMUM_POLL_INTERVAL {
            return Err(Error::config(format!(
                "poll interval cannot be less than {}",
                format_duration(MINIMUM_POLL_INTERVAL)
            )));
        }
        Ok(())
    }

    /// Checks needed before talking to the API
    pub fn validate_client(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_base_url()
    }

    /// Every check the agent runs before starting
    pub fn validate(&self) -> Result<()> {
        self.validate_client()?;
        self.validate_poll_interval()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            interval: DEFAULT_POLL_INTERVAL,
            log_verbosity: 0,
            log_json: false,
        }
    }
}

// Custom Debug implementation that hides the API key
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<REDACTED>")
            .field("interval", &self.interval)
            .field("log_verbosity", &self.log_verbosity)
            .field("log_json", &self.log_json)
            .finish()
    }
}

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Resolve a bare extension (`"toml"`) or a filename (`"a/b.toml"`)
    pub fn from_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(name);

        match ext {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(Error::config(format!("Unsupported Config Type {other:?}"))),
        }
    }

    fn from_path(path: &Path) -> Result<Self> {
        Self::from_name(&path.to_string_lossy())
    }

    /// The file extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
        }
    }

    fn parse(self, content: &str) -> Result<ClientConfig> {
        match self {
            Self::Json => Ok(serde_json::from_str(content)?),
            Self::Toml => Ok(toml::from_str(content)?),
            Self::Yaml => Ok(serde_yaml::from_str(content)?),
        }
    }

    fn render(self, config: &ClientConfig) -> Result<String> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(config)? + "\n"),
            Self::Toml => Ok(toml::to_string(config)?),
            Self::Yaml => Ok(serde_yaml::to_string(config)?),
        }
    }
}

/// Find `mydyndns.<ext>` in `dir`, trying [`SUPPORTED_EXTENSIONS`] in order
pub fn discover(dir: &Path) -> Option<PathBuf> {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
        .find(|candidate| candidate.is_file())
}

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MIN;

/// Parse a Go-style duration string such as `"1h30m"`, `"10s"` or `"1.5ms"`
///
/// Negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || Error::config(format!("invalid duration {input:?}"));

    let s = input.trim();
    let mut rest = s.strip_prefix('+').unwrap_or(s);
    if rest.starts_with('-') {
        return Err(Error::config(format!("negative duration {input:?} is not allowed")));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| Error::config(format!("missing unit in duration {input:?}")))?;
        let (number, tail) = rest.split_at(number_end);
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        let scale = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SEC,
            "m" => NANOS_PER_MIN,
            "h" => NANOS_PER_HOUR,
            other => {
                return Err(Error::config(format!(
                    "unknown unit {other:?} in duration {input:?}"
                )));
            }
        };

        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(invalid)?;

        if !frac.is_empty() {
            // digits beyond nanosecond precision of an hour cannot matter
            let digits = &frac[..frac.len().min(18)];
            let value: u128 = digits.parse().map_err(|_| invalid())?;
            nanos += value * scale / 10u128.pow(digits.len() as u32);
        }

        total = total.checked_add(nanos).ok_or_else(invalid)?;
        rest = tail;
    }

    let total = u64::try_from(total).map_err(|_| invalid())?;
    Ok(Duration::from_nanos(total))
}

/// Render a duration the way Go does (`"1h0m0s"`, `"10s"`, `"1.5ms"`)
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{nanos}ns");
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", decimal(nanos, NANOS_PER_MICRO, 3));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, NANOS_PER_MILLI, 6));
    }

    let hours = nanos / NANOS_PER_HOUR;
    let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MIN;
    let seconds = decimal(nanos % NANOS_PER_MIN, NANOS_PER_SEC, 9);

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{seconds}s"));
    out
}

fn decimal(value: u128, unit: u128, width: usize) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

mod go_duration {
    use super::{format_duration, parse_duration};
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ClientConfig {
        ClientConfig {
            api_url: "https://dyn.example.com".to_string(),
            api_key: "secret".to_string(),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration(".5m").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("3µs").unwrap(), Duration::from_micros(3));
        assert_eq!(parse_duration("3us").unwrap(), Duration::from_micros(3));
        assert_eq!(parse_duration("+7ns").unwrap(), Duration::from_nanos(7));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        for input in ["", "10", "s", "1d", "-5s", "1..5s", ".s", "1h-5m"] {
            assert!(parse_duration(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_format_duration_matches_go() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
        assert_eq!(format_duration(Duration::from_secs(10)), "10s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.5ms");
        assert_eq!(format_duration(Duration::from_nanos(1500)), "1.5µs");
        assert_eq!(format_duration(Duration::from_nanos(15)), "15ns");
        assert_eq!(parse_duration(&format_duration(Duration::from_secs(5430))).unwrap(), Duration::from_secs(5430));
    }

    #[test]
    fn test_validation_order() {
        let config = ClientConfig::default();
        assert_eq!(config.validate().unwrap_err().to_string(), "missing API key directive");

        let config = ClientConfig {
            api_key: "k".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().to_string(), "missing API base URL directive");

        let config = ClientConfig {
            api_url: "http://dyn.example.com".to_string(),
            ..valid()
        };
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            r#"SSL is required for API Base URL (received "http://dyn.example.com")"#
        );

        let config = ClientConfig {
            interval: Duration::from_secs(9),
            ..valid()
        };
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "poll interval cannot be less than 10s"
        );

        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_https_prefix_is_case_insensitive() {
        let config = ClientConfig {
            api_url: "HTTPS://DYN.EXAMPLE.COM".to_string(),
            ..valid()
        };
        assert!(config.validate_base_url().is_ok());
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(ConfigFormat::from_name("toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_name("json").unwrap(), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_name("dir/app.toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_name("yaml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_name("yml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_name("foobar.yaml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_name("mydyndns.yml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(
            ConfigFormat::from_name("bespokeformat").unwrap_err().to_string(),
            r#"Unsupported Config Type "bespokeformat""#
        );
        assert!(ConfigFormat::from_name("app.ini").is_err());
    }

    #[test]
    fn test_toml_uses_flag_names() {
        let rendered = ConfigFormat::Toml.render(&valid()).unwrap();
        assert!(rendered.contains("api-url = \"https://dyn.example.com\""));
        assert!(rendered.contains("interval = \"1h0m0s\""));

        let parsed = ConfigFormat::Toml
            .parse("api-key = \"k\"\ninterval = \"30s\"\n")
            .unwrap();
        assert_eq!(parsed.api_key, "k");
        assert_eq!(parsed.interval, Duration::from_secs(30));
        assert_eq!(parsed.api_url, "");
    }

    #[test]
    fn test_write_then_load_each_format() {
        let dir = tempfile::tempdir().unwrap();
        for ext in SUPPORTED_EXTENSIONS {
            let path = dir.path().join(format!("{CONFIG_FILE_STEM}.{ext}"));
            valid().write(&path, false).unwrap();
            assert_eq!(ClientConfig::load(&path).unwrap(), valid());
        }
        assert_eq!(discover(dir.path()), Some(dir.path().join("mydyndns.json")));
    }

    #[test]
    fn test_yaml_is_discovered_and_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mydyndns.yml");
        fs::write(&path, "api-url: https://dyn.example.com\napi-key: k\ninterval: 2m\nlog-json: true\n").unwrap();

        assert_eq!(discover(dir.path()), Some(path.clone()));
        let parsed = ClientConfig::load(&path).unwrap();
        assert_eq!(parsed.api_url, "https://dyn.example.com");
        assert_eq!(parsed.interval, Duration::from_secs(120));
        assert!(parsed.log_json);

        let rendered = ConfigFormat::Yaml.render(&valid()).unwrap();
        assert!(rendered.contains("api-url:"));
        assert!(rendered.contains("1h0m0s"));
    }

    #[test]
    fn test_safe_write_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mydyndns.toml");
        fs::write(&path, "api-key = \"keep\"\n").unwrap();

        let err = valid().write(&path, true).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(ClientConfig::load(&path).unwrap().api_key, "keep");

        valid().write(&path, false).unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap(), valid());
    }

    #[test]
    fn test_discover_without_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(discover(dir.path()), None);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", valid());
        assert!(!debug.contains("secret"));
        assert!(debug.contains("ClientConfig"));
    }
}
