//! `config` subcommands

use crate::cli::WriteArgs;
use crate::settings::Settings;
use anyhow::Result;
use mydyndns_core::config::{CONFIG_FILE_STEM, SUPPORTED_EXTENSIONS};
use mydyndns_core::{ClientConfig, ConfigFormat};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Print `key = value` for every effective directive
pub fn show(settings: &Settings, out: &mut dyn Write) -> Result<()> {
    for (key, value) in settings.entries() {
        writeln!(out, "{key} = {value}")?;
    }
    Ok(())
}

/// Run every check `agent start` runs
pub fn validate(settings: &Settings) -> Result<()> {
    settings.config.validate()?;
    Ok(())
}

/// Write the effective (or default) configuration to each named file
pub fn write(settings: &Settings, args: &WriteArgs, out: &mut dyn Write) -> Result<()> {
    if args.validate {
        settings.config.validate()?;
    }

    let config = if args.defaults {
        ClientConfig::default()
    } else {
        settings.config.clone()
    };

    let directory = std::path::absolute(&args.directory)?;
    for name in &args.names {
        let path = output_path(&directory, name);
        config.write(&path, args.safe)?;
        if !args.quiet {
            writeln!(out, "{}", path.display())?;
        }
    }
    Ok(())
}

/// Resolve a write target: a bare extension becomes `mydyndns.<ext>`, and
/// absolute names ignore `directory`
fn output_path(directory: &Path, name: &str) -> PathBuf {
    let name = Path::new(name);
    let name = match (name.extension(), name.file_name()) {
        (None, Some(ext)) => name.with_file_name(format!("{CONFIG_FILE_STEM}.{}", ext.to_string_lossy())),
        _ => name.to_path_buf(),
    };
    directory.join(name)
}

/// Print the supported config file extensions
pub fn list_types(bare: bool, out: &mut dyn Write) -> Result<()> {
    if bare {
        for ext in SUPPORTED_EXTENSIONS {
            writeln!(out, "{ext}")?;
        }
    } else {
        writeln!(out, "Supported config file extensions: {}", SUPPORTED_EXTENSIONS.join(", "))?;
    }
    Ok(())
}

/// Fail unless `name` is, or ends in, a supported extension
pub fn check_type(name: &str) -> Result<()> {
    ConfigFormat::from_name(name)?;
    Ok(())
}
