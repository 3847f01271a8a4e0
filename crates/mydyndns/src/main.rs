// # mydyndns - MyDynDNS command-line client
//
// This binary is a THIN integration layer:
// - Parses the command line (flags, `MYDYNDNS_*` environment variables)
// - Merges in the config file to produce the effective configuration
// - Installs logging and the tokio runtime
// - Dispatches to a subcommand
//
// Agent logic lives in mydyndns-core; HTTP lives in mydyndns-sdk.
//
// ## Example
//
// ```bash
// export MYDYNDNS_API_URL=https://dyn.example.com
// export MYDYNDNS_API_KEY=your_key
//
// mydyndns config write toml --validate   # ./mydyndns.toml
// mydyndns agent start -v
// ```

mod cli;
mod commands;
mod logging;
mod settings;
mod signals;

use clap::Parser;
use cli::Cli;
use settings::Settings;
use std::process::ExitCode;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
/// - 3: Shutdown requested before the agent finished starting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MyDynDnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
    /// Agent startup abandoned by a shutdown signal
    StartupInterrupted = 3,
}

impl From<MyDynDnsExitCode> for ExitCode {
    fn from(code: MyDynDnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl MyDynDnsExitCode {
    /// Classify a command failure
    fn for_error(err: &anyhow::Error) -> Self {
        use mydyndns_core::Error;

        match err.downcast_ref::<Error>() {
            Some(
                Error::Config(_)
                | Error::Toml(_)
                | Error::Json(_)
                | Error::Yaml(_)
                | Error::Io(_)
                | Error::Startup(_),
            ) => Self::ConfigError,
            Some(Error::StartupCancelled(_)) => Self::StartupInterrupted,
            _ => Self::RuntimeError,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                MyDynDnsExitCode::ConfigError
            } else {
                MyDynDnsExitCode::CleanShutdown
            }
            .into();
        }
    };

    let settings = match Settings::resolve(&cli.global) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return MyDynDnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = logging::init(settings.config.log_verbosity, settings.config.log_json) {
        eprintln!("{e}");
        return MyDynDnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create tokio runtime");
            return MyDynDnsExitCode::RuntimeError.into();
        }
    };

    let mut stdout = std::io::stdout();
    let result = rt.block_on(commands::run(cli.command, &settings, &mut stdout));

    match result {
        Ok(()) => MyDynDnsExitCode::CleanShutdown.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            MyDynDnsExitCode::for_error(&e).into()
        }
    }
}
