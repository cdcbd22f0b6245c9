//! kioskctl - Kiosk Idle Watchdog CLI
//!
//! Validate watchdog configuration, replay inactivity scenarios in virtual
//! time, and run an interactive session on the real clock.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod config;
mod error;
mod output;
mod script;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "kioskctl")]
#[command(about = "Kiosk Idle Watchdog CLI - Validate, simulate and run the inactivity watchdog")]
#[command(version)]
#[command(long_about = "
kioskctl drives the kiosk inactivity watchdog: after a period without
user activity it shows an \"are you still there?\" warning, and if the
warning is not answered it sends the kiosk back to its home screen.

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a kiosk configuration file and print the effective settings
    CheckConfig {
        /// Path to the YAML configuration
        path: PathBuf,
    },

    /// Replay a scripted scenario in virtual time
    Simulate {
        /// Path to the YAML scenario
        script: PathBuf,
    },

    /// Run the watchdog on the real clock, reading commands from stdin
    Run {
        /// Path to the YAML configuration (defaults apply when omitted)
        #[arg(short, long, env = "KIOSKCTL_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("kioskctl={log_level},kiosk_idle_watchdog={log_level},kiosk_idle_runtime={log_level}")
                    .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = execute_command(&cli).await;

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            std::process::exit(exit_code);
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::CheckConfig { path } => commands::check_config::execute(path, cli.json),
        Commands::Simulate { script } => commands::simulate::execute(script, cli.json),
        Commands::Run { config } => commands::run::execute(config.as_deref(), cli.json).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_check_config() -> TestResult {
        let cli = Cli::try_parse_from(["kioskctl", "check-config", "kiosk.yaml"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        match &cli.command {
            Commands::CheckConfig { path } => assert_eq!(path, &PathBuf::from("kiosk.yaml")),
            _ => return Err("expected CheckConfig command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from(["kioskctl", "simulate", "walkaway.yaml", "--json", "-vv"])?;
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Simulate { .. }));
        Ok(())
    }

    #[test]
    fn parse_run_with_and_without_config() -> TestResult {
        let cli = Cli::try_parse_from(["kioskctl", "run"])?;
        assert!(matches!(cli.command, Commands::Run { config: None }));

        let cli = Cli::try_parse_from(["kioskctl", "run", "--config", "kiosk.yaml"])?;
        match &cli.command {
            Commands::Run { config } => {
                assert_eq!(config.as_deref(), Some(std::path::Path::new("kiosk.yaml")));
            }
            _ => return Err("expected Run command".into()),
        }
        Ok(())
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["kioskctl"]).is_err());
    }
}
