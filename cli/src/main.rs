//! Sova command line: deploy a protocol from configuration and drive it
//! with scripted transactions.

mod script;

use anyhow::Context;
use clap::Parser;
use sova_protocol::{Protocol, ProtocolConfig};
use sova_types::Timestamp;
use sova_utils::LogFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sova", about = "Sova vault engine simulator")]
struct Cli {
    /// Log format: "human" or "json". Overrides the config file.
    #[arg(long, global = true, env = "SOVA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error". Overrides the
    /// config file.
    #[arg(long, global = true, env = "SOVA_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the default configuration as TOML.
    #[command(name = "default-config")]
    DefaultConfig,

    /// Deploy a protocol and run a JSON script of timed actions against it.
    Simulate {
        /// Path to a TOML configuration file. Defaults apply when omitted.
        #[arg(long, env = "SOVA_CONFIG")]
        config: Option<PathBuf>,

        /// Path to the JSON script.
        #[arg(long)]
        script: PathBuf,

        /// Write a snapshot of the final state here.
        #[arg(long)]
        save_state: Option<PathBuf>,

        /// Deployment time in seconds since the epoch.
        #[arg(long, default_value_t = 0)]
        deploy_at: u64,
    },

    /// Print the summary of a saved snapshot.
    Inspect {
        #[arg(long)]
        state: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::DefaultConfig => {
            print!("{}", ProtocolConfig::default().to_toml_string()?);
        }
        Command::Simulate {
            config,
            script,
            save_state,
            deploy_at,
        } => {
            let config = match config {
                Some(path) => ProtocolConfig::from_toml_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ProtocolConfig::default(),
            };
            sova_utils::init_logging(
                cli.log_format.unwrap_or(config.log_format),
                cli.log_level.as_deref().unwrap_or(&config.log_level),
            );

            let steps = script::load_script(&script)?;
            tracing::info!(steps = steps.len(), script = %script.display(), "starting simulation");
            let mut protocol = Protocol::from_config(&config, Timestamp::new(deploy_at))?;
            let report = script::run(&mut protocol, steps)?;

            if let Some(path) = save_state {
                protocol.save_snapshot(&path)?;
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Inspect { state } => {
            sova_utils::init_logging(
                cli.log_format.unwrap_or_default(),
                cli.log_level.as_deref().unwrap_or("info"),
            );
            let protocol = Protocol::load_snapshot(&state)?;
            println!("{}", serde_json::to_string_pretty(&protocol.summary()?)?);
        }
    }
    Ok(())
}
