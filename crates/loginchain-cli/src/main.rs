use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use loginchain_auth::LoginPolicy;
use loginchain_core::LoginConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "loginchain", version, about = "Bedrock login chain tools")]
struct Cli {
    /// Path to a YAML configuration file.
    #[arg(long, global = true, env = "LOGINCHAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a login buffer and print the credentials it carries.
    Inspect {
        /// File holding the raw login buffer.
        buffer: PathBuf,

        /// Print the snapshot as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Verify a chain JSON file (`{"chain": [...]}`) against the authority key.
    Verify {
        chain: PathBuf,
    },

    /// Build a login buffer from a chain JSON file and a client data token.
    Pack {
        #[arg(long)]
        chain: PathBuf,

        #[arg(long)]
        skin: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the authority key in use and its fingerprint.
    Authority,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_policy(config: Option<&Path>) -> anyhow::Result<LoginPolicy> {
    let config = match config {
        Some(path) => LoginConfig::load_with_context(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => LoginConfig::default(),
    };
    LoginPolicy::from_config(&config).context("Failed to resolve authority key")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::Inspect { buffer, json } => {
            let policy = load_policy(cli.config.as_deref())?;
            commands::inspect::run(&buffer, json, &policy)?;
        }
        Command::Verify { chain } => {
            let policy = load_policy(cli.config.as_deref())?;
            if !commands::verify::run(&chain, &policy)? {
                std::process::exit(1);
            }
        }
        Command::Pack {
            chain,
            skin,
            output,
        } => commands::pack::run(&chain, &skin, &output)?,
        Command::Authority => {
            let policy = load_policy(cli.config.as_deref())?;
            commands::authority::run(&policy)?;
        }
    }

    Ok(())
}
