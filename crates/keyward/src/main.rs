// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyward - command-line tools for the Keyward password vault.
//!
//! This is the binary entry point. Vault state lives in the embedding
//! application; the CLI covers key material, domain matching and the
//! remembered-session record in the local key store.

mod keys;
mod prompt;
mod session;

use clap::{Parser, Subcommand};
use keyward_config::KeywardConfig;
use keyward_core::{Clock, SystemClock, VaultError};
use keyward_storage::SqliteKeyValueStore;
use tracing::debug;

/// Keyward - command-line tools for the Keyward password vault.
#[derive(Parser, Debug)]
#[command(name = "keyward", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Derive the user secret key from the master password and a salt.
    DeriveKey {
        /// Account salt, as stored with the account.
        #[arg(long)]
        salt: String,
    },
    /// Generate a random item key.
    GenerateKey,
    /// Generate a random account salt.
    GenerateSalt,
    /// Print this host's device fingerprint.
    Fingerprint {
        /// Installation identifier to bind into the fingerprint.
        #[arg(long)]
        installation_id: Option<String>,
    },
    /// Reduce a hostname to its root domain (last two labels).
    RootDomain {
        hostname: String,
    },
    /// Check whether a stored credential would be offered on a page.
    Match {
        /// Page domain.
        domain: String,
        /// Stored credential URL.
        #[arg(long, default_value = "")]
        url: String,
        /// Stored credential title.
        #[arg(long, default_value = "")]
        title: String,
    },
    /// Inspect or clear the remembered session.
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
}

#[derive(Subcommand, Debug)]
enum SessionCommands {
    /// Show whether a remembered session could be restored on this host.
    Status {
        /// Installation identifier the session was remembered with.
        #[arg(long)]
        installation_id: Option<String>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete the remembered session record.
    Forget,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match keyward_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            keyward_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.general.log_level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &KeywardConfig) -> Result<(), VaultError> {
    match command {
        Commands::DeriveKey { salt } => {
            let password = prompt::get_master_password()?;
            println!("{}", keys::derive_key(&password, &salt)?);
        }
        Commands::GenerateKey => println!("{}", keys::generate_key()?),
        Commands::GenerateSalt => println!("{}", keys::generate_salt()?),
        Commands::Fingerprint { installation_id } => {
            println!("{}", keys::host_fingerprint(installation_id).generate()?);
        }
        Commands::RootDomain { hostname } => {
            println!("{}", keyward_autofill::root_domain(&hostname));
        }
        Commands::Match { domain, url, title } => {
            let matched = keyward_autofill::matches(&url, &title, &domain);
            println!("{}", if matched { "match" } else { "no match" });
        }
        Commands::Session { action } => {
            let store = SqliteKeyValueStore::open(&config.storage.database_path).await?;
            debug!(path = %config.storage.database_path, "key store opened");
            match action {
                SessionCommands::Status {
                    installation_id,
                    json,
                } => {
                    let fingerprint = keys::host_fingerprint(installation_id);
                    let status = session::record_status(
                        &store,
                        &config.session.record_key,
                        &fingerprint,
                        SystemClock.now_millis(),
                    )
                    .await?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&status)?);
                    } else {
                        println!("{status}");
                    }
                }
                SessionCommands::Forget => {
                    if session::forget(&store, &config.session.record_key).await? {
                        println!("remembered session removed");
                    } else {
                        println!("no remembered session");
                    }
                }
            }
        }
    }
    Ok(())
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("keyward={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
