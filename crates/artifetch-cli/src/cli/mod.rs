//! CLI for the artifetch artifact fetcher.

mod commands;

use anyhow::Result;
use artifetch_core::{config, FetchError, FetchStatus};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_get, run_resolve, GetArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "artifetch")]
#[command(about = "Fetch one artifact over HTTP(S), file or smb, resumably and checksum-verified", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a source into a target path and print the resulting path.
    Get(GetArgs),

    /// Compute the digest of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
        /// Hash algorithm: md5, sha1, sha256 or sha512.
        #[arg(long = "hash", default_value = "sha256")]
        algorithm: String,
    },

    /// Show how a source locator is interpreted.
    Resolve {
        /// URL or path.
        source: String,
    },

    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Get(args) => {
                let settings = config::load_or_init().unwrap_or_else(|e| {
                    tracing::warn!("using default transport settings: {:#}", e);
                    config::TransportSettings::default()
                });
                tracing::debug!("loaded settings: {:?}", settings);
                run_get(args, settings).await?
            }
            CliCommand::Checksum { path, algorithm } => run_checksum(&path, &algorithm)?,
            CliCommand::Resolve { source } => run_resolve(&source)?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<FetchError>().map(FetchError::status) {
        Some(FetchStatus::ConfigInvalid) => 2,
        Some(FetchStatus::TransportFailed) => 3,
        Some(FetchStatus::ChecksumFailed) => 4,
        Some(FetchStatus::FilesystemFailed) => 5,
        Some(FetchStatus::Success) | None => 1,
    }
}
