//! Get command: one `DownloadClient::get` with Ctrl-C wired to cancellation.

use anyhow::{Context, Result};
use artifetch_core::config::TransportSettings;
use artifetch_core::{CancelToken, DownloadClient, DownloadConfig, ProgressSink, TracingSink};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// http(s):// URL, file:// URI, smb://host/share/path or a plain path.
    pub source: String,

    /// Where to put the artifact. Required for network sources and copies.
    #[arg(long, short = 'o')]
    pub target: Option<PathBuf>,

    /// Expected digest as hex.
    #[arg(long, value_name = "HEX")]
    pub checksum: Option<String>,

    /// Algorithm of --checksum.
    #[arg(long = "hash", default_value = "sha256", value_name = "ALGO")]
    pub algorithm: String,

    /// Use local and share sources in place instead of copying them to --target.
    #[arg(long)]
    pub no_copy: bool,

    /// User-Agent for HTTP requests.
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Send status lines to the log instead of stderr.
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl GetArgs {
    pub fn to_config(&self) -> Result<DownloadConfig> {
        let mut builder = DownloadConfig::builder(self.source.clone()).copy_on_local(!self.no_copy);
        if let Some(target) = &self.target {
            builder = builder.target(target);
        }
        if let Some(sum) = &self.checksum {
            builder = builder.checksum_hex(self.algorithm.clone(), sum)?;
        }
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        Ok(builder.build())
    }

    pub fn sink(&self) -> Arc<dyn ProgressSink> {
        if self.quiet {
            Arc::new(TracingSink)
        } else {
            Arc::new(ConsoleSink)
        }
    }
}

/// Status lines on stderr so stdout carries only the result path.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn say(&self, message: &str) {
        eprintln!("==> {}", message);
    }
}

pub async fn run_get(args: GetArgs, settings: TransportSettings) -> Result<()> {
    let config = args.to_config()?;
    let token = CancelToken::new();
    let client = DownloadClient::new(config, args.sink())
        .with_settings(settings)
        .with_cancel(token.clone());

    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("==> interrupted; partial download kept for resume");
            token.cancel();
        }
    });

    let result = tokio::task::spawn_blocking(move || client.get())
        .await
        .context("download worker panicked")?;
    watcher.abort();

    let path = result?;
    println!("{}", path.display());
    Ok(())
}
