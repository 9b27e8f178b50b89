// src/main.rs

//! Campaign publisher CLI.
//!
//! Dump, archive and publish all results and artifacts from a campaign.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use campaign_publisher::config::Settings;
use campaign_publisher::pipeline::{self, Outcome};
use campaign_publisher::storage::ObjectStore;

#[derive(Parser, Debug)]
#[command(
    name = "campaign",
    version,
    about = "Dump, archive and publish all results and artifacts from a test campaign"
)]
struct Cli {
    /// Working directory for the result record, artifact tree and archive
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump the campaign's results from the DB
    Fetch,

    /// Download all campaign artifacts from the object store
    Collect,

    /// Run the full pipeline: fetch, collect, archive and publish
    Run,
}

/// Initialize logging from the verbosity flag or the DEBUG env var.
fn init_logging(verbose: bool) {
    let debug_env = std::env::var("DEBUG")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let level = if verbose || debug_env { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    std::process::exit(run(cli).await.exit_code());
}

async fn run(cli: Cli) -> Outcome {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("{err}");
            return Outcome::ZipOrPublishError;
        }
    };

    if let Err(err) = std::fs::create_dir_all(&cli.dir) {
        log::error!(
            "Cannot create working directory {}: {err}",
            cli.dir.display()
        );
        return Outcome::ZipOrPublishError;
    }

    let result = match cli.command {
        Command::Fetch => pipeline::run_fetch(&settings, &cli.dir).await,
        Command::Collect => {
            let store = ObjectStore::connect(&settings).await;
            pipeline::run_collect(&settings, &store, &cli.dir).await
        }
        Command::Run => pipeline::run_pipeline(&settings, &cli.dir).await.map(|_| ()),
    };

    match result {
        Ok(()) => Outcome::Ok,
        Err(err) => {
            log::error!("{err}");
            Outcome::from_error(&err)
        }
    }
}
