//! Command-line interface for the site data loader binary.
//!
//! The CLI runs the pipeline once against the configured GitHub sources and
//! writes the resulting data layer snapshot to stdout or a file. Logs go to
//! stderr so the snapshot stream stays clean.

use std::{
    fs,
    io,
    path::PathBuf,
    process
};

use bridge_site_data::{
    DataSnapshot, DataStore, Error, GithubClient, SourceConfig, io_error, load_config, load_source
};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

/// Command line interface for populating the site data layer.
#[derive(Debug, Parser)]
#[command(
    name = "bridge-site-data",
    version,
    about = "Populate the site data layer from GitHub repositories"
)]
struct Cli {
    /// Path to the YAML configuration describing the source repositories.
    /// The canonical bridge-core sources are used when omitted.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// GitHub access token used to authenticate all repository reads.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// File that receives the data layer snapshot instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(error) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from configuration loading, the fetch
/// pipeline, and snapshot serialization.
async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => SourceConfig::default()
    };

    let client = GithubClient::new(&cli.token)?;
    let store = DataStore::new();

    load_source(&client, &config, &store).await?;

    let snapshot = store.snapshot();
    match cli.output.as_deref() {
        Some(path) => {
            let mut contents = Vec::new();
            write_snapshot(&mut contents, &snapshot, cli.pretty)?;
            fs::write(path, contents).map_err(|source| io_error(path, source))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_snapshot(&mut handle, &snapshot, cli.pretty)?;
        }
    }

    Ok(())
}

fn write_snapshot<W: io::Write>(
    writer: &mut W,
    snapshot: &DataSnapshot,
    pretty: bool
) -> Result<(), Error> {
    if pretty {
        serde_json::to_writer_pretty(writer, snapshot)?;
    } else {
        serde_json::to_writer(writer, snapshot)?;
    }

    Ok(())
}
