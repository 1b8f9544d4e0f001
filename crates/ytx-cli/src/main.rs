//! 🚀 ytx-cli -- the front door, the bouncer, the maitre d' of ytx.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary parses flags, loads config, builds the logger, and then lets
//! the library do the heavy lifting. Like a manager. 🦆

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum, error::ErrorKind};
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use ytx::app_config::{AppConfig, LogFormat, LoggingConfig, load_config};
use ytx::{MigrationJob, Mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliMode {
    /// 📡 POST every ticket to Danswer's ingestion API
    Api,
    /// 🗂️ write JSON files, a manifest and a zip for Danswer's file connector
    File,
}

/// 🎫 YouTrack → Danswer issue migration
#[derive(Debug, Parser)]
#[command(name = "ytx", version, about)]
struct Args {
    /// YouTrack base URL
    #[arg(long)]
    youtrack_url: String,
    /// YouTrack API token
    #[arg(long)]
    youtrack_token: String,
    /// Danswer base URL (api mode)
    #[arg(long)]
    danswer_url: Option<String>,
    /// Danswer API key (api mode)
    #[arg(long)]
    danswer_key: Option<String>,
    /// Start date for the YouTrack issue query (YYYY-MM-DD)
    #[arg(long)]
    start_date: String,
    /// End date for the YouTrack issue query (YYYY-MM-DD)
    #[arg(long)]
    end_date: String,
    #[arg(long, value_enum, default_value_t = CliMode::File)]
    mode: CliMode,
    /// Output directory (file mode)
    #[arg(long)]
    output_path: Option<PathBuf>,
    /// Danswer connector id, as seen on the Connector Status page (api mode)
    #[arg(long)]
    cc_pair_id: Option<i64>,
    /// Optional TOML config file
    #[arg(long, default_value = "ytx.toml")]
    config: PathBuf,
}

/// 🏠 `~/exports` → `$HOME/exports`, then absolute. No symlink resolution, the directory may not exist yet.
fn resolve_output_path(raw: &Path) -> Result<PathBuf> {
    let the_expanded = match (raw.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(the_rest), Some(the_home)) => PathBuf::from(the_home).join(the_rest),
        _ => raw.to_path_buf(),
    };
    std::path::absolute(&the_expanded).context(format!(
        "💀 Could not make '{}' absolute. The current directory may have been deleted out from under us.",
        raw.display()
    ))
}

/// 🔒 Mode-dependent requirements, checked before anything touches the network.
/// `Err` carries a usage message for clap to print.
fn job_from(args: &Args) -> std::result::Result<MigrationJob, String> {
    let mode = match args.mode {
        CliMode::File => {
            let Some(output_path) = &args.output_path else {
                return Err("--output-path is required when mode is 'file'".to_string());
            };
            let output_path = resolve_output_path(output_path).map_err(|e| format!("{e:#}"))?;
            Mode::File { output_path }
        }
        CliMode::Api => {
            let Some(cc_pair_id) = args.cc_pair_id else {
                return Err("--cc-pair-id is required when mode is 'api'".to_string());
            };
            let (Some(danswer_url), Some(danswer_key)) = (&args.danswer_url, &args.danswer_key)
            else {
                return Err(
                    "--danswer-url and --danswer-key are required when mode is 'api'".to_string(),
                );
            };
            Mode::Api {
                danswer_url: danswer_url.clone(),
                danswer_key: danswer_key.clone(),
                cc_pair_id,
            }
        }
    };
    Ok(MigrationJob {
        youtrack_url: args.youtrack_url.clone(),
        youtrack_token: args.youtrack_token.clone(),
        start_date: args.start_date.clone(),
        end_date: args.end_date.clone(),
        mode,
    })
}

/// 📡 Build the run's subscriber: `RUST_LOG` or `info`, in the configured format, to stderr or a file.
fn build_dispatch(logging: &LoggingConfig) -> Result<Dispatch> {
    let writer = match &logging.file_name {
        Some(file_name) => {
            let the_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_name)
                .context(format!(
                    "💀 The log file '{file_name}' refused to open. Logging to the void is not an option."
                ))?;
            BoxMakeWriter::new(Mutex::new(the_file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(logging.file_name.is_none());

    Ok(match logging.format {
        LogFormat::Pretty => Dispatch::new(builder.pretty().finish()),
        LogFormat::Compact => Dispatch::new(builder.compact().finish()),
        LogFormat::Json => Dispatch::new(builder.json().finish()),
    })
}

/// 🔧 Load config with a throwaway stderr logger, so config trouble is visible
/// before the real logger (which the config describes) exists.
fn bootstrap_config(config_file: &Path) -> Result<AppConfig> {
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::with_default(bootstrap, || {
        let the_file_if_it_exists = match config_file.try_exists().context(format!(
            "💀 Couldn't tell whether the config file exists. Was checking here: '{}'",
            config_file.display()
        ))? {
            true => Some(config_file),
            false => None,
        };
        load_config(the_file_if_it_exists)
            .context("💀 In ytx-cli, main, we couldn't load the config. Take a look at the file and the YTX_* env vars.")
    })
}

/// 🧅 Peel the error onion, one layer at a time, and hint when it smells like the network.
fn report(err: &anyhow::Error) {
    error!("💀 error: {}", err);
    let mut the_vibes_are_giving_connection_issues = false;
    for cause in err.chain().skip(1) {
        error!("⚠️  cause: {}", cause);
        let cause_str = cause.to_string();
        if cause_str.contains("error sending request")
            || cause_str.contains("onnection refused")
            || cause_str.contains("tcp connect error")
            || cause_str.contains("dns error")
            || cause_str.contains("liveness check")
        {
            the_vibes_are_giving_connection_issues = true;
        }
    }
    if the_vibes_are_giving_connection_issues {
        error!(
            "🔧 hint: looks like YouTrack or Danswer isn't reachable. \
            Double-check the URLs, the token, and whether the service is up. \
            Even servers need a nudge sometimes. ☕"
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let job = match job_from(&args) {
        Ok(job) => job,
        Err(the_usage) => Args::command()
            .error(ErrorKind::MissingRequiredArgument, the_usage)
            .exit(),
    };

    let app_config = bootstrap_config(&args.config)?;
    let dispatch = build_dispatch(&app_config.logging)?;

    let result = ytx::run(app_config, job)
        .with_subscriber(dispatch.clone())
        .await;

    if let Err(err) = result {
        tracing::dispatcher::with_default(&dispatch, || report(&err));
        std::process::exit(1);
    }
    Ok(())
}
