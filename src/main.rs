use clap::Parser;
use expense_tracker::args::{Args, Command, Common};
use expense_tracker::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let config = load_config(args.common()).await?;

    // Route to appropriate command handler
    match args.command() {
        Command::Interactive => commands::interactive(config).await?.print(),

        Command::List(list_args) => {
            let json = list_args.json;
            let out = commands::list(config, list_args).await?;
            if json {
                out.print_json()?
            } else {
                out.print()
            }
        }

        Command::Summary(summary_args) => {
            let out = commands::summary(config).await?;
            if summary_args.json {
                out.print_json()?
            } else {
                out.print()
            }
        }
    };
    Ok(())
}

/// Loads the config file, if any, and applies the command line overrides.
async fn load_config(common: &Common) -> Result<Config> {
    let mut config = Config::load(common.config()).await?;
    if let Some(seed) = common.seed() {
        config = config.with_seed(seed);
    }
    if let Some(page_size) = common.page_size() {
        config = config.with_page_size(page_size)?;
    }
    Ok(config)
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "expense_tracker",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
