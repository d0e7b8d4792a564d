//! `mailrandom` - pick a weighted-random option and print it or mail it.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod args;
mod config;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use mailrandom_core::RngSource;
use mailrandom_core::mail::MAIL_HELP;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;
use config::{Command, RunConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mailrandom: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "mailrandom=debug,mailrandom_core=debug,mailrandom_smtp=debug"
    } else {
        "mailrandom=warn,mailrandom_core=warn,mailrandom_smtp=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run(args: Args) -> Result<()> {
    match Command::from_args(args) {
        Command::MailHelp => println!("{MAIL_HELP}"),
        Command::Usage => Args::command().print_help()?,
        Command::Run(config) => announce(&config).await?,
    }
    Ok(())
}

async fn announce(config: &RunConfig) -> Result<()> {
    let options = config.source.load()?;
    // Delivery problems such as a missing password surface before the draw.
    let delivery = config.delivery()?;
    debug!(options = options.len(), total = options.total_weight(), "options loaded");

    let mut source = match config.seed {
        Some(seed) => RngSource::seeded(seed),
        None => RngSource::from_entropy(),
    };
    let selection = options.draw(&mut source)?;
    info!(selection, category = %config.category, "drew selection");

    delivery
        .announce(&config.category, selection, &mut io::stdout())
        .await?;
    Ok(())
}
