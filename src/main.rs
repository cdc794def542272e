use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use intake::cli::{Cli, Commands};
use intake::commands::{self, Context};
use intake::config::Config;

fn init_tracing(verbose: bool) {
    let default = if verbose { "intake=debug" } else { "intake=warn" };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::resolve(cli.config.as_deref())?;
    debug!(base_url = %config.api.base_url, "config resolved");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        trigger.cancel();
    });

    let context = Context::new(config, cancel);

    match cli.command {
        Commands::Normalize(args) => commands::normalize::run(args),
        Commands::Classify(args) => commands::classify::run(args),
        Commands::Fetch(args) => commands::fetch::run(args, &context).await,
        Commands::Progress(args) => commands::progress::run(args, &context).await,
        Commands::History(args) => commands::history::run(args, &context).await,
        Commands::Scan(args) => commands::scan::run(args),
    }
}
