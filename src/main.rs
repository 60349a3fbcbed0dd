use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use entryflow::cli::Cli;
use entryflow::config::AppConfig;
use entryflow::demo;
use entryflow::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let filter = cli
        .log_filter
        .clone()
        .unwrap_or_else(|| config.log_filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = App::new(config);
    let router = app.spawn_router(cli.start.destination());

    // Headless walkthrough of the main flows; a UI shell would drive the
    // same containers through their subscriptions instead.
    demo::run(&app, cli.start).await?;

    router.abort();
    Ok(())
}
