use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use headline_sync::app::AppContext;
use headline_sync::cli::{commands, Cli, Commands};
use headline_sync::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = if cli.ephemeral {
        AppContext::ephemeral(config)
    } else {
        AppContext::new(config)?
    };

    match cli.command {
        Commands::Show { batch } => {
            commands::show(&ctx, batch).await?;
        }
        Commands::Refresh => {
            commands::refresh(&ctx).await?;
        }
        Commands::Clear => {
            commands::clear(&ctx).await?;
        }
        Commands::Watch { interval } => {
            commands::watch(&ctx, interval.as_deref()).await?;
        }
    }

    Ok(())
}
