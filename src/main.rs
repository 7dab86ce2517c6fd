use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quire::app::AppContext;
use quire::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = AppContext::load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Run {
            delay,
            no_initial_run,
        } => {
            commands::run(&ctx, delay.as_deref(), no_initial_run).await?;
        }
        Commands::Once => {
            commands::once(&ctx).await?;
        }
        Commands::Show { id } => {
            commands::show(&ctx, &id).await?;
        }
    }

    Ok(())
}
