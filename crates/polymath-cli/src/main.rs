mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (also receives `log` records from polymath-core)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let env_file = cli.env_file.as_deref();
    let format = cli.format;

    info!("polymath v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Seed(args) => cli::seed::run(args, env_file, format).await,
        Commands::CheckConfig => cli::doctor::run(env_file).await,
        command => {
            let ctx = cli::connect(env_file).await?;
            match command {
                Commands::Fields => cli::catalog::fields(&ctx, format).await,
                Commands::Experts(args) => cli::catalog::experts(args, &ctx, format).await,
                Commands::Topics(args) => cli::generate::topics(args, &ctx, format).await,
                Commands::Essay(args) => cli::generate::essay(args, &ctx, format).await,
                Commands::Debate(args) => cli::generate::debate(args, &ctx, format).await,
                Commands::Content(args) => cli::content::run(args, &ctx, format).await,
                Commands::Embed(args) => cli::generate::embed(args, &ctx, format).await,
                Commands::Seed(_) | Commands::CheckConfig => unreachable!(),
            }
        }
    }
}
