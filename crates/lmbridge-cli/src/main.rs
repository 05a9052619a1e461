//! `lmbridge` entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lmbridge_cli::{Cli, CliConfig, Commands, bootstrap, error, handlers};

fn init_logging(verbose: bool) {
    let default = if verbose { "warn,lmbridge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let hosts = match &cli.command {
        Commands::Fetch { hosts, .. } => hosts.clone(),
        _ => Vec::new(),
    };
    let max_concurrent_files = match &cli.command {
        Commands::Fetch { jobs, .. } => Some(*jobs),
        _ => None,
    };
    let ctx = bootstrap(CliConfig {
        model_root: cli.model_root,
        hosts,
        max_concurrent_files,
    })?;

    match cli.command {
        Commands::Init => handlers::init::execute(&ctx),
        Commands::Find { model } => handlers::find::execute(&ctx, &model),
        Commands::Check { model } => handlers::check::execute(&ctx, &model),
        Commands::Fetch { model, .. } => handlers::fetch::execute(&ctx, &model).await,
        Commands::Chat(args) => handlers::chat::execute(&ctx, &args).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(error::exit_code(&err));
    }
}
