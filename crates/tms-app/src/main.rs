use clap::Parser;
use tms_config::Config;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod commands;
pub mod session;
pub mod state;


use self::cli::Cli;
use self::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    // Credentials usually live in a local .env file
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env loaded: {e}");
    }

    let config = match &cli.config {
        Some(path) => Config::load_file(path)?,
        None => Config::new(),
    };

    let state = AppState::new(config)?;
    commands::run(state, cli.command).await
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
