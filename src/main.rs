use std::path::PathBuf;

use clap::Parser;
use roadwatch::{
    config::{Config, create_app},
    state::AppState,
};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(about = "Citizen-facing tracker for road construction tenders")]
struct Cli {
    /// TOML configuration file.
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// Address to listen on, e.g. `0.0.0.0:5000`.
    #[clap(long)]
    bind: Option<String>,
    /// Directory holding the CSV tables and uploaded photos.
    #[clap(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roadwatch=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let key = config.key()?;
    let bind_address = config.bind_address.clone();
    let state = AppState::new(config, key)?;
    let app = create_app(state);

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %bind_address, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
