use clap::Parser;
use std::sync::Arc;
use stubboard_core::broadcast::NoopBroadcaster;
use stubboard_core::config::Config;
use stubboard_core::storage::Stores;
use stubboard_core::App;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stubboard")]
struct Args {
    #[arg(short, long, default_value = "8080")]
    port: u16,
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = match args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let app = App::new(config, Stores::in_memory(), Arc::new(NoopBroadcaster));
    app.start();
    info!("stubboard data plane up; port {} reserved for the HTTP front end", args.port);

    tokio::signal::ctrl_c().await.ok();
    app.shutdown();
    Ok(())
}
