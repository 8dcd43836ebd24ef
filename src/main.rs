use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use streamforge::config::Settings;
use streamforge::server;

#[derive(Parser)]
#[command(name = "streamforge")]
#[command(version, about = "Streaming chat API with progressive UI component rendering")]
struct Cli {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to serve on
    #[arg(short, long)]
    port: Option<u16>,

    /// Disable the simulated processing delays
    #[arg(long)]
    no_simulation: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::default();
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if cli.no_simulation {
        settings.simulate_processing = false;
    }

    server::start_server(settings).await
}
