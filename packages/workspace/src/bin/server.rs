use clap::Parser;
use pagesmith_workspace::{serve, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pagesmith-server")]
#[command(about = "Serve the page builder API", long_about = None)]
struct Args {
    /// Project root holding pagesmith.config.json
    #[arg(default_value = ".")]
    root: PathBuf,

    /// HTTP port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Storage directory (overrides config)
    #[arg(long)]
    storage_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = Config::load(&args.root)?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(storage_dir) = args.storage_dir {
        config.storage_dir = storage_dir;
    }

    println!("Starting Pagesmith server...");
    println!("Storage: {}", config.storage_path(&args.root).display());
    println!("HTTP listening on {}", config.socket_addr());

    serve(&config, &args.root).await
}
