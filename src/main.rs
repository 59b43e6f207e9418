//! Application server entry point.
//!
//! # Startup Sequence
//!
//! ```text
//!   .env file ──┐
//!               ├──▶ RuntimeEnvironment ──▶ load_configuration ──▶ Arc<ConfigurationSnapshot>
//!   process env ┘                                 │                          │
//!                                                 ▼                          ▼
//!                                        abort on missing /            AppServer::new
//!                                        invalid settings                    │
//!                                                                            ▼
//!                                                       host check → HTTPS → static → routes
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use site_settings::lifecycle::{initialize, signals, StartupOptions};
use site_settings::{AppServer, Shutdown};

#[derive(Parser)]
#[command(name = "site-settings")]
#[command(about = "Serve the application with environment-driven settings", long_about = None)]
struct Cli {
    /// Application root directory.
    #[arg(short, long, default_value = ".")]
    base_dir: PathBuf,

    /// Environment file to load before reading variables.
    #[arg(short, long)]
    env_file: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = initialize(&StartupOptions {
        base_dir: cli.base_dir,
        env_file: cli.env_file,
    })?;

    let listener = TcpListener::bind(cli.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = AppServer::new(config);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = signals::forward_signals(&shutdown) => {}
    }
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
