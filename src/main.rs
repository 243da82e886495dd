use anyhow::{Context, Result};
use tracing::{error, info};

use project_deck::logging;
use project_deck::server::{ProjectServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config_dir = ServerConfig::default_config_dir();
    let config = ServerConfig::load(&config_dir)
        .and_then(ServerConfig::with_env_overrides)
        .context("failed to load configuration")?;

    let server = ProjectServer::open(config, &config_dir).context("failed to open database")?;
    let handle = server.start().await.context("failed to start server")?;
    info!(url = %handle.base_url(), "project-deck listening");

    shutdown_signal().await;
    info!("shutting down");
    handle.shutdown_and_wait().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install ctrl+c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install sigterm handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
