//! Server setup and lifecycle.

use std::sync::Arc;

use log::{error, info};
use tokio::net::TcpListener;
use tokio::signal;
use todonote_core::init_logging;

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::routes::create_router;
use crate::state::AppState;

/// The todonote HTTP server.
pub struct TodoServer {
    state: Arc<AppState>,
}

impl TodoServer {
    /// Creates a server over the configured JSON data file.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_state(Arc::new(AppState::new(config)))
    }

    /// Creates a server instance from an existing `AppState`.
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Runs the HTTP server until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.socket_addr()?;
        let router = create_router(Arc::clone(&self.state));

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|err| ServerError::Server(format!("failed to bind to {addr}: {err}")))?;

        info!(
            "event=server_start module=server status=ok addr={} data_file={} public_dir={}",
            addr,
            self.state.config.data_file.display(),
            self.state.config.public_dir.display()
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| ServerError::Server(format!("server error: {err}")))?;

        info!("event=server_stop module=server status=ok");
        Ok(())
    }
}

/// Resolves when the process is asked to stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(
                    "event=signal_install module=server status=error signal=terminate error={err}"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("event=shutdown module=server status=start signal=ctrl_c"),
        () = terminate => info!("event=shutdown module=server status=start signal=terminate"),
    }
}

/// Entry point for running the server from environment variables.
pub async fn run_from_env() -> Result<()> {
    let config = ServerConfig::from_env()?;
    init_logging(&config.logging()).map_err(ServerError::Configuration)?;
    TodoServer::new(config).run().await
}
