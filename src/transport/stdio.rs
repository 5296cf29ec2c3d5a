//! Stdio transport, the default mode for CLI-hosted MCP clients.

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::mcp::BigQueryService;
use crate::transport::Transport;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

/// Serves JSON-RPC over stdin/stdout until the peer disconnects or a
/// shutdown signal arrives.
pub struct StdioTransport {
    config: Arc<GatewayConfig>,
}

impl StdioTransport {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self { config }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> GatewayResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = BigQueryService::new(self.config.clone());
        let running_service = service.serve(stdio()).await.map_err(|e| {
            GatewayError::execution(format!("Failed to start stdio transport: {}", e))
        })?;

        tokio::select! {
            result = running_service.waiting() => {
                result.map_err(|e| {
                    GatewayError::execution(format!("Stdio transport error: {}", e))
                })?;
                info!("Stdio transport completed");
                Ok(())
            }
            _ = wait_for_signal() => {
                // A blocking stdin read cannot be cancelled; exit the
                // process instead of waiting for the peer.
                tokio::spawn(async {
                    wait_for_signal().await;
                    std::process::exit(1);
                });
                info!("Shutdown signal received, exiting");
                std::process::exit(0)
            }
        }
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
