//! Plain HTTP listener with bounded graceful shutdown.

use std::future::IntoFuture;
use std::io;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::lifecycle::serve_with_shutdown;
use super::shutdown::{drain_deadline, shutdown_signal};
use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;

/// Binds the configured address and serves `app`.
///
/// After a shutdown signal, in-flight requests get the configured shutdown
/// timeout to finish; whatever is still open afterwards is dropped.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> io::Result<()> {
    let server_addr = server_config.server_addr();

    let listener = TcpListener::bind(server_addr).await.inspect_err(|error| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %error,
            "Failed to bind to address"
        );
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    let shutdown_timeout = server_config.shutdown_timeout();
    serve_with_shutdown(&server_config, || async move {
        let shutdown = CancellationToken::new();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
            .into_future();

        tokio::select! {
            result = server => result,
            () = drain_deadline(shutdown, shutdown_timeout) => Ok(()),
        }
    })
    .await
}
