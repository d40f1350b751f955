//! Healthcheck server startup.

use crate::{ApiState, create_router};
use std::net::SocketAddr;
use tracing::info;
use vigil_core::BotMetrics;
use vigil_error::{ServerError, ServerErrorKind, VigilResult};

/// Bind the healthcheck API and serve it in a background task.
///
/// Binding happens before the task is spawned so a taken port fails startup
/// instead of being discovered later.
///
/// # Errors
///
/// Returns a [`ServerError`] when the listen address cannot be bound.
pub async fn serve_api(port: u16, metrics: BotMetrics) -> VigilResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        ServerError::new(ServerErrorKind::BindFailed {
            addr: addr.to_string(),
            reason: e.to_string(),
        })
    })?;

    info!(%addr, "Healthcheck server listening");

    let router = create_router(ApiState::new(metrics));
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            let err = ServerError::new(ServerErrorKind::Io(e.to_string()));
            tracing::error!(error = %err, "Healthcheck server terminated");
        }
    });

    Ok(())
}
