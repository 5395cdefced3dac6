//! API server setup and shared request state.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::alarm::router::CommandRouter;
use crate::alarm::session::SessionSnapshot;
use crate::clock::ClockSource;
use crate::store::AlarmStore;
use crate::tracing::prelude::*;

#[derive(OpenApi)]
#[openapi(info(
    title = "PiAlarm API",
    description = "Alarm clock control and configuration"
))]
struct ApiDoc;

/// Handles shared with every request handler.
#[derive(Clone)]
pub struct SharedState {
    pub commands: CommandRouter,
    pub store: Arc<dyn AlarmStore>,
    pub clock: Arc<dyn ClockSource>,
    pub snapshot_rx: watch::Receiver<SessionSnapshot>,
}

/// Build the full application router. Exposed separately from
/// [`serve`] so handler tests can drive it without a socket.
pub fn build_router(state: SharedState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/v0", super::v0::routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", api))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until the token is cancelled.
pub async fn serve(state: SharedState, port: u16, cancel: CancellationToken) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(addr = %listener.local_addr()?, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    Ok(())
}
