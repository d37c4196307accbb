//! HTTP transport implementation.
//!
//! Serves resource lookups at `/.well-known/webfinger` (and `/`) with the
//! identifier in the `resource` query parameter, plus a `/health` probe.

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use super::{HttpConfig, TransportError, TransportResult};
use crate::core::LookupServer;
use crate::domains::drivers::ErrorKind;
use crate::domains::resources::{self, JRD_CONTENT_TYPE};

/// Well-known lookup path.
pub const WEBFINGER_PATH: &str = "/.well-known/webfinger";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The lookup server instance.
    server: LookupServer,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Run the HTTP transport until Ctrl-C.
    pub async fn run(self, server: LookupServer) -> TransportResult<()> {
        let addr = self.address();
        let app = router(server, self.config.enable_cors);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - {}", self.config.description());
        info!("  → Lookup: GET {}?resource=<identifier>", WEBFINGER_PATH);
        info!("  → Health: GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(TransportError::HttpError)?;

        Ok(())
    }
}

/// Build the router serving lookups for `server`.
pub fn router(server: LookupServer, enable_cors: bool) -> Router {
    let state = AppState { server };

    let mut app = Router::new()
        .route(WEBFINGER_PATH, any(handle_lookup))
        .route("/", any(handle_lookup))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Add CORS if enabled
    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Resolve once Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "server": state.server.name(),
        "version": state.server.version(),
        "driver": state.server.driver_name(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// The first `resource` value of a query string.
fn resource_param(query: &str) -> Option<String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .ok()?
        .into_iter()
        .find_map(|(key, value)| (key == "resource").then_some(value))
}

/// Handle a lookup request.
#[instrument(skip_all, fields(resource))]
async fn handle_lookup(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
) -> Response {
    if method != Method::GET {
        return (StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response();
    }

    let requested = match query.as_deref().and_then(resource_param) {
        Some(r) if !r.is_empty() => r,
        _ => {
            info!("Received blank resource request");
            return (StatusCode::BAD_REQUEST, "bad request").into_response();
        }
    };
    let identifier = requested.as_str();
    tracing::Span::current().record("resource", identifier);

    let resource = match state.server.lookup(identifier).await {
        Ok(resource) => resource,
        Err(e) => {
            return match e.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
                ErrorKind::Resolution => (StatusCode::BAD_GATEWAY, "bad gateway").into_response(),
            };
        }
    };

    match resources::encode(&resource) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, JRD_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Unable to encode resource {}: {}", identifier, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}
