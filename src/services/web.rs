//! Axum front-end for the desktop simulator.
//!
//! There are no axum routes: every request, whatever its path or method,
//! goes through the fallback into the request queue, so routing stays in
//! [`RouteTable`](crate::routes::RouteTable) exactly as on the device.

use std::net::SocketAddr;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::WebConfig;
use crate::traits::{HttpMethod, HttpRequest, HttpResponse};

use super::queue::RequestSender;

// ============================================================================
// Handler
// ============================================================================

/// Forward one request to the main loop and wait for its answer.
async fn forward(State(sender): State<RequestSender>, request: Request) -> Response {
    let method = HttpMethod::from_token(request.method().as_str());
    let uri = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let request = HttpRequest::new(method, uri);

    match tokio::task::spawn_blocking(move || sender.call(request)).await {
        Ok(Ok(response)) => into_axum(response),
        Ok(Err(e)) => {
            log::warn!("[HTTP] {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
        Err(e) => {
            log::error!("[HTTP] request task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn into_axum(response: HttpResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, response.content_type)],
        response.body,
    )
        .into_response()
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_permissive: true,
        }
    }
}

impl WebServerConfig {
    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
        }
    }
}

/// Build the router that feeds `sender`.
pub fn build_router(sender: RequestSender, config: &WebServerConfig) -> Router {
    let mut router = Router::new().fallback(forward).with_state(sender);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Bind and serve until the listener fails.
pub async fn run_server(sender: RequestSender, config: WebServerConfig) -> Result<(), std::io::Error> {
    let router = build_router(sender, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("[HTTP] listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_web_config() {
        let config = WebServerConfig::from_config(&WebConfig::default().with_port(3000).with_cors(false));
        assert_eq!(config.addr.port(), 3000);
        assert!(!config.cors_permissive);
    }

    #[test]
    fn response_conversion_keeps_status_and_type() {
        let response = into_axum(HttpResponse::error(500, "<p>Motor error</p>"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html"
        );
    }
}
