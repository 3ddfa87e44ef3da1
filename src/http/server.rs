//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the fixed route table
//! - Wire up middleware (tracing, request ID, rate limiting)
//! - Bind the server to a listener and serve with graceful shutdown
//!
//! # Route table
//! | Route | Behavior |
//! |---|---|
//! | GET `/`, `/index.html` | static landing page |
//! | GET `/search?q=` | forward to the configured search endpoint |
//! | GET `/proxy?url=` | forward, rewriting HTML responses |
//! | GET/POST `/formproxy?url=` | forward form submissions (405 otherwise) |
//! | GET `/healthz` | 200 "ok" |
//! | anything else | 404 |

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ProxyConfig;
use crate::http::handlers;
use crate::proxy::Forwarder;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub config: Arc<ProxyConfig>,
}

/// Generates a UUID v4 request id for each inbound request.
#[derive(Clone, Default)]
struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    limiter: Arc<RateLimiter>,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        let state = AppState {
            forwarder: Arc::new(Forwarder::new(config.upstream.clone())),
            config: Arc::new(config.clone()),
        };

        let router = Self::build_router(&config, state, limiter.clone());
        Self {
            router,
            limiter,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState, limiter: Arc<RateLimiter>) -> Router {
        let mut router = Router::new()
            .route("/", get(handlers::index))
            .route("/index.html", get(handlers::index))
            .route("/search", get(handlers::search))
            .route("/proxy", get(handlers::proxy_page))
            .route(
                "/formproxy",
                get(handlers::form_proxy_get).post(handlers::form_proxy_post),
            )
            .route("/healthz", get(handlers::healthz))
            .fallback(handlers::not_found)
            .with_state(state);

        if config.rate_limit.enabled {
            router = router.layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ));
        }

        router
            // Anything that escapes a handler becomes a generic 500
            .layer(CatchPanicLayer::new())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeUuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        // Periodic sweep of idle rate-limit entries
        if self.config.rate_limit.enabled && self.config.rate_limit.sweep_interval_secs > 0 {
            let limiter = self.limiter.clone();
            let interval = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                loop {
                    ticker.tick().await;
                    limiter.sweep_idle();
                    tracing::trace!(
                        tracked_clients = limiter.tracked_clients(),
                        "Swept idle rate-limit entries"
                    );
                }
            });
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
