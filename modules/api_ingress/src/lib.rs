//! HTTP host: owns the middleware stack, the host routes and the server loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{
    http::header,
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

pub mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

/// Owns the HTTP server and wraps module routes with the shared middleware.
pub struct ApiIngress {
    // Lock-free config using arc-swap for read-mostly access
    config: ArcSwap<ApiIngressConfig>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    /// Create a new ApiIngress instance with the given configuration
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Get the current configuration (cheap clone from ArcSwap)
    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Replace the configuration used by subsequent `build_router` calls.
    pub fn set_config(&self, config: ApiIngressConfig) {
        self.config.store(Arc::new(config));
    }

    /// Build the HTTP router: host routes, module routes, then middleware.
    ///
    /// `/openapi.json` and `/docs` are mounted only when docs are enabled and a
    /// document is supplied.
    pub fn build_router(
        &self,
        routes: Router,
        openapi: Option<utoipa::openapi::OpenApi>,
    ) -> Result<Router> {
        let config = self.get_config();
        tracing::debug!(?config, "Building router");

        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .merge(routes);

        if config.enable_docs {
            if let Some(doc) = openapi {
                let doc = Arc::new(serde_json::to_value(doc)?);
                router = router
                    .route(
                        "/openapi.json",
                        get(move || {
                            let doc = doc.clone();
                            async move {
                                ([(header::CACHE_CONTROL, "no-store")], Json((*doc).clone()))
                                    .into_response()
                            }
                        }),
                    )
                    .route("/docs", get(web::serve_docs));
                tracing::info!("API docs enabled at /docs");
            } else {
                tracing::warn!("Docs enabled but no OpenAPI document was supplied");
            }
        }

        router = router.fallback(web::route_not_found);

        // The last layer added runs first. Request path:
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
        // -> Timeout -> CORS -> BodyLimit -> handler
        router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));
        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_sec,
            )))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer());

        let x_request_id = request_id::header();
        router = router
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Bind `addr` and serve until `cancel` fires.
    pub async fn serve(
        self: Arc<Self>,
        addr: SocketAddr,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);
        self.serve_on(listener, router, cancel).await
    }

    /// Serve on an already bound listener until `cancel` fires.
    pub async fn serve_on(
        self: Arc<Self>,
        listener: TcpListener,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        // Graceful shutdown on cancel
        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
