use std::sync::Arc;

use db::DbHandle;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::SubscriptionsConfig;
use crate::domain::repo::SubscriptionsRepository;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::{migrations::MIGRATOR, PgSubscriptionsRepository};

/// Wires the subscriptions repository, service and REST routes.
#[derive(Clone)]
pub struct Subscriptions {
    service: Arc<Service>,
}

impl Subscriptions {
    /// Build the module on top of a connected database.
    pub fn init(cfg: &SubscriptionsConfig, db: &DbHandle) -> Self {
        info!("Initializing subscriptions module");
        let repo = PgSubscriptionsRepository::new(db.pool().clone());
        Self::with_repo(cfg, Arc::new(repo))
    }

    /// Build the module over any repository implementation.
    pub fn with_repo(cfg: &SubscriptionsConfig, repo: Arc<dyn SubscriptionsRepository>) -> Self {
        debug!(
            "Loaded subscriptions config: default_page_size={}, max_page_size={}",
            cfg.default_page_size, cfg.max_page_size
        );
        let service = Service::new(repo, ServiceConfig::from(cfg));
        Self {
            service: Arc::new(service),
        }
    }

    pub async fn migrate(db: &DbHandle) -> anyhow::Result<()> {
        info!("Running subscriptions database migrations");
        db.migrate(&MIGRATOR).await?;
        info!("Subscriptions database migrations completed successfully");
        Ok(())
    }

    pub fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering subscriptions REST routes");
        let router = routes::register_routes(router, self.service.clone())?;
        info!("Subscriptions REST routes registered successfully");
        Ok(router)
    }

    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        routes::openapi()
    }
}
