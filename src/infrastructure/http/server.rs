//! HTTP server implementation for reverse proxy deployment
//!
//! TLS, compression and CORS are left to the reverse proxy in front of the
//! service. The server builds its collaborators once from configuration and
//! injects them into the routes.

use crate::{
    config::{AppConfig, DatastoreBackend},
    domain::{coupons::RandomSuffixSource, ports::PaymentGateway},
    infrastructure::adapters::{MemoryStore, RazorpayAdapter, Repositories, SupabaseStore},
    infrastructure::http::{models::ApiServices, routes::RouteBuilder},
    shared::{
        error::{AppError, AppResult},
        metrics::AppMetrics,
    },
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// HTTP server implementation optimized for reverse proxy deployment
pub struct HttpServer {
    config: AppConfig,
    services: ApiServices,
}

impl HttpServer {
    /// Create the gateway and datastore clients and wire the services
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let metrics = AppMetrics::new()?;

        let repositories = match config.datastore.backend {
            DatastoreBackend::Memory => {
                warn!("Using the in-memory datastore; data is lost on restart");
                Repositories::from_store(Arc::new(MemoryStore::with_admins(config.auth.admin_user_ids.clone())))
            }
            DatastoreBackend::Supabase => Repositories::from_store(Arc::new(SupabaseStore::new(&config.datastore)?)),
        };

        let gateway: Option<Arc<dyn PaymentGateway>> = if config.razorpay.has_credentials() {
            Some(Arc::new(RazorpayAdapter::new(&config.razorpay)?))
        } else {
            warn!("Razorpay credentials missing; payment endpoints will answer 503");
            None
        };

        let services = ApiServices::assemble(&config, repositories, gateway, Arc::new(RandomSuffixSource), metrics);
        Ok(Self { config, services })
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve until the process is stopped
    #[instrument(skip(self))]
    pub async fn run(self) -> AppResult<()> {
        let addr: std::net::SocketAddr = self
            .config
            .server_address()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;

        info!(
            address = %addr,
            datastore = ?self.config.datastore.backend,
            security_headers = self.config.security.enable_security_headers,
            rate_limit = self.config.rate_limit.enabled,
            "Starting HTTP server (reverse proxy mode)"
        );

        let routes = RouteBuilder::build_routes(&self.config, self.services);
        warp::serve(routes).run(addr).await;

        Ok(())
    }
}
