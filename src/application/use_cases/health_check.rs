use crate::{
    domain::{health::*, ports::DatastoreHealth},
    shared::error::AppResult,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

/// Health check use case
pub struct HealthCheckUseCase {
    datastore: Arc<dyn DatastoreHealth>,
    gateway_configured: bool,
    started_at: Instant,
}

impl HealthCheckUseCase {
    pub fn new(datastore: Arc<dyn DatastoreHealth>, gateway_configured: bool) -> Self {
        Self {
            datastore,
            gateway_configured,
            started_at: Instant::now(),
        }
    }

    /// Probe the datastore and report gateway configuration
    pub async fn execute(&self) -> AppResult<HealthResponse> {
        let mut status = HealthStatus::Healthy;
        let mut warnings = Vec::new();

        let datastore_available = match self.datastore.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Datastore health probe failed");
                warnings.push("Datastore is currently unreachable");
                false
            }
        };
        if !datastore_available {
            status = HealthStatus::Degraded;
        }
        if !self.gateway_configured {
            status = HealthStatus::Degraded;
            warnings.push("Payment gateway credentials are not configured");
        }

        let mut details = json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION"),
            "uptime": self.uptime(),
            "datastore": {
                "backend": self.datastore.backend_name(),
                "available": datastore_available,
            },
            "payment_gateway": {
                "configured": self.gateway_configured,
            },
        });
        if !warnings.is_empty() {
            details["warnings"] = json!(warnings);
        }

        Ok(HealthResponse::new(status, details))
    }

    fn uptime(&self) -> String {
        let secs = self.started_at.elapsed().as_secs();
        format!("{}d {}h {}m", secs / 86400, (secs % 86400) / 3600, (secs % 3600) / 60)
    }
}
