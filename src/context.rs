//! Contextual site data lookup
//!
//! Population, power tariff and land rent near the project location.
//! Lookups are best-effort: any failure resolves to defaults.

use crate::config::PipelineConfig;
use crate::error::DprError;
use crate::models::ContextData;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[async_trait]
pub trait ContextDataSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<ContextData>;
}

/// Fixed values, used when no lookup service is configured
pub struct StubContextData;

#[async_trait]
impl ContextDataSource for StubContextData {
    async fn fetch(&self, _location: &str) -> Result<ContextData> {
        Ok(ContextData::default())
    }
}

/// JSON lookup service: `GET {base_url}/context?location=...`
pub struct HttpContextData {
    client: Client,
    base_url: String,
}

impl HttpContextData {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ContextDataSource for HttpContextData {
    async fn fetch(&self, location: &str) -> Result<ContextData> {
        let url = format!("{}/context", self.base_url);

        let response = self
            .client
            .get(url)
            .query(&[("location", location)])
            .send()
            .await
            .map_err(|e| DprError::ExternalData(format!("Context request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DprError::ExternalData(format!(
                "Context service returned {}",
                status
            )));
        }

        // Missing fields fall back through ContextData's serde defaults
        response
            .json::<ContextData>()
            .await
            .map_err(|e| DprError::ExternalData(format!("Invalid context response: {}", e)))
    }
}

/// HTTP source when a base URL is configured, stub otherwise
pub fn source_from_config(config: &PipelineConfig) -> Arc<dyn ContextDataSource> {
    match config.context_api_base_url.as_deref() {
        Some(base_url) => match HttpContextData::new(base_url, config.context_timeout) {
            Ok(source) => Arc::new(source),
            Err(e) => {
                warn!(error = %e, "Failed to build context client, using stub data");
                Arc::new(StubContextData)
            }
        },
        None => Arc::new(StubContextData),
    }
}

/// Never fails: errors and timeouts resolve to `ContextData::default()`
pub async fn resolve(
    source: &dyn ContextDataSource,
    location: &str,
    limit: Duration,
) -> ContextData {
    match tokio::time::timeout(limit, source.fetch(location)).await {
        Ok(Ok(data)) => {
            debug!(location = %location, "Context data resolved");
            data
        }
        Ok(Err(e)) => {
            warn!(location = %location, error = %e, "Context lookup failed, using defaults");
            ContextData::default()
        }
        Err(_) => {
            warn!(location = %location, "Context lookup timed out, using defaults");
            ContextData::default()
        }
    }
}
