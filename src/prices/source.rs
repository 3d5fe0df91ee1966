use crate::config::ApiConfig;
use crate::error::{Result, SpotovaError};
use crate::logging::{StructuredLogger, get_logger};
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Something that can GET a JSON document from a URL
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value>;
}

/// Price source backed by a shared reqwest client
pub struct HttpPriceSource {
    client: reqwest::Client,
    logger: StructuredLogger,
}

impl HttpPriceSource {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(api.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            logger: get_logger("http"),
        })
    }
}

#[async_trait::async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value> {
        let logger = self.logger.with_field("url", url);
        logger.debug("Requesting price document");

        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            logger.warn(&format!("Price API answered {}", status));
            return Err(SpotovaError::api(format!("HTTP {} from {}", status, url)));
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(body)
    }
}
