use crate::domain::model::{QueryFilter, RawRecord};
use crate::domain::ports::{ConfigProvider, DatasetClient};
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// 每次查詢最多回傳的列數
pub const ROW_LIMIT: usize = 20;

pub const DEFAULT_BASE_URL: &str = "https://data.seattle.gov/resource";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// SODA 開放資料 API 客戶端
pub struct SodaClient {
    client: Client,
    base_url: String,
    app_token: Option<String>,
}

impl SodaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_token: None,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let client = Self::new(config.upstream_base_url(), config.request_timeout())?;
        Ok(client.with_app_token(config.app_token().map(str::to_string)))
    }

    pub fn with_app_token(mut self, token: Option<String>) -> Self {
        self.app_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn dataset_url(&self, dataset: &str) -> String {
        format!("{}/{}.json", self.base_url, dataset)
    }
}

#[async_trait]
impl DatasetClient for SodaClient {
    async fn query(&self, dataset: &str, filters: &QueryFilter) -> Result<Vec<RawRecord>> {
        let url = self.dataset_url(dataset);
        let limit = ROW_LIMIT.to_string();

        let mut request = self
            .client
            .get(&url)
            .query(&[("$limit", limit.as_str())])
            .query(filters);

        if let Some(token) = &self.app_token {
            request = request.header("X-App-Token", token);
        }

        tracing::debug!(dataset, ?filters, "Querying SODA API: {}", url);

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(dataset, "SODA response status: {}", status);

        if !status.is_success() {
            return Err(LookupError::UpstreamStatus {
                dataset: dataset.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let mut records: Vec<RawRecord> =
            serde_json::from_str(&body).map_err(|source| LookupError::Decode {
                dataset: dataset.to_string(),
                source,
            })?;

        tracing::debug!(dataset, "Decoded {} rows", records.len());
        if records.len() > ROW_LIMIT {
            tracing::warn!(
                dataset,
                "Upstream ignored $limit and returned {} rows, keeping {}",
                records.len(),
                ROW_LIMIT
            );
            records.truncate(ROW_LIMIT);
        }
        Ok(records)
    }
}
