use crate::domain::model::{QueryFilter, RawRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 開放資料查詢介面（SODA 或測試替身）
#[async_trait]
pub trait DatasetClient: Send + Sync {
    async fn query(&self, dataset: &str, filters: &QueryFilter) -> Result<Vec<RawRecord>>;
}

pub trait ConfigProvider: Send + Sync {
    fn bind_addr(&self) -> &str;
    fn upstream_base_url(&self) -> &str;
    fn app_token(&self) -> Option<&str>;
    fn request_timeout(&self) -> Duration;
    fn public_dir(&self) -> &str;
    fn templates_dir(&self) -> Option<&str>;
    fn badge_csv_path(&self) -> Option<&str>;
    fn join_officers(&self) -> bool;
}
