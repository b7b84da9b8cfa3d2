pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::app::{create_router, AppState};
pub use crate::config::AppConfig;
pub use crate::core::{
    badges::BadgeTable, lookup::LookupService, soda::SodaClient, templates::TemplateSet,
};
pub use crate::utils::error::{LookupError, Result};

use crate::domain::ports::ConfigProvider;
use std::sync::Arc;

/// 依設定組出查詢服務：SODA 客戶端、範本與徽章資料表
pub fn build_lookup_service<C: ConfigProvider>(config: &C) -> Result<LookupService> {
    let client = SodaClient::from_config(config)?;

    let templates = match config.templates_dir() {
        Some(dir) => TemplateSet::from_dir(dir)?,
        None => TemplateSet::embedded()?,
    };

    let service = LookupService::new(Arc::new(client), templates);

    match (config.join_officers(), config.badge_csv_path()) {
        (true, Some(path)) => Ok(service.with_badges(BadgeTable::load_or_empty(path))),
        _ => Ok(service),
    }
}
