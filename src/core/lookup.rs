use crate::core::badges::{BadgeTable, MatchMode};
use crate::core::formatter::ResultFormatter;
use crate::core::templates::TemplateSet;
use crate::domain::model::{EntityKind, PageContext, QueryFilter, RawRecord, ViewKind};
use crate::domain::ports::DatasetClient;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// 把查詢字串轉成上游條件；同名參數只保留第一個值
///
/// 條件只能是欄位等值比對，`$` 開頭的 SoQL 保留參數（`$limit`、`$where` 等）一律忽略
pub fn query_filter(raw_query: Option<&str>) -> QueryFilter {
    let mut filters = QueryFilter::new();
    if let Some(query) = raw_query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            if key.starts_with('$') {
                tracing::warn!(param = %key, "Ignoring reserved SoQL parameter");
                continue;
            }
            filters
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
    filters
}

/// 三種查詢頁共用的流程：條件 -> 上游查詢 -> 格式化 -> 頁面
pub struct LookupService {
    client: Arc<dyn DatasetClient>,
    templates: TemplateSet,
    badges: Option<BadgeTable>,
}

impl LookupService {
    pub fn new(client: Arc<dyn DatasetClient>, templates: TemplateSet) -> Self {
        Self {
            client,
            templates,
            badges: None,
        }
    }

    /// 啟用徽章資料併入（僅影響警員頁面）
    pub fn with_badges(mut self, table: BadgeTable) -> Self {
        self.badges = Some(table);
        self
    }

    /// 產生單次請求的頁面資料；沒有參數時不呼叫上游
    pub async fn page_context(&self, kind: EntityKind, filters: QueryFilter) -> PageContext {
        let context = PageContext::new(kind);
        if filters.is_empty() {
            return context;
        }

        let html = self.lookup_html(kind, filters).await;
        context.with_entity_html(html)
    }

    pub async fn render(&self, kind: EntityKind, raw_query: Option<&str>) -> Result<String> {
        let context = self.page_context(kind, query_filter(raw_query)).await;
        self.templates.render_page(&context)
    }

    async fn lookup_html(&self, kind: EntityKind, filters: QueryFilter) -> String {
        let dataset = kind.dataset();
        let filters = self.resolve_badge_filter(kind, filters);

        let rows = match self.client.query(dataset, &filters).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(dataset, ?filters, "Error querying SODA API: {}", e);
                Vec::new()
            }
        };
        tracing::info!(dataset, ?filters, "Upstream returned {} rows", rows.len());

        let rows: Vec<RawRecord> = match (&self.badges, kind.view()) {
            (Some(table), ViewKind::Officer) => {
                rows.into_iter().map(|row| table.join_officer(row)).collect()
            }
            _ => rows,
        };

        ResultFormatter::new(&self.templates).format_entities(kind.view(), &rows)
    }

    /// 徽章頁：以 CSV 把 serial 換成姓名後再查上游
    fn resolve_badge_filter(&self, kind: EntityKind, mut filters: QueryFilter) -> QueryFilter {
        let (Some(table), EntityKind::Badge) = (&self.badges, kind) else {
            return filters;
        };
        let Some(serial) = filters.get("serial").cloned() else {
            return filters;
        };

        let criteria = HashMap::from([("Serial".to_string(), serial.clone())]);
        let Some(record) = table.search(&criteria, MatchMode::All).into_iter().next() else {
            tracing::debug!(serial = %serial, "Badge serial not found in local table");
            return filters;
        };

        filters.remove("serial");
        if let Some(first) = record.get("FirstName").filter(|s| !s.is_empty()) {
            filters.insert("first_name".to_string(), first.to_uppercase());
        }
        if let Some(last) = record.get("Surname").filter(|s| !s.is_empty()) {
            filters.insert("last_name".to_string(), last.to_uppercase());
        }
        tracing::debug!(serial = %serial, ?filters, "Resolved badge serial to officer name");
        filters
    }
}
