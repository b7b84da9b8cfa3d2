use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 上游查詢條件：欄位名稱 -> 值（等值比對）
pub type QueryFilter = BTreeMap<String, String>;

/// CSV 中的一筆警員徽章資料，以表頭為鍵
pub type BadgeRecord = HashMap<String, String>;

pub const LICENSE_DATASET: &str = "enxu-fgzb";
pub const OFFICER_DATASET: &str = "2khk-5ukd";

/// 上游 JSON 陣列中的一列原始資料
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    pub data: HashMap<String, serde_json::Value>,
}

/// 單列欄位不符預期時的原因，該列會被略過
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Missing(String),
    WrongType { field: String, found: &'static str },
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Missing(field) => write!(f, "missing field `{}`", field),
            FieldError::WrongType { field, found } => {
                write!(f, "field `{}` is {}, expected string", field, found)
            }
        }
    }
}

impl RawRecord {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        Self {
            data: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 取得必填字串欄位
    pub fn required_str(&self, field: &str) -> Result<&str, FieldError> {
        match self.data.get(field) {
            None | Some(serde_json::Value::Null) => Err(FieldError::Missing(field.to_string())),
            Some(serde_json::Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(FieldError::WrongType {
                field: field.to_string(),
                found: json_type_name(other),
            }),
        }
    }

    /// 選填字串欄位，缺少或型別不符時回傳空字串
    pub fn optional_str(&self, field: &str) -> &str {
        self.data
            .get(field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    /// 數值欄位，接受字串或數字；無法解析時為 0
    pub fn lenient_f64(&self, field: &str) -> f64 {
        match self.data.get(field) {
            Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleView {
    pub license: String,
    pub make: String,
    pub model: String,
    pub department: String,
    pub description: String,
    pub equipment_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficerView {
    pub badge: String,
    pub name: String,
    pub rank: String,
    pub unit: String,
    pub job_title: String,
    pub hourly_rate: String,
    pub projected_salary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayRecord {
    Vehicle(VehicleView),
    Officer(OfficerView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Vehicle,
    Officer,
}

/// 每種查詢頁面的固定說明文字
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: &'static str,
    pub entity_name_long: &'static str,
    pub entity_name_short: &'static str,
    pub data_source: &'static str,
    pub lookup_url: &'static str,
    /// 表單輸入欄位名稱，同時也是上游的欄位名稱
    pub query_field: &'static str,
}

pub const LICENSE_META: PageMeta = PageMeta {
    title: "Seattle Public Vehicle Lookup",
    entity_name_long: "license plate",
    entity_name_short: "License #",
    data_source: "https://data.seattle.gov/resource/enxu-fgzb",
    lookup_url: "license",
    query_field: "license",
};

pub const BADGE_META: PageMeta = PageMeta {
    title: "Seattle Officer Badge Lookup",
    entity_name_long: "badge number",
    entity_name_short: "Badge #",
    data_source: "https://data.seattle.gov/resource/2khk-5ukd",
    lookup_url: "badge",
    query_field: "serial",
};

pub const NAME_META: PageMeta = PageMeta {
    title: "Seattle Officer Name Lookup",
    entity_name_long: "last name",
    entity_name_short: "Last name",
    data_source: "https://data.seattle.gov/resource/2khk-5ukd",
    lookup_url: "name",
    query_field: "last_name",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    License,
    Badge,
    Name,
}

impl EntityKind {
    pub fn dataset(self) -> &'static str {
        match self {
            EntityKind::License => LICENSE_DATASET,
            EntityKind::Badge | EntityKind::Name => OFFICER_DATASET,
        }
    }

    pub fn view(self) -> ViewKind {
        match self {
            EntityKind::License => ViewKind::Vehicle,
            EntityKind::Badge | EntityKind::Name => ViewKind::Officer,
        }
    }

    pub fn meta(self) -> &'static PageMeta {
        match self {
            EntityKind::License => &LICENSE_META,
            EntityKind::Badge => &BADGE_META,
            EntityKind::Name => &NAME_META,
        }
    }
}

/// 單次請求的頁面資料；靜態說明複製而來，不會修改共享狀態
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageContext {
    #[serde(flatten)]
    pub meta: PageMeta,
    #[serde(rename = "entityHTML", skip_serializing_if = "Option::is_none")]
    pub entity_html: Option<String>,
}

impl PageContext {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            meta: *kind.meta(),
            entity_html: None,
        }
    }

    pub fn with_entity_html(mut self, html: String) -> Self {
        self.entity_html = Some(html);
        self
    }
}
