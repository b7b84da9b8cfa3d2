use crate::domain::model::{BadgeRecord, RawRecord};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// 多條件搜尋的比對方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// 任一條件相符即算符合
    #[default]
    Any,
    /// 所有條件都必須相符
    All,
}

/// 啟動時載入的警員徽章資料表，載入後唯讀
#[derive(Debug, Clone, Default)]
pub struct BadgeTable {
    records: Vec<BadgeRecord>,
}

impl BadgeTable {
    /// 從 CSV 檔案載入（第一列為表頭）
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv_reader(reader)
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        Self::from_csv_reader(csv::Reader::from_reader(rdr))
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut records = Vec::new();
        for row in reader.deserialize::<HashMap<String, String>>() {
            records.push(row?);
        }
        Ok(Self { records })
    }

    /// 檔案不存在或無法解析時記錄警告並回傳空表
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(table) => {
                tracing::info!(
                    "Loaded {} badge records from {}",
                    table.len(),
                    path.display()
                );
                table
            }
            Err(e) => {
                tracing::warn!(
                    "Could not load badge CSV {}: {}; continuing without badge data",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BadgeRecord] {
        &self.records
    }

    /// 線性掃描；每筆紀錄最多出現一次，順序與資料表相同
    ///
    /// `Any` 刻意去除重複：符合多個條件的紀錄只回傳一次，而非每個條件各回傳一次
    pub fn search<'a>(
        &'a self,
        criteria: &HashMap<String, String>,
        mode: MatchMode,
    ) -> Vec<&'a BadgeRecord> {
        if criteria.is_empty() {
            return Vec::new();
        }

        let field_matches =
            |record: &BadgeRecord, (key, value): (&String, &String)| record.get(key) == Some(value);

        self.records
            .iter()
            .filter(|record| match mode {
                MatchMode::Any => criteria.iter().any(|c| field_matches(*record, c)),
                MatchMode::All => criteria.iter().all(|c| field_matches(*record, c)),
            })
            .collect()
    }

    /// 依姓名找出對應的徽章紀錄
    pub fn find_officer(&self, first_name: &str, last_name: &str) -> Option<&BadgeRecord> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if last_name.is_empty() {
            return None;
        }

        self.records.iter().find(|record| {
            let surname = record.get("Surname").map(|s| s.trim()).unwrap_or("");
            let given = record.get("FirstName").map(|s| s.trim()).unwrap_or("");
            surname.eq_ignore_ascii_case(last_name) && given.eq_ignore_ascii_case(first_name)
        })
    }

    /// 把符合的徽章欄位併入上游資料列；沒有對應時原樣回傳
    pub fn join_officer(&self, mut row: RawRecord) -> RawRecord {
        let matched = self.find_officer(
            row.optional_str("first_name"),
            row.optional_str("last_name"),
        );

        if let Some(record) = matched {
            for (key, value) in record {
                row.data
                    .entry(key.clone())
                    .or_insert_with(|| serde_json::Value::String(value.clone()));
            }
        }
        row
    }
}
