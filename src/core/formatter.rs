use crate::core::templates::TemplateSet;
use crate::domain::model::{
    DisplayRecord, FieldError, OfficerView, RawRecord, VehicleView, ViewKind,
};

/// 結果片段之間的分隔
pub const FRAGMENT_SEPARATOR: &str = "\n<br/>\n";

/// 時薪換算年薪的固定工時
pub const ANNUAL_HOURS: f64 = 2000.0;

pub fn project(kind: ViewKind, row: &RawRecord) -> Result<DisplayRecord, FieldError> {
    match kind {
        ViewKind::Vehicle => project_vehicle(row).map(DisplayRecord::Vehicle),
        ViewKind::Officer => project_officer(row).map(DisplayRecord::Officer),
    }
}

pub fn project_vehicle(row: &RawRecord) -> Result<VehicleView, FieldError> {
    Ok(VehicleView {
        license: row.required_str("license")?.to_string(),
        make: row.required_str("make")?.to_string(),
        model: row.required_str("model")?.to_string(),
        department: row.required_str("dept")?.to_string(),
        description: row.required_str("descrip")?.to_string(),
        equipment_type: row.required_str("equipment_type")?.to_string(),
    })
}

pub fn project_officer(row: &RawRecord) -> Result<OfficerView, FieldError> {
    let first_name = row.required_str("first_name")?;
    let last_name = row.required_str("last_name")?;
    let job_title = row.required_str("job_title")?;

    // 有併入徽章資料時使用 CSV 的全名
    let name = if row.optional_str("Surname").is_empty() {
        join_name_parts(&[first_name, last_name])
    } else {
        join_name_parts(&[
            row.optional_str("FirstName"),
            row.optional_str("MiddleInitMostly"),
            row.optional_str("Surname"),
        ])
    };

    let hourly_rate = row.lenient_f64("hourly_rate");

    Ok(OfficerView {
        badge: row.optional_str("Serial").to_string(),
        name,
        rank: row.optional_str("RankRole").to_string(),
        unit: row.optional_str("UnitDesc").to_string(),
        job_title: job_title.to_string(),
        hourly_rate: format_money(hourly_rate),
        projected_salary: format_money(projected_salary(hourly_rate)),
    })
}

pub fn projected_salary(hourly_rate: f64) -> f64 {
    hourly_rate * ANNUAL_HOURS
}

fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}

fn join_name_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 把上游資料列轉成 HTML 片段
pub struct ResultFormatter<'a> {
    templates: &'a TemplateSet,
}

impl<'a> ResultFormatter<'a> {
    pub fn new(templates: &'a TemplateSet) -> Self {
        Self { templates }
    }

    /// 欄位不符或範本失敗的資料列會被略過，不影響其他列
    pub fn format_entities(&self, kind: ViewKind, rows: &[RawRecord]) -> String {
        let mut fragments = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let record = match project(kind, row) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(row = index, ?kind, "Skipping result row: {}", e);
                    continue;
                }
            };

            match self.templates.render_row(&record) {
                Ok(fragment) => fragments.push(fragment),
                Err(e) => {
                    tracing::error!(row = index, ?kind, "Error processing template: {}", e);
                }
            }
        }

        fragments.join(FRAGMENT_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vehicle_row(license: &str) -> RawRecord {
        RawRecord::from_pairs([
            ("license", json!(license)),
            ("make", json!("Honda")),
            ("model", json!("Civic")),
            ("dept", json!("SPD")),
            ("descrip", json!("Sedan")),
            ("equipment_type", json!("Vehicle")),
        ])
    }

    fn officer_row(rate: serde_json::Value) -> RawRecord {
        RawRecord::from_pairs([
            ("first_name", json!("Jane")),
            ("last_name", json!("Smith")),
            ("job_title", json!("Police Officer")),
            ("hourly_rate", rate),
        ])
    }

    fn officer(rate: serde_json::Value) -> OfficerView {
        project_officer(&officer_row(rate)).unwrap()
    }

    #[test]
    fn test_single_vehicle_contains_all_values_without_separator() {
        let templates = TemplateSet::embedded().unwrap();
        let formatter = ResultFormatter::new(&templates);

        let html = formatter.format_entities(ViewKind::Vehicle, &[vehicle_row("ABC123")]);

        for value in ["ABC123", "Honda", "Civic", "SPD", "Sedan", "Vehicle"] {
            assert!(html.contains(value), "missing {} in {}", value, html);
        }
        assert!(!html.contains("<br/>"));
    }

    #[test]
    fn test_fragments_joined_in_input_order() {
        let templates = TemplateSet::embedded().unwrap();
        let formatter = ResultFormatter::new(&templates);

        let html = formatter.format_entities(
            ViewKind::Vehicle,
            &[vehicle_row("FIRST1"), vehicle_row("SECOND2")],
        );

        assert_eq!(html.matches(FRAGMENT_SEPARATOR).count(), 1);
        assert!(!html.starts_with(FRAGMENT_SEPARATOR));
        assert!(!html.ends_with(FRAGMENT_SEPARATOR));
        assert!(html.find("FIRST1").unwrap() < html.find("SECOND2").unwrap());
    }

    #[test]
    fn test_empty_rows_give_empty_fragment() {
        let templates = TemplateSet::embedded().unwrap();
        let formatter = ResultFormatter::new(&templates);

        assert_eq!(formatter.format_entities(ViewKind::Vehicle, &[]), "");
        assert_eq!(formatter.format_entities(ViewKind::Officer, &[]), "");
    }

    #[test]
    fn test_row_missing_field_is_skipped_and_later_rows_render() {
        let templates = TemplateSet::embedded().unwrap();
        let formatter = ResultFormatter::new(&templates);

        let mut broken = vehicle_row("BROKEN1");
        broken.data.remove("make");
        let mut mistyped = vehicle_row("BROKEN2");
        mistyped.data.insert("model".to_string(), json!(2004));

        let html = formatter.format_entities(
            ViewKind::Vehicle,
            &[broken, mistyped, vehicle_row("GOOD1")],
        );

        assert!(!html.contains("BROKEN1"));
        assert!(!html.contains("BROKEN2"));
        assert!(html.contains("GOOD1"));
        assert!(!html.contains("<br/>"));
    }

    #[test]
    fn test_template_error_omits_only_that_row() {
        let dir = tempfile::TempDir::new().unwrap();
        // 有徽章的列會引用不存在的 partial 而渲染失敗
        std::fs::write(
            dir.path().join("officer.html"),
            "{{#if badge}}{{> missing_partial}}{{/if}}<p>{{name}}</p>",
        )
        .unwrap();
        let templates = TemplateSet::from_dir(dir.path()).unwrap();
        let formatter = ResultFormatter::new(&templates);

        let mut badged = officer_row(json!("30"));
        badged.data.insert("Serial".to_string(), json!("1234"));
        badged.data.insert("FirstName".to_string(), json!("Broken"));
        badged.data.insert("Surname".to_string(), json!("Row"));

        let html = formatter.format_entities(
            ViewKind::Officer,
            &[badged.clone(), officer_row(json!("30")), badged],
        );

        assert_eq!(html, "<p>Jane Smith</p>");

        // 車輛範本不受影響
        let html = formatter.format_entities(ViewKind::Vehicle, &[vehicle_row("GOOD1")]);
        assert!(html.contains("GOOD1"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let templates = TemplateSet::embedded().unwrap();
        let formatter = ResultFormatter::new(&templates);
        let rows = vec![vehicle_row("AAA111"), vehicle_row("BBB222")];

        let first = formatter.format_entities(ViewKind::Vehicle, &rows);
        let second = formatter.format_entities(ViewKind::Vehicle, &rows);
        assert_eq!(first, second);
    }

    #[test]
    fn test_projected_salary() {
        assert_eq!(projected_salary(0.0), 0.0);
        assert_eq!(projected_salary(50.0), 100_000.0);

        let view = officer(json!("45.50"));
        assert_eq!(view.hourly_rate, "45.50");
        assert_eq!(view.projected_salary, "91000.00");

        let view = officer(json!(40));
        assert_eq!(view.projected_salary, "80000.00");
    }

    #[test]
    fn test_non_numeric_rate_falls_back_to_zero() {
        let view = officer(json!("not a number"));
        assert_eq!(view.hourly_rate, "0.00");
        assert_eq!(view.projected_salary, "0.00");

        let mut row = officer_row(json!(null));
        row.data.remove("hourly_rate");
        let view = project_officer(&row).unwrap();
        assert_eq!(view.projected_salary, "0.00");
    }

    #[test]
    fn test_officer_name_prefers_joined_badge_fields() {
        let view = officer(json!("30"));
        assert_eq!(view.name, "Jane Smith");
        assert_eq!(view.badge, "");

        let mut row = officer_row(json!("30"));
        row.data.insert("FirstName".to_string(), json!("Jane"));
        row.data.insert("MiddleInitMostly".to_string(), json!("Q"));
        row.data.insert("Surname".to_string(), json!("Smith"));
        row.data.insert("Serial".to_string(), json!("1234"));
        row.data.insert("RankRole".to_string(), json!("Officer"));
        row.data.insert("UnitDesc".to_string(), json!("West Precinct"));

        let view = project_officer(&row).unwrap();
        assert_eq!(view.name, "Jane Q Smith");
        assert_eq!(view.badge, "1234");
        assert_eq!(view.rank, "Officer");
        assert_eq!(view.unit, "West Precinct");
    }

    #[test]
    fn test_officer_missing_job_title_is_field_error() {
        let mut row = officer_row(json!("30"));
        row.data.remove("job_title");

        assert_eq!(
            project(ViewKind::Officer, &row),
            Err(FieldError::Missing("job_title".to_string()))
        );
    }
}
