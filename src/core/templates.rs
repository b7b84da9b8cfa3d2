use crate::domain::model::{DisplayRecord, PageContext};
use crate::utils::error::{LookupError, Result};
use handlebars::Handlebars;
use std::path::Path;

pub const PAGE_TEMPLATE: &str = "index";
pub const LICENSE_TEMPLATE: &str = "license";
pub const OFFICER_TEMPLATE: &str = "officer";

const EMBEDDED: [(&str, &str); 3] = [
    (PAGE_TEMPLATE, include_str!("../../templates/index.html")),
    (LICENSE_TEMPLATE, include_str!("../../templates/license.html")),
    (OFFICER_TEMPLATE, include_str!("../../templates/officer.html")),
];

/// 頁面外框與兩種結果列的 Handlebars 範本
pub struct TemplateSet {
    handlebars: Handlebars<'static>,
}

impl TemplateSet {
    /// 使用編譯時內嵌的範本
    pub fn embedded() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        for (name, source) in EMBEDDED {
            handlebars
                .register_template_string(name, source)
                .map_err(LookupError::template)?;
        }
        Ok(Self { handlebars })
    }

    /// 以目錄中的 `<name>.html` 覆蓋內嵌範本，缺少的檔案沿用內嵌版本
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut set = Self::embedded()?;

        for (name, _) in EMBEDDED {
            let path = dir.join(format!("{}.html", name));
            if path.is_file() {
                tracing::debug!("Loading template {} from {}", name, path.display());
                set.handlebars
                    .register_template_file(name, &path)
                    .map_err(LookupError::template)?;
            }
        }
        Ok(set)
    }

    pub fn render_row(&self, record: &DisplayRecord) -> Result<String> {
        let name = match record {
            DisplayRecord::Vehicle(_) => LICENSE_TEMPLATE,
            DisplayRecord::Officer(_) => OFFICER_TEMPLATE,
        };
        self.handlebars
            .render(name, record)
            .map_err(LookupError::template)
    }

    pub fn render_page(&self, context: &PageContext) -> Result<String> {
        self.handlebars
            .render(PAGE_TEMPLATE, context)
            .map_err(LookupError::template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EntityKind, VehicleView};
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_page_without_results_has_no_results_section() {
        let templates = TemplateSet::embedded().unwrap();
        let html = templates
            .render_page(&PageContext::new(EntityKind::Badge))
            .unwrap();

        assert!(html.contains("Seattle Officer Badge Lookup"));
        assert!(html.contains(r#"action="/badge""#));
        assert!(html.contains(r#"name="serial""#));
        assert!(!html.contains("class=\"results\""));
    }

    #[test]
    fn test_page_inserts_fragment_unescaped() {
        let templates = TemplateSet::embedded().unwrap();
        let context =
            PageContext::new(EntityKind::License).with_entity_html("<p>row</p>".to_string());
        let html = templates.render_page(&context).unwrap();

        assert!(html.contains("<p>row</p>"));
    }

    #[test]
    fn test_row_values_are_html_escaped() {
        let templates = TemplateSet::embedded().unwrap();
        let record = DisplayRecord::Vehicle(VehicleView {
            license: "<script>".to_string(),
            make: "Ford".to_string(),
            model: "Explorer".to_string(),
            department: "SPD".to_string(),
            description: "SUV".to_string(),
            equipment_type: "Vehicle".to_string(),
        });

        let html = templates.render_row(&record).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_from_dir_overrides_only_present_files() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join("license.html")).unwrap();
        file.write_all(b"<b>{{license}}</b>").unwrap();

        let templates = TemplateSet::from_dir(dir.path()).unwrap();
        let record = DisplayRecord::Vehicle(VehicleView {
            license: "XYZ".to_string(),
            make: String::new(),
            model: String::new(),
            department: String::new(),
            description: String::new(),
            equipment_type: String::new(),
        });

        assert_eq!(templates.render_row(&record).unwrap(), "<b>XYZ</b>");
        // index.html 不在目錄中，沿用內嵌版本
        assert!(templates
            .render_page(&PageContext::new(EntityKind::Name))
            .unwrap()
            .contains("Seattle Officer Name Lookup"));
    }
}
