pub mod toml_config;

use crate::core::soda::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::time::Duration;
use toml_config::{is_unresolved_placeholder, TomlConfig};

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_PUBLIC_DIR: &str = "./public";
pub const DEFAULT_BADGE_CSV: &str = "data/spd-badges.csv";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "hows-my-driving")]
#[command(about = "Seattle public vehicle and officer lookup service")]
pub struct CliConfig {
    #[arg(long, short, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Address to listen on, e.g. 0.0.0.0:5000")]
    pub bind: Option<String>,

    #[arg(long, help = "Directory served under /public")]
    pub public_dir: Option<String>,

    #[arg(long, help = "SODA API base URL")]
    pub upstream_url: Option<String>,

    #[arg(long, help = "Path to the officer badge CSV")]
    pub badge_csv: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

/// 合併檔案與命令列之後的最終設定
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind: String,
    pub public_dir: String,
    pub templates_dir: Option<String>,
    pub upstream_base_url: String,
    pub app_token: Option<String>,
    pub timeout_seconds: u64,
    pub badge_csv_path: Option<String>,
    pub join_officers: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            public_dir: DEFAULT_PUBLIC_DIR.to_string(),
            templates_dir: None,
            upstream_base_url: DEFAULT_BASE_URL.to_string(),
            app_token: None,
            timeout_seconds: DEFAULT_TIMEOUT.as_secs(),
            badge_csv_path: Some(DEFAULT_BADGE_CSV.to_string()),
            join_officers: true,
        }
    }
}

impl AppConfig {
    pub fn from_toml(file: TomlConfig) -> Self {
        let mut config = Self::default();

        if let Some(server) = file.server {
            if let Some(bind) = server.bind {
                config.bind = bind;
            }
            if let Some(public_dir) = server.public_dir {
                config.public_dir = public_dir;
            }
            config.templates_dir = server.templates_dir;
        }

        if let Some(upstream) = file.upstream {
            if let Some(base_url) = upstream.base_url {
                config.upstream_base_url = base_url;
            }
            config.app_token = upstream
                .app_token
                .filter(|t| !t.trim().is_empty() && !is_unresolved_placeholder(t));
            if let Some(timeout) = upstream.timeout_seconds {
                config.timeout_seconds = timeout;
            }
        }

        if let Some(badges) = file.badges {
            if badges.csv_path.is_some() {
                config.badge_csv_path = badges.csv_path;
            }
            if let Some(join) = badges.join_officers {
                config.join_officers = join;
            }
        }

        config
    }

    /// 命令列參數優先於檔案設定
    #[cfg(feature = "cli")]
    pub fn from_cli(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        let mut config = Self::from_toml(file);

        if let Some(bind) = &cli.bind {
            config.bind = bind.clone();
        }
        if let Some(public_dir) = &cli.public_dir {
            config.public_dir = public_dir.clone();
        }
        if let Some(url) = &cli.upstream_url {
            config.upstream_base_url = url.clone();
        }
        if let Some(csv) = &cli.badge_csv {
            config.badge_csv_path = Some(csv.clone());
        }

        Ok(config)
    }
}

impl ConfigProvider for AppConfig {
    fn bind_addr(&self) -> &str {
        &self.bind
    }

    fn upstream_base_url(&self) -> &str {
        &self.upstream_base_url
    }

    fn app_token(&self) -> Option<&str> {
        self.app_token.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn public_dir(&self) -> &str {
        &self.public_dir
    }

    fn templates_dir(&self) -> Option<&str> {
        self.templates_dir.as_deref()
    }

    fn badge_csv_path(&self) -> Option<&str> {
        self.badge_csv_path.as_deref()
    }

    fn join_officers(&self) -> bool {
        self.join_officers
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_socket_addr("server.bind", &self.bind)?;
        validation::validate_path("server.public_dir", &self.public_dir)?;
        if let Some(dir) = &self.templates_dir {
            validation::validate_path("server.templates_dir", dir)?;
        }
        validation::validate_url("upstream.base_url", &self.upstream_base_url)?;
        validation::validate_range("upstream.timeout_seconds", self.timeout_seconds, 1, 60)?;
        if let Some(path) = &self.badge_csv_path {
            validation::validate_file_extension("badges.csv_path", path, &["csv"])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.upstream_base_url(), "https://data.seattle.gov/resource");
        assert!(config.join_officers());
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let file = TomlConfig::from_toml_str(
            r#"
[server]
bind = "127.0.0.1:8080"

[upstream]
timeout_seconds = 5
app_token = "${HMD_UNSET_TOKEN_FOR_TEST}"

[badges]
join_officers = false
"#,
        )
        .unwrap();

        let config = AppConfig::from_toml(file);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.public_dir(), DEFAULT_PUBLIC_DIR);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.app_token(), None);
        assert!(!config.join_officers());
        assert_eq!(config.badge_csv_path(), Some(DEFAULT_BADGE_CSV));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.upstream_base_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.bind = "nowhere".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.badge_csv_path = Some("badges.xlsx".to_string());
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_overrides_file() {
        let cli = CliConfig::parse_from([
            "hows-my-driving",
            "--bind",
            "127.0.0.1:9999",
            "--upstream-url",
            "http://localhost:1234/resource",
        ]);

        let config = AppConfig::from_cli(&cli).unwrap();
        assert_eq!(config.bind, "127.0.0.1:9999");
        assert_eq!(config.upstream_base_url, "http://localhost:1234/resource");
        assert!(!cli.verbose);
    }
}
