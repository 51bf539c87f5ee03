//! Dashboard configuration, read from TOML with environment overrides.

use config::{Config as CConfig, Environment};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Cannot parse config: {0}")]
    Parsing(String),
    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Config {
    pub fn from_str(toml_str: &str) -> Result<Config, ConfigError> {
        let config = CConfig::builder()
            .add_source(config::File::from_str(toml_str, config::FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::Parsing(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigError::Parsing(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, letting `DASHBOARD_<SECTION>__<KEY>` variables
    /// override its values.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        Self::from_file_with_env(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("DASHBOARD")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn from_file_with_env(path: &Path, env: Environment) -> Result<Config, ConfigError> {
        let config = CConfig::builder()
            .add_source(config::File::from(path))
            .add_source(env)
            .build()
            .map_err(|e| ConfigError::Parsing(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigError::Parsing(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.dataset.separator_byte()?;
        if self.dashboard.top_n == 0 {
            return Err(ConfigError::Invalid {
                key: "dashboard.top_n",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
    #[serde(default = "ServerConfig::default_open_browser")]
    pub open_browser: bool,
}

impl ServerConfig {
    fn default_host() -> String {
        String::from("127.0.0.1")
    }

    fn default_port() -> u16 {
        8501
    }

    fn default_open_browser() -> bool {
        true
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            open_browser: Self::default_open_browser(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    #[serde(default = "DatasetConfig::default_paths")]
    pub paths: Vec<PathBuf>,
    #[serde(default = "DatasetConfig::default_separator")]
    pub separator: String,
    #[serde(default)]
    pub columns: ColumnNames,
}

impl DatasetConfig {
    fn default_paths() -> Vec<PathBuf> {
        vec![PathBuf::from("data/orders.csv")]
    }

    fn default_separator() -> String {
        String::from(",")
    }

    /// The separator as the single byte the CSV reader expects.
    pub fn separator_byte(&self) -> Result<u8, ConfigError> {
        match self.separator.as_bytes() {
            [b] => Ok(*b),
            _ => Err(ConfigError::Invalid {
                key: "dataset.separator",
                reason: format!("expected a single ASCII character, got {:?}", self.separator),
            }),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            paths: Self::default_paths(),
            separator: Self::default_separator(),
            columns: ColumnNames::default(),
        }
    }
}

/// Accepted header names for each logical column, tried in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ColumnNames {
    #[serde(default = "ColumnNames::default_order_id")]
    pub order_id: Vec<String>,
    #[serde(default = "ColumnNames::default_timestamp")]
    pub timestamp: Vec<String>,
    #[serde(default = "ColumnNames::default_category")]
    pub category: Vec<String>,
    #[serde(default = "ColumnNames::default_region")]
    pub region: Vec<String>,
    #[serde(default = "ColumnNames::default_amount")]
    pub amount: Vec<String>,
    #[serde(default = "ColumnNames::default_quantity")]
    pub quantity: Vec<String>,
    #[serde(default = "ColumnNames::default_customer_id")]
    pub customer_id: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl ColumnNames {
    fn default_order_id() -> Vec<String> {
        names(&["order_id"])
    }

    fn default_timestamp() -> Vec<String> {
        names(&["timestamp", "order_purchase_timestamp"])
    }

    fn default_category() -> Vec<String> {
        names(&[
            "category",
            "product_category_name_english",
            "product_category_name",
        ])
    }

    fn default_region() -> Vec<String> {
        names(&["region", "customer_city"])
    }

    fn default_amount() -> Vec<String> {
        names(&["amount", "price"])
    }

    fn default_quantity() -> Vec<String> {
        names(&["quantity"])
    }

    fn default_customer_id() -> Vec<String> {
        names(&["customer_id", "customer_unique_id"])
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            order_id: Self::default_order_id(),
            timestamp: Self::default_timestamp(),
            category: Self::default_category(),
            region: Self::default_region(),
            amount: Self::default_amount(),
            quantity: Self::default_quantity(),
            customer_id: Self::default_customer_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default = "DashboardConfig::default_title")]
    pub title: String,
    #[serde(default = "DashboardConfig::default_top_n")]
    pub top_n: usize,
    #[serde(default = "DashboardConfig::default_currency")]
    pub currency: String,
}

impl DashboardConfig {
    fn default_title() -> String {
        String::from("E-Commerce Dashboard")
    }

    fn default_top_n() -> usize {
        5
    }

    fn default_currency() -> String {
        String::from("AUD")
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            top_n: Self::default_top_n(),
            currency: Self::default_currency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_correct_toml() {
        let toml = r#"
        [server]
        host = "0.0.0.0"
        port = 3000
        open_browser = false

        [dataset]
        paths = ["a.csv", "b.csv"]
        separator = ";"

        [dashboard]
        top_n = 10
        "#;
        let conf = Config::from_str(toml).unwrap();
        assert_eq!(
            conf.server,
            ServerConfig {
                host: String::from("0.0.0.0"),
                port: 3000,
                open_browser: false,
            }
        );
        assert_eq!(
            conf.dataset.paths,
            vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]
        );
        assert_eq!(conf.dataset.separator_byte(), Ok(b';'));
        assert_eq!(conf.dashboard.top_n, 10);
        assert_eq!(conf.dashboard.currency, "AUD");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let conf = Config::from_str("").unwrap();
        assert_eq!(conf, Config::default());
        assert_eq!(conf.server.addr(), "127.0.0.1:8501");
        assert!(conf.dataset.columns.timestamp.contains(&"order_purchase_timestamp".to_string()));
    }

    #[test]
    fn test_column_override() {
        let toml = r#"
        [dataset.columns]
        amount = ["total"]
        "#;
        let conf = Config::from_str(toml).unwrap();
        assert_eq!(conf.dataset.columns.amount, vec!["total".to_string()]);
        assert_eq!(conf.dataset.columns.order_id, vec!["order_id".to_string()]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
        [server]
        hots = "typo"
        "#;
        assert!(matches!(Config::from_str(toml), Err(ConfigError::Parsing(_))));
    }

    #[test]
    fn test_bad_separator_rejected() {
        let toml = r#"
        [dataset]
        separator = ";;"
        "#;
        assert!(matches!(
            Config::from_str(toml),
            Err(ConfigError::Invalid { key: "dataset.separator", .. })
        ));
    }

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::environment().source(Some(vars))
    }

    #[test]
    fn test_from_file() {
        let file = write_toml("[server]\nport = 1111\n[dashboard]\ncurrency = \"BRL\"\n");

        let conf = Config::from_file_with_env(file.path(), env(&[])).unwrap();
        assert_eq!(conf.server.port, 1111);
        assert_eq!(conf.dashboard.currency, "BRL");
        assert_eq!(conf.dataset, DatasetConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml("[server]\nport = 1111\n");

        let conf = Config::from_file_with_env(
            file.path(),
            env(&[
                ("DASHBOARD_SERVER__PORT", "2222"),
                ("DASHBOARD_DASHBOARD__TITLE", "Olist Orders"),
            ]),
        )
        .unwrap();
        assert_eq!(conf.server.port, 2222);
        assert_eq!(conf.dashboard.title, "Olist Orders");
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let toml = r#"
        [dashboard]
        top_n = 0
        "#;
        assert!(matches!(
            Config::from_str(toml),
            Err(ConfigError::Invalid { key: "dashboard.top_n", .. })
        ));
    }
}
