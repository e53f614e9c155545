//! Application configuration management.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Plan storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Defaults applied to omitted plan fields on creation.
    #[serde(default)]
    pub defaults: PlanDefaultsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Storage configuration for the plan snapshot file.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the snapshot file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Snapshot file name inside `data_dir`.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl StorageConfig {
    /// Full path of the snapshot file.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: default_file_name(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_file_name() -> String {
    "plans.json".to_string()
}

/// Default loan terms for fields a caller leaves out.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanDefaultsConfig {
    /// Monthly interest rate as a fraction (0.08 = 8%).
    #[serde(default = "default_tasa_mensual")]
    pub tasa_mensual: Decimal,
    /// Administrative fee rate as a fraction.
    #[serde(default = "default_gasto_admin")]
    pub gasto_admin: Decimal,
    /// Number of monthly installments.
    #[serde(default = "default_cuotas")]
    pub cuotas: u32,
    /// Payment method label.
    #[serde(default = "default_forma_pago")]
    pub forma_pago: String,
}

impl Default for PlanDefaultsConfig {
    fn default() -> Self {
        Self {
            tasa_mensual: default_tasa_mensual(),
            gasto_admin: default_gasto_admin(),
            cuotas: default_cuotas(),
            forma_pago: default_forma_pago(),
        }
    }
}

fn default_tasa_mensual() -> Decimal {
    Decimal::new(8, 2)
}

fn default_gasto_admin() -> Decimal {
    Decimal::new(5, 3)
}

fn default_cuotas() -> u32 {
    24
}

fn default_forma_pago() -> String {
    "Efectivo".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PLANPAGO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
