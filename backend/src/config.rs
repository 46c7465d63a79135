use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::net::SocketAddr;

use crate::domain::PaymentConsistency;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Directory uploaded bank files are written to
    #[serde(default = "default_bank_files_dir")]
    pub bank_files_dir: String,

    /// Maximum request body size in MB
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// How installment payments are applied: `atomic` or `legacy`
    #[serde(default)]
    pub payment_consistency: PaymentConsistency,

    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Origin allowed by CORS
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            database_url: default_database_url(),
            bank_files_dir: default_bank_files_dir(),
            max_upload_mb: default_max_upload_mb(),
            payment_consistency: PaymentConsistency::default(),
            log_level: default_log_level(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, an optional `loan-servicing.*` file and
    /// `LOAN_SERVICING__*` environment variables, later sources winning
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env file is normal outside development
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("loan-servicing").required(false))
            .add_source(config::Environment::with_prefix("LOAN_SERVICING").separator("__"));

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get max request body size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "sqlite:loans.db".to_string()
}

fn default_bank_files_dir() -> String {
    "public/bankfiles".to_string()
}

fn default_max_upload_mb() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_origin() -> String {
    "http://localhost:8080".to_string()
}
