//! Configuration for the worker

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory holding the ledger and transaction-log files
    pub data_dir: PathBuf,

    /// Ledger filename inside `data_dir`
    pub ledger_filename: String,

    /// Transaction-log filename inside `data_dir`
    pub txlog_filename: String,

    /// HTTP listen port
    pub port: u16,

    /// Seed the classic development accounts when the ledger file is absent
    pub seed_dev_accounts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/worker"),
            ledger_filename: "cuenta_p_r.txt".to_string(),
            txlog_filename: "transacciones_p_r.txt".to_string(),
            port: 8082,
            seed_dev_accounts: false,
        }
    }
}

impl Config {
    /// Full path of the ledger file
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_filename)
    }

    /// Full path of the transaction-log file
    pub fn txlog_path(&self) -> PathBuf {
        self.data_dir.join(&self.txlog_filename)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load defaults with environment overrides
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Config::default();

        if let Ok(dir) = std::env::var("WORKER_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(name) = std::env::var("WORKER_LEDGER_FILE") {
            config.ledger_filename = name;
        }

        if let Ok(name) = std::env::var("WORKER_TXLOG_FILE") {
            config.txlog_filename = name;
        }

        if let Ok(port) = std::env::var("WORKER_PORT") {
            config.port = port.parse().map_err(|_| {
                crate::Error::Config(format!(
                    "WORKER_PORT must be a valid port number, got {:?}",
                    port
                ))
            })?;
        }

        if let Ok(seed) = std::env::var("WORKER_SEED_DEV_ACCOUNTS") {
            config.seed_dev_accounts = matches!(seed.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}
