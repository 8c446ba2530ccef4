// Gastos Bot - Configuration
// Environment-driven settings, resolved once at startup and injected

use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::DEFAULT_FRESHNESS;
use crate::sheets::SheetLedger;
use crate::store::{CsvLedger, LedgerStore};

/// Which backing store holds the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerBackend {
    /// Local CSV file
    Csv { path: String },
    /// Remote sheet service (row-append API)
    Sheet {
        base_url: String,
        token: Option<String>,
    },
}

/// Where acknowledgement reactions go (optional)
#[derive(Debug, Clone, PartialEq)]
pub struct AckConfig {
    pub endpoint: String,
    pub token: Option<String>,
}

/// AppConfig - everything the binaries need, in one injected handle
///
/// There is no ambient client state: the config is read once in main and
/// passed down, and the store handle it opens is shared explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: LedgerBackend,
    /// Events from any other group are ignored; None disables the filter
    pub target_group: Option<String>,
    pub bind_addr: String,
    pub cache_window: Duration,
    pub ack: Option<AckConfig>,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// GASTOS_SHEET_URL selects the remote backend; otherwise the ledger is
    /// the CSV file at GASTOS_LEDGER_FILE (default data/gastos.csv).
    pub fn from_env() -> Result<Self> {
        let backend = match env_opt("GASTOS_SHEET_URL") {
            Some(base_url) => LedgerBackend::Sheet {
                base_url,
                token: env_opt("GASTOS_SHEET_TOKEN"),
            },
            None => LedgerBackend::Csv {
                path: env_opt("GASTOS_LEDGER_FILE")
                    .unwrap_or_else(|| "data/gastos.csv".to_string()),
            },
        };

        let cache_window = match env_opt("GASTOS_CACHE_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("Invalid GASTOS_CACHE_SECS: {}", raw))?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_FRESHNESS,
        };

        let ack = env_opt("GASTOS_ACK_URL").map(|endpoint| AckConfig {
            endpoint,
            token: env_opt("GASTOS_ACK_TOKEN"),
        });

        Ok(AppConfig {
            backend,
            target_group: env_opt("GASTOS_TARGET_GROUP"),
            bind_addr: env_opt("GASTOS_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            cache_window,
            ack,
        })
    }

    /// Open the configured ledger store
    pub fn open_store(&self) -> Result<Arc<dyn LedgerStore>> {
        match &self.backend {
            LedgerBackend::Csv { path } => Ok(Arc::new(CsvLedger::new(path))),
            LedgerBackend::Sheet { base_url, token } => Ok(Arc::new(SheetLedger::new(
                base_url.clone(),
                token.clone(),
            )?)),
        }
    }
}

/// A set-but-empty variable counts as unset
fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment is process-global, so everything lives in one test
    #[test]
    fn test_from_env_defaults_and_overrides() {
        for key in [
            "GASTOS_SHEET_URL",
            "GASTOS_SHEET_TOKEN",
            "GASTOS_LEDGER_FILE",
            "GASTOS_CACHE_SECS",
            "GASTOS_ACK_URL",
            "GASTOS_ACK_TOKEN",
            "GASTOS_TARGET_GROUP",
            "GASTOS_BIND_ADDR",
        ] {
            env::remove_var(key);
        }

        // Defaults: CSV backend, no filter, no acks
        let config = AppConfig::from_env().unwrap();
        assert_eq!(
            config.backend,
            LedgerBackend::Csv {
                path: "data/gastos.csv".to_string()
            }
        );
        assert_eq!(config.target_group, None);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.cache_window, DEFAULT_FRESHNESS);
        assert_eq!(config.ack, None);

        // Overrides
        env::set_var("GASTOS_SHEET_URL", "https://sheets.example/v1/abc");
        env::set_var("GASTOS_SHEET_TOKEN", "secret");
        env::set_var("GASTOS_TARGET_GROUP", "1203630@g.us");
        env::set_var("GASTOS_CACHE_SECS", "15");
        env::set_var("GASTOS_ACK_URL", "https://gateway.example/react");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(
            config.backend,
            LedgerBackend::Sheet {
                base_url: "https://sheets.example/v1/abc".to_string(),
                token: Some("secret".to_string()),
            }
        );
        assert_eq!(config.target_group, Some("1203630@g.us".to_string()));
        assert_eq!(config.cache_window, Duration::from_secs(15));
        assert_eq!(
            config.ack,
            Some(AckConfig {
                endpoint: "https://gateway.example/react".to_string(),
                token: None,
            })
        );

        // Bad cache window is a configuration error
        env::set_var("GASTOS_CACHE_SECS", "soon");
        assert!(AppConfig::from_env().is_err());

        // Empty counts as unset
        env::set_var("GASTOS_SHEET_URL", "");
        env::remove_var("GASTOS_CACHE_SECS");
        let config = AppConfig::from_env().unwrap();
        assert!(matches!(config.backend, LedgerBackend::Csv { .. }));

        for key in [
            "GASTOS_SHEET_URL",
            "GASTOS_SHEET_TOKEN",
            "GASTOS_TARGET_GROUP",
            "GASTOS_ACK_URL",
        ] {
            env::remove_var(key);
        }
    }
}
