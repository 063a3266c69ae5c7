use serde::Deserialize;
use std::path::PathBuf;

use crate::classifier::DEFAULT_MODEL_PATH;
use crate::history::DEFAULT_LOG_PATH;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Location of the classifier artifact.
    pub model_path: PathBuf,
    /// Location of the prediction history CSV.
    pub log_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8501,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

/// Reads an optional path variable, rejecting blank values.
fn path_var(name: &str, default: &str) -> anyhow::Result<PathBuf> {
    match std::env::var(name) {
        Ok(value) => {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
            Ok(PathBuf::from(value))
        }
        Err(_) => Ok(PathBuf::from(default)),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8501".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            model_path: path_var("MODEL_PATH", DEFAULT_MODEL_PATH)?,
            log_path: path_var("LOG_PATH", DEFAULT_LOG_PATH)?,
        };

        tracing::debug!("Model path: {}", config.model_path.display());
        tracing::debug!("History path: {}", config.log_path.display());
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8501);
        assert_eq!(config.log_path, PathBuf::from("logs_previsoes.csv"));
        assert!(config.model_path.ends_with("modelo_tuned_lightgbm_kfold.json"));
    }

    #[test]
    fn test_blank_path_rejected() {
        std::env::set_var("CREDIT_RISK_TEST_BLANK_PATH", "  ");
        assert!(path_var("CREDIT_RISK_TEST_BLANK_PATH", "x").is_err());
        std::env::remove_var("CREDIT_RISK_TEST_BLANK_PATH");
    }

    #[test]
    fn test_unset_path_uses_default() {
        let path = path_var("CREDIT_RISK_TEST_UNSET_PATH", "fallback.csv").unwrap();
        assert_eq!(path, PathBuf::from("fallback.csv"));
    }
}
