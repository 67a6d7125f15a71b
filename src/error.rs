use thiserror::Error;

use crate::rules::registry::RegistryError;

pub type Result<T> = std::result::Result<T, RulesError>;

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Parse error ({language}): {message}")]
    Parse { language: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Selection error: {0}")]
    Selection(String),

    #[error("Conformance failed for {failed} example(s):\n{details}")]
    Conformance { failed: usize, details: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RulesError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
