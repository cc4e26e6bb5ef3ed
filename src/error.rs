use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersisqlError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Statement could not be prepared: {message} (sql: {sql})")]
    Prepare { sql: String, message: String },
    #[error("Execution error: {0}")]
    Execution(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Transaction error: {0}")]
    Transaction(String),
    #[error("Decode error: {0}")]
    Decode(String),
}

impl PersisqlError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, PersisqlError>;

// Helper conversions
impl From<rusqlite::Error> for PersisqlError {
    fn from(e: rusqlite::Error) -> Self { Self::Execution(e.to_string()) }
}
impl From<config::ConfigError> for PersisqlError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for PersisqlError {
    fn from(e: serde_json::Error) -> Self { Self::Decode(e.to_string()) }
}
