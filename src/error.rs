// Error types for the inventory core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Car not found: {0}")]
    NotFound(String),

    #[error("Error importing CSV at line {line}: {reason}")]
    Import { line: usize, reason: String },

    #[error("Persistent store unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl InventoryError {
    /// True for failures of the backing store rather than of the request itself
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            InventoryError::PersistenceUnavailable(_) | InventoryError::Database(_) | InventoryError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
