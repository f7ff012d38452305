use elaborator::error::ElaborateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read or write a file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to deserialize input JSON: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Elaboration failed: {0}")]
    Elaborate(#[from] ElaborateError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Invalid partition operand: {0}")]
    InvalidOperand(String),
}
