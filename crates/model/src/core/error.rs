use thiserror::Error;

/// Failures raised while casting or adding typed constants.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueError {
    #[error("value out of range for type {0}")]
    OutOfRange(String),

    #[error("invalid input syntax for type {type_name}: \"{input}\"")]
    InvalidInput { type_name: String, input: String },

    #[error("cannot cast type {from} to {to}")]
    CannotCast { from: String, to: String },

    #[error("operator does not exist: {left} + {right}")]
    NoOperator { left: String, right: String },

    #[error("numeric field overflow: precision {precision}, scale {scale}")]
    NumericFieldOverflow { precision: u32, scale: u32 },

    #[error("cannot convert {0} to {1}")]
    NotFinite(String, String),
}
