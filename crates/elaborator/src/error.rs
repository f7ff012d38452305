use model::core::error::ValueError;
use std::fmt;
use thiserror::Error;

/// The user-facing detail of a rejected definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostic {
    pub message: String,
    pub identifier: Option<String>,
    /// Byte offset into the query text.
    pub location: Option<usize>,
    pub detail: Option<String>,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn location(mut self, location: Option<usize>) -> Self {
        self.location = location;
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " HINT: {hint}")?;
        }
        Ok(())
    }
}

/// Coarse category of an [`ElaborateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidDefinition,
    Unsupported,
    Undefined,
    Internal,
    Value,
    Codec,
}

#[derive(Debug, Error)]
pub enum ElaborateError {
    /// The definition is malformed and can be corrected by the user.
    #[error("{0}")]
    InvalidDefinition(Diagnostic),

    /// The definition asks for something that is never supported.
    #[error("{0}")]
    Unsupported(Diagnostic),

    /// A referenced column, relation, index or type does not exist.
    #[error("{0}")]
    Undefined(Diagnostic),

    /// Catalog state contradicts itself.
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("failed to encode table metadata: {0}")]
    Codec(#[from] bincode::Error),
}

impl ElaborateError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ElaborateError::InvalidDefinition(Diagnostic::new(message))
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        ElaborateError::Unsupported(Diagnostic::new(message))
    }

    pub fn undefined(message: impl Into<String>) -> Self {
        ElaborateError::Undefined(Diagnostic::new(message))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ElaborateError::InvalidDefinition(_) => ErrorKind::InvalidDefinition,
            ElaborateError::Unsupported(_) => ErrorKind::Unsupported,
            ElaborateError::Undefined(_) => ErrorKind::Undefined,
            ElaborateError::Internal(_) => ErrorKind::Internal,
            ElaborateError::Value(_) => ErrorKind::Value,
            ElaborateError::Codec(_) => ErrorKind::Codec,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ElaborateError::InvalidDefinition(d)
            | ElaborateError::Unsupported(d)
            | ElaborateError::Undefined(d) => Some(d),
            _ => None,
        }
    }

    /// Main message without detail or hint.
    pub fn message(&self) -> String {
        match self.diagnostic() {
            Some(d) => d.message.clone(),
            None => self.to_string(),
        }
    }

    pub fn hint(&self) -> Option<&str> {
        self.diagnostic().and_then(|d| d.hint.as_deref())
    }

    pub fn detail(&self) -> Option<&str> {
        self.diagnostic().and_then(|d| d.detail.as_deref())
    }
}

/// Builds an `InvalidDefinition` with optional `identifier`/`location`/`hint`/`detail` parts.
#[macro_export]
macro_rules! invalid {
    ($($arg:tt)*) => {
        $crate::error::ElaborateError::InvalidDefinition($crate::error::Diagnostic::new(format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! unsupported {
    ($($arg:tt)*) => {
        $crate::error::ElaborateError::Unsupported($crate::error::Diagnostic::new(format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! undefined {
    ($($arg:tt)*) => {
        $crate::error::ElaborateError::Undefined($crate::error::Diagnostic::new(format!($($arg)*)))
    };
}

/// Attaches extra context to an error carrying a [`Diagnostic`].
pub trait DiagnosticExt {
    fn with_hint(self, hint: impl Into<String>) -> Self;
    fn with_detail(self, detail: impl Into<String>) -> Self;
    fn at(self, location: Option<usize>) -> Self;
    fn on(self, identifier: impl Into<String>) -> Self;
}

impl DiagnosticExt for ElaborateError {
    fn with_hint(self, hint: impl Into<String>) -> Self {
        self.map_diagnostic(|d| d.hint(hint))
    }

    fn with_detail(self, detail: impl Into<String>) -> Self {
        self.map_diagnostic(|d| d.detail(detail))
    }

    fn at(self, location: Option<usize>) -> Self {
        self.map_diagnostic(|d| d.location(location))
    }

    fn on(self, identifier: impl Into<String>) -> Self {
        self.map_diagnostic(|d| d.identifier(identifier))
    }
}

impl ElaborateError {
    fn map_diagnostic(self, f: impl FnOnce(Diagnostic) -> Diagnostic) -> Self {
        match self {
            ElaborateError::InvalidDefinition(d) => ElaborateError::InvalidDefinition(f(d)),
            ElaborateError::Unsupported(d) => ElaborateError::Unsupported(f(d)),
            ElaborateError::Undefined(d) => ElaborateError::Undefined(f(d)),
            other => other,
        }
    }
}
