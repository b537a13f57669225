use std::fmt;
use thiserror::Error;

/// Protocol-level error tag carried by every [`RestconfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorTag {
    InvalidValue,
    UnknownElement,
    DataMissing,
    DataExists,
    OperationNotSupported,
    OperationFailed,
    MalformedMessage,
    MissingAttribute,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::InvalidValue => "invalid-value",
            ErrorTag::UnknownElement => "unknown-element",
            ErrorTag::DataMissing => "data-missing",
            ErrorTag::DataExists => "data-exists",
            ErrorTag::OperationNotSupported => "operation-not-supported",
            ErrorTag::OperationFailed => "operation-failed",
            ErrorTag::MalformedMessage => "malformed-message",
            ErrorTag::MissingAttribute => "missing-attribute",
        }
    }

    /// HTTP status code conventionally paired with this tag.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorTag::InvalidValue | ErrorTag::MalformedMessage | ErrorTag::MissingAttribute => 400,
            ErrorTag::UnknownElement => 400,
            ErrorTag::DataMissing => 404,
            ErrorTag::DataExists => 409,
            ErrorTag::OperationNotSupported => 501,
            ErrorTag::OperationFailed => 500,
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layer an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Protocol,
    Application,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Protocol => "protocol",
            ErrorType::Application => "application",
        }
    }
}

/// Failure reported by a store or a remote device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {reason}")]
pub struct BackendError {
    pub operation: String,
    pub reason: String,
}

impl BackendError {
    pub fn new(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestconfError {
    #[error("invalid URI: {message}")]
    InvalidUri { message: String },

    #[error("unknown element: {message}")]
    UnknownElement { message: String },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("data missing: {message}")]
    DataMissing { message: String },

    #[error("data exists: {message}")]
    DataExists { message: String },

    #[error("operation not supported: {message}")]
    OperationNotSupported { message: String },

    #[error("malformed message: {message}")]
    MalformedMessage { message: String },

    #[error("missing attribute: {message}")]
    MissingAttribute { message: String },

    #[error("backend failure: {source}")]
    BackendFailure {
        #[from]
        source: BackendError,
    },
}

impl RestconfError {
    pub fn invalid_uri(message: impl Into<String>) -> Self {
        RestconfError::InvalidUri {
            message: message.into(),
        }
    }

    pub fn unknown_element(message: impl Into<String>) -> Self {
        RestconfError::UnknownElement {
            message: message.into(),
        }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        RestconfError::InvalidValue {
            message: message.into(),
        }
    }

    pub fn data_missing(message: impl Into<String>) -> Self {
        RestconfError::DataMissing {
            message: message.into(),
        }
    }

    pub fn data_exists(message: impl Into<String>) -> Self {
        RestconfError::DataExists {
            message: message.into(),
        }
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        RestconfError::OperationNotSupported {
            message: message.into(),
        }
    }

    pub fn backend(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        RestconfError::BackendFailure {
            source: BackendError::new(operation, reason),
        }
    }

    pub fn tag(&self) -> ErrorTag {
        match self {
            RestconfError::InvalidUri { .. } | RestconfError::InvalidValue { .. } => {
                ErrorTag::InvalidValue
            }
            RestconfError::UnknownElement { .. } => ErrorTag::UnknownElement,
            RestconfError::DataMissing { .. } => ErrorTag::DataMissing,
            RestconfError::DataExists { .. } => ErrorTag::DataExists,
            RestconfError::OperationNotSupported { .. } => ErrorTag::OperationNotSupported,
            RestconfError::MalformedMessage { .. } => ErrorTag::MalformedMessage,
            RestconfError::MissingAttribute { .. } => ErrorTag::MissingAttribute,
            RestconfError::BackendFailure { .. } => ErrorTag::OperationFailed,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            RestconfError::OperationNotSupported { .. }
            | RestconfError::MissingAttribute { .. }
            | RestconfError::BackendFailure { .. } => ErrorType::Application,
            _ => ErrorType::Protocol,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.tag().status_code()
    }

    /// Human-readable message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            RestconfError::InvalidUri { message }
            | RestconfError::UnknownElement { message }
            | RestconfError::InvalidValue { message }
            | RestconfError::DataMissing { message }
            | RestconfError::DataExists { message }
            | RestconfError::OperationNotSupported { message }
            | RestconfError::MalformedMessage { message }
            | RestconfError::MissingAttribute { message } => message.clone(),
            RestconfError::BackendFailure { source } => source.to_string(),
        }
    }

    /// Resolution-time errors are never retried by callers.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            RestconfError::InvalidUri { .. }
                | RestconfError::UnknownElement { .. }
                | RestconfError::InvalidValue { .. }
                | RestconfError::OperationNotSupported { .. }
        )
    }
}
