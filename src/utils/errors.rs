use thiserror::Error;

use crate::backends::RawKind;
use crate::models::{ClientType, MediaType};

/// Failure turning one raw backend item into a media payload.
///
/// These are per-item errors: batch callers log them and move on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The raw item lacks a field needed to identify it
    #[error("{client_type} {raw_kind} is missing required field `{field}`")]
    MissingField {
        client_type: ClientType,
        raw_kind: RawKind,
        field: &'static str,
    },

    /// A converter was handed a raw shape it does not read
    #[error("expected {expected} raw item, got {actual}")]
    UnexpectedRawKind { expected: RawKind, actual: RawKind },

    /// The raw item describes a different kind of media than requested
    #[error("raw item {item_id} is a {actual:?}, cannot convert to {target}")]
    TypeMismatch {
        item_id: String,
        target: MediaType,
        actual: String,
    },

    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("no converter registered for {client_type} {raw_kind} -> {target}")]
    NoConverter {
        client_type: ClientType,
        raw_kind: RawKind,
        target: MediaType,
    },
}

impl ConversionError {
    pub fn missing(client_type: ClientType, raw_kind: RawKind, field: &'static str) -> Self {
        ConversionError::MissingField {
            client_type,
            raw_kind,
            field,
        }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConversionError::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

/// Failure reported by a backend client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The backend cannot perform this operation at all
    #[error("{client_type} does not support {feature}")]
    FeatureNotSupported {
        client_type: ClientType,
        feature: &'static str,
    },

    /// Connection or protocol failure. Carries what was being attempted.
    #[error("transport error while {context}: {message}")]
    Transport { context: String, message: String },

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl BackendError {
    pub fn not_supported(client_type: ClientType, feature: &'static str) -> Self {
        BackendError::FeatureNotSupported { client_type, feature }
    }

    pub fn transport(context: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Transport {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Whether the error makes continuing a batch enumeration meaningless
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, BackendError::Transport { .. })
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, BackendError::FeatureNotSupported { .. })
    }
}

/// Violation of a list's position or count invariants.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    #[error("item at index {index} claims position {position}")]
    PositionMismatch { index: usize, position: usize },

    #[error("item count {count} does not match {len} stored items")]
    CountMismatch { count: usize, len: usize },

    #[error("index {index} is out of range for a list of {len} items")]
    OutOfRange { index: usize, len: usize },
}
