// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the seqlite workspace.
//!
//! [`DatabaseError`] is the only error shape that crosses a public dispatch
//! entry point. [`EngineError`] is what a [`BatchEngine`](crate::BatchEngine)
//! reports; the dispatcher folds it into a `DatabaseError` of kind
//! [`ErrorKind::EngineFailure`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Stable classification of a [`DatabaseError`].
///
/// The string form (`connection-not-open`, `engine-failure`, ...) is part of
/// the public contract and does not change between releases.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The named connection is absent or already closed.
    ConnectionNotOpen,
    /// The engine rejected or failed to run the operation.
    EngineFailure,
    /// A command or parameter had a malformed shape.
    InvalidArgument,
    /// Anything that could not be classified.
    Unknown,
}

impl ErrorKind {
    /// Returns the stable code for this kind.
    pub fn code(self) -> &'static str {
        self.into()
    }
}

/// The structured error returned by every public dispatch entry point.
///
/// Constructed once at the failure boundary and never re-wrapped.
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct DatabaseError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DatabaseError {
    /// Creates an error without an underlying cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error that keeps the original failure as its source.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn connection_not_open(name: &str) -> Self {
        Self::new(
            ErrorKind::ConnectionNotOpen,
            format!("database `{name}` is not open"),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The original failure, if one was kept.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }
}

/// Failure reported by a [`BatchEngine`](crate::BatchEngine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    /// Engine-specific result code, when the engine exposes one.
    pub code: Option<i32>,
    /// Message as reported by the engine.
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn error_kind_codes_are_kebab_case() {
        assert_eq!(ErrorKind::ConnectionNotOpen.code(), "connection-not-open");
        assert_eq!(ErrorKind::EngineFailure.code(), "engine-failure");
        assert_eq!(ErrorKind::InvalidArgument.code(), "invalid-argument");
        assert_eq!(ErrorKind::Unknown.code(), "unknown");
        assert_eq!(
            ErrorKind::from_str("engine-failure").unwrap(),
            ErrorKind::EngineFailure
        );
    }

    #[test]
    fn error_kind_serializes_as_code() {
        let json = serde_json::to_string(&ErrorKind::ConnectionNotOpen).unwrap();
        assert_eq!(json, "\"connection-not-open\"");
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = DatabaseError::connection_not_open("db2");
        assert_eq!(err.to_string(), "[connection-not-open] database `db2` is not open");
        assert!(err.cause().is_none());
    }

    #[test]
    fn source_is_preserved() {
        let engine = EngineError::with_code(19, "UNIQUE constraint failed: t.id");
        let err = DatabaseError::with_source(
            ErrorKind::EngineFailure,
            engine.message.clone(),
            Box::new(engine.clone()),
        );
        let cause = err.cause().expect("cause should be kept");
        assert_eq!(cause.downcast_ref::<EngineError>(), Some(&engine));
    }
}
