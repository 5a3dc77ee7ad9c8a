// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single choke point that turns any failure into a [`DatabaseError`].

use std::any::Any;
use std::error::Error;

use seqlite_core::{DatabaseError, EngineError, ErrorKind};

use crate::executor::ArgumentError;
use crate::registry::RegistryError;
use crate::sequencer::QueueClosed;

type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Classify `error` and wrap it in a [`DatabaseError`].
///
/// | failure                                  | kind                  |
/// |------------------------------------------|-----------------------|
/// | [`RegistryError::NotOpen`], [`QueueClosed`] | `connection-not-open` |
/// | [`EngineError`]                          | `engine-failure`      |
/// | [`ArgumentError`], [`RegistryError::AlreadyOpen`] | `invalid-argument` |
/// | a `DatabaseError`                        | returned as is        |
/// | anything else                            | `unknown`             |
pub fn normalize(error: impl Into<BoxError>) -> DatabaseError {
    let error: BoxError = error.into();

    let error = match error.downcast::<DatabaseError>() {
        Ok(structured) => return *structured,
        Err(other) => other,
    };

    let error = match error.downcast::<RegistryError>() {
        Ok(registry) => {
            let kind = match *registry {
                RegistryError::NotOpen { .. } => ErrorKind::ConnectionNotOpen,
                RegistryError::AlreadyOpen { .. } => ErrorKind::InvalidArgument,
                RegistryError::Spawn { .. } => ErrorKind::Unknown,
            };
            return DatabaseError::with_source(kind, registry.to_string(), registry);
        }
        Err(other) => other,
    };

    let error = match error.downcast::<QueueClosed>() {
        Ok(closed) => {
            return DatabaseError::with_source(
                ErrorKind::ConnectionNotOpen,
                closed.to_string(),
                closed,
            );
        }
        Err(other) => other,
    };

    let error = match error.downcast::<EngineError>() {
        Ok(engine) => {
            return DatabaseError::with_source(
                ErrorKind::EngineFailure,
                engine.message.clone(),
                engine,
            );
        }
        Err(other) => other,
    };

    let error = match error.downcast::<ArgumentError>() {
        Ok(argument) => {
            return DatabaseError::with_source(
                ErrorKind::InvalidArgument,
                argument.to_string(),
                argument,
            );
        }
        Err(other) => other,
    };

    DatabaseError::with_source(ErrorKind::Unknown, error.to_string(), error)
}

/// Convert a caught panic payload into an `unknown` error.
pub fn normalize_panic(payload: Box<dyn Any + Send>) -> DatabaseError {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    DatabaseError::unknown(format!("operation panicked: {detail}"))
}
