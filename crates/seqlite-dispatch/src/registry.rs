// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of open connections, keyed by connection name.
//!
//! The registry is the guard every operation passes before it is admitted to
//! a queue: a name that is not registered is not open.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;

use crate::sequencer::ConnectionQueue;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("database `{name}` is not open")]
    NotOpen { name: String },

    #[error("database `{name}` is already open")]
    AlreadyOpen { name: String },

    #[error("failed to start worker for database `{name}`: {source}")]
    Spawn {
        name: String,
        source: std::io::Error,
    },
}

/// Open connections and their operation queues.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<String, Arc<ConnectionQueue>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    /// Returns the queue for `name`, or [`RegistryError::NotOpen`].
    pub fn assert_open(&self, name: &str) -> Result<Arc<ConnectionQueue>, RegistryError> {
        self.connections
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RegistryError::NotOpen {
                name: name.to_string(),
            })
    }

    /// Registers a new connection, building its queue only if the name is free.
    pub fn register(
        &self,
        name: &str,
        start: impl FnOnce() -> std::io::Result<ConnectionQueue>,
    ) -> Result<Arc<ConnectionQueue>, RegistryError> {
        match self.connections.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyOpen {
                name: name.to_string(),
            }),
            Entry::Vacant(slot) => {
                let queue = start().map_err(|source| RegistryError::Spawn {
                    name: name.to_string(),
                    source,
                })?;
                let queue = Arc::new(queue);
                slot.insert(Arc::clone(&queue));
                Ok(queue)
            }
        }
    }

    /// Removes `name`; from here on it is reported as not open.
    pub fn remove(&self, name: &str) -> Result<Arc<ConnectionQueue>, RegistryError> {
        self.connections
            .remove(name)
            .map(|(_, queue)| queue)
            .ok_or_else(|| RegistryError::NotOpen {
                name: name.to_string(),
            })
    }

    /// Names of all open connections, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use seqlite_core::{BatchEngine, BatchQueryResult, EngineError, NativeBatchCommand};

    use super::*;

    struct Idle;

    impl BatchEngine for Idle {
        fn execute_batch(
            &mut self,
            _commands: &[NativeBatchCommand],
            _ignore_null: Option<bool>,
        ) -> Result<BatchQueryResult, EngineError> {
            Ok(BatchQueryResult::default())
        }
    }

    fn start(name: &'static str) -> impl FnOnce() -> std::io::Result<ConnectionQueue> {
        move || ConnectionQueue::spawn(name, Box::new(Idle), format!("test-{name}"))
    }

    #[test]
    fn register_and_lookup() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.is_open("db1"));

        registry.register("db1", start("db1")).unwrap();
        assert!(registry.is_open("db1"));
        assert_eq!(registry.assert_open("db1").unwrap().name(), "db1");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn missing_name_is_not_open() {
        let registry = ConnectionRegistry::new();
        let err = registry.assert_open("db2").unwrap_err();
        assert!(matches!(err, RegistryError::NotOpen { name } if name == "db2"));
    }

    #[test]
    fn duplicate_register_is_rejected_without_spawning() {
        let registry = ConnectionRegistry::new();
        registry.register("db1", start("db1")).unwrap();

        let mut spawned = false;
        let err = registry
            .register("db1", || {
                spawned = true;
                ConnectionQueue::spawn("db1", Box::new(Idle), "unused".into())
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyOpen { .. }));
        assert!(!spawned);
    }

    #[test]
    fn spawn_failure_leaves_name_free() {
        let registry = ConnectionRegistry::new();
        let err = registry
            .register("db1", || Err(std::io::Error::other("no threads left")))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Spawn { .. }));
        assert!(!registry.is_open("db1"));
    }

    #[test]
    fn remove_closes_name() {
        let registry = ConnectionRegistry::new();
        registry.register("b", start("b")).unwrap();
        registry.register("a", start("a")).unwrap();
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);

        registry.remove("a").unwrap();
        assert!(!registry.is_open("a"));
        assert!(registry.remove("a").is_err());
        assert_eq!(registry.names(), vec!["b".to_string()]);
    }
}
