// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for dispatch integration tests.
//!
//! `TestHarness` assembles a [`Dispatcher`] with one [`RecordingEngine`] per
//! named connection, all recording into a single shared [`InvocationLog`]
//! so cross-connection ordering can be asserted.

use std::collections::HashMap;

use seqlite_core::DatabaseError;
use seqlite_dispatch::{DispatchSettings, Dispatcher};

use crate::recording_engine::{Gate, InvocationLog, RecordingEngine};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    connections: Vec<(String, bool)>,
    settings: DispatchSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            connections: Vec::new(),
            settings: DispatchSettings {
                worker_name_prefix: "seqlite-test".to_string(),
                ..DispatchSettings::default()
            },
        }
    }

    /// Open a connection backed by a recording engine.
    pub fn with_connection(mut self, name: &str) -> Self {
        self.connections.push((name.to_string(), false));
        self
    }

    /// Open a connection whose engine waits for permits from a [`Gate`].
    pub fn with_gated_connection(mut self, name: &str) -> Self {
        self.connections.push((name.to_string(), true));
        self
    }

    pub fn with_simple_null_handling(mut self, enabled: bool) -> Self {
        self.settings.simple_null_handling = enabled;
        self
    }

    /// Build the harness, opening every requested connection.
    pub fn build(self) -> Result<TestHarness, DatabaseError> {
        let dispatcher = Dispatcher::new(self.settings);
        let log = InvocationLog::new();
        let mut engines = HashMap::new();
        let mut gates = HashMap::new();

        for (name, gated) in self.connections {
            let engine = RecordingEngine::with_log(name.clone(), log.clone());
            let engine = if gated {
                let (engine, gate) = engine.gated();
                gates.insert(name.clone(), gate);
                engine
            } else {
                engine
            };
            dispatcher.open(&name, engine.clone())?;
            engines.insert(name, engine);
        }

        Ok(TestHarness {
            dispatcher,
            log,
            engines,
            gates,
        })
    }
}

/// A dispatcher wired to recording engines.
pub struct TestHarness {
    dispatcher: Dispatcher,
    log: InvocationLog,
    engines: HashMap<String, RecordingEngine>,
    gates: HashMap<String, Gate>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Invocations across every connection, in the order engines saw them.
    pub fn log(&self) -> &InvocationLog {
        &self.log
    }

    /// Handle to the engine registered under `name`.
    ///
    /// # Panics
    ///
    /// Panics if no connection of that name was built.
    pub fn engine(&self, name: &str) -> &RecordingEngine {
        self.engines
            .get(name)
            .unwrap_or_else(|| panic!("no recording engine for connection `{name}`"))
    }

    /// Gate of a connection built with
    /// [`with_gated_connection`](TestHarnessBuilder::with_gated_connection).
    ///
    /// # Panics
    ///
    /// Panics if the connection is not gated.
    pub fn gate(&self, name: &str) -> &Gate {
        self.gates
            .get(name)
            .unwrap_or_else(|| panic!("connection `{name}` is not gated"))
    }

    /// Release a gated connection permanently.
    pub fn open_gate(&mut self, name: &str) {
        self.gates.remove(name);
    }
}
