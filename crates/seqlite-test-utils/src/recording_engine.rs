// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording engine for deterministic dispatch tests.
//!
//! `RecordingEngine` implements [`BatchEngine`] by appending every call to an
//! [`InvocationLog`] and answering from a FIFO queue of scripted
//! [`Response`]s. Clones share state, so a test keeps one clone as a handle
//! after moving the other into the dispatcher.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, mpsc};

use seqlite_core::{BatchEngine, BatchQueryResult, EngineError, NativeBatchCommand};

/// One recorded `execute_batch` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Label of the engine that received the call.
    pub engine: String,
    pub commands: Vec<NativeBatchCommand>,
    pub ignore_null: Option<bool>,
}

impl Invocation {
    pub fn queries(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.query.as_str()).collect()
    }
}

/// Append-only log of invocations, shareable between engines.
#[derive(Debug, Clone, Default)]
pub struct InvocationLog {
    entries: Arc<Mutex<Vec<Invocation>>>,
}

impl InvocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, invocation: Invocation) {
        lock(&self.entries).push(invocation);
    }

    pub fn snapshot(&self) -> Vec<Invocation> {
        lock(&self.entries).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First query of each invocation, in the order the engines saw them.
    pub fn first_queries(&self) -> Vec<String> {
        lock(&self.entries)
            .iter()
            .filter_map(|i| i.commands.first().map(|c| c.query.clone()))
            .collect()
    }
}

/// What the engine does on its next call.
#[derive(Debug, Clone)]
pub enum Response {
    Succeed(BatchQueryResult),
    Fail(EngineError),
    Panic(String),
}

/// Holds a gated engine back until permits are issued.
///
/// Dropping the gate releases the engine for good.
#[derive(Debug)]
pub struct Gate {
    permits: mpsc::Sender<()>,
}

impl Gate {
    /// Let `count` more calls through.
    pub fn release(&self, count: usize) {
        for _ in 0..count {
            // A closed receiver means the engine is already gone.
            let _ = self.permits.send(());
        }
    }
}

/// A [`BatchEngine`] that records calls and replays scripted responses.
///
/// With an empty script, a call succeeds with `rows_affected` equal to the
/// number of commands in the batch.
#[derive(Debug, Clone)]
pub struct RecordingEngine {
    label: String,
    log: InvocationLog,
    responses: Arc<Mutex<VecDeque<Response>>>,
    gate: Option<Arc<Mutex<mpsc::Receiver<()>>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingEngine {
    /// Create an engine with its own invocation log.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_log(label, InvocationLog::new())
    }

    /// Create an engine that records into an existing log.
    pub fn with_log(label: impl Into<String>, log: InvocationLog) -> Self {
        Self {
            label: label.into(),
            log,
            responses: Arc::new(Mutex::new(VecDeque::new())),
            gate: None,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every call wait for a permit from the returned [`Gate`].
    ///
    /// Must be called before the engine is cloned or handed out.
    pub fn gated(mut self) -> (Self, Gate) {
        let (permits, receiver) = mpsc::channel();
        self.gate = Some(Arc::new(Mutex::new(receiver)));
        (self, Gate { permits })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn log(&self) -> &InvocationLog {
        &self.log
    }

    /// Queue a response for a future call.
    pub fn push_response(&self, response: Response) {
        lock(&self.responses).push_back(response);
    }

    pub fn push_result(&self, result: BatchQueryResult) {
        self.push_response(Response::Succeed(result));
    }

    pub fn push_failure(&self, error: EngineError) {
        self.push_response(Response::Fail(error));
    }

    /// Whether [`BatchEngine::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn wait_for_permit(&self) {
        if let Some(gate) = &self.gate {
            // A dropped gate opens the engine permanently.
            let _ = lock(gate).recv();
        }
    }
}

impl BatchEngine for RecordingEngine {
    fn execute_batch(
        &mut self,
        commands: &[NativeBatchCommand],
        ignore_null: Option<bool>,
    ) -> Result<BatchQueryResult, EngineError> {
        self.wait_for_permit();
        self.log.push(Invocation {
            engine: self.label.clone(),
            commands: commands.to_vec(),
            ignore_null,
        });
        tracing::debug!(engine = %self.label, commands = commands.len(), "recorded invocation");

        let next = lock(&self.responses).pop_front();
        match next {
            Some(Response::Succeed(result)) => Ok(result),
            Some(Response::Fail(error)) => Err(error),
            Some(Response::Panic(message)) => panic!("{message}"),
            None => Ok(BatchQueryResult {
                rows_affected: commands.len() as u64,
                ..Default::default()
            }),
        }
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
