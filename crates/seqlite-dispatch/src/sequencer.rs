// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-connection operation sequencer.
//!
//! Every open connection gets one [`ConnectionQueue`]: an unbounded FIFO
//! channel drained by a single dedicated worker thread that owns the
//! connection's [`BatchEngine`]. Sync and async callers push onto the same
//! channel, so the engine sees operations in exactly the order they were
//! admitted, and never more than one at a time.
//!
//! Admission is synchronous and never blocks. What differs between the two
//! submission styles is only how the caller waits on the returned [`Ticket`]:
//! [`Ticket::wait`] blocks the current thread, [`Ticket::settle`] is awaited.
//!
//! Closing is itself a queued message. Everything admitted before the close
//! marker still runs; anything that slips in behind it is rejected with
//! `connection-not-open`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::thread::JoinHandle;

use seqlite_core::{BatchEngine, DatabaseError, EngineError, ErrorKind};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::normalize::normalize_panic;

/// The connection's worker is gone and no longer accepts operations.
#[derive(Debug, Error)]
#[error("database `{name}` is closed")]
pub struct QueueClosed {
    pub name: String,
}

/// A unit of work waiting for its turn on a connection.
trait Operation: Send {
    fn run(self: Box<Self>, engine: &mut dyn BatchEngine);
    fn reject(self: Box<Self>, error: DatabaseError);
}

struct Pending<T, F> {
    work: F,
    reply: oneshot::Sender<Result<T, DatabaseError>>,
}

impl<T, F> Operation for Pending<T, F>
where
    T: Send,
    F: FnOnce(&mut dyn BatchEngine) -> Result<T, DatabaseError> + Send,
{
    fn run(self: Box<Self>, engine: &mut dyn BatchEngine) {
        let Pending { work, reply } = *self;
        let result = panic::catch_unwind(AssertUnwindSafe(|| work(engine)))
            .unwrap_or_else(|payload| Err(normalize_panic(payload)));
        // The caller may have dropped its ticket; the work still ran.
        let _ = reply.send(result);
    }

    fn reject(self: Box<Self>, error: DatabaseError) {
        let _ = self.reply.send(Err(error));
    }
}

enum Message {
    Run {
        seq: u64,
        op: Box<dyn Operation>,
    },
    Close {
        seq: u64,
        done: oneshot::Sender<Result<(), EngineError>>,
    },
}

struct Admission {
    sender: mpsc::UnboundedSender<Message>,
    next_seq: u64,
}

/// The ordered operation queue of one open connection.
pub struct ConnectionQueue {
    name: String,
    admission: Mutex<Admission>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionQueue {
    /// Starts the worker thread for `name`, handing it ownership of `engine`.
    pub fn spawn(
        name: &str,
        engine: Box<dyn BatchEngine>,
        thread_name: String,
    ) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker_name = name.to_string();
        let handle = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || run_worker(worker_name, engine, receiver))?;

        Ok(Self {
            name: name.to_string(),
            admission: Mutex::new(Admission {
                sender,
                next_seq: 0,
            }),
            worker: Mutex::new(Some(handle)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of messages admitted so far, close marker included.
    pub fn admitted(&self) -> u64 {
        self.admission
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_seq
    }

    /// Appends `work` to the queue and returns a ticket for its result.
    ///
    /// Never blocks. The sequence number handed out here is the position the
    /// engine will observe the operation at.
    pub fn submit<T, F>(&self, work: F) -> Result<Ticket<T>, QueueClosed>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn BatchEngine) -> Result<T, DatabaseError> + Send + 'static,
    {
        let (reply, receiver) = oneshot::channel();
        let op = Box::new(Pending { work, reply });

        let seq = self.admit(|seq| Message::Run { seq, op })?;
        debug!(connection = %self.name, seq, "operation admitted");

        Ok(Ticket {
            connection: self.name.clone(),
            seq,
            receiver,
        })
    }

    /// Queues the close marker. Operations already admitted run first.
    pub fn request_close(
        &self,
    ) -> Result<oneshot::Receiver<Result<(), EngineError>>, QueueClosed> {
        let (done, receiver) = oneshot::channel();
        let seq = self.admit(|seq| Message::Close { seq, done })?;
        debug!(connection = %self.name, seq, "close admitted");
        Ok(receiver)
    }

    /// Waits for the worker thread to exit. Only meaningful after
    /// [`request_close`](Self::request_close).
    pub fn join(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            warn!(connection = %self.name, "worker thread panicked");
        }
    }

    fn admit(&self, message: impl FnOnce(u64) -> Message) -> Result<u64, QueueClosed> {
        let mut admission = self
            .admission
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let seq = admission.next_seq;
        admission
            .sender
            .send(message(seq))
            .map_err(|_| QueueClosed {
                name: self.name.clone(),
            })?;
        admission.next_seq += 1;
        Ok(seq)
    }
}

impl std::fmt::Debug for ConnectionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionQueue")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Handle to the eventual result of an admitted operation.
#[must_use = "the operation runs regardless, but its result is lost unless awaited"]
pub struct Ticket<T> {
    connection: String,
    seq: u64,
    receiver: oneshot::Receiver<Result<T, DatabaseError>>,
}

impl<T> Ticket<T> {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Blocks the current thread until the operation has run.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context; use
    /// [`settle`](Self::settle) there instead.
    pub fn wait(self) -> Result<T, DatabaseError> {
        let Ticket {
            connection,
            seq,
            receiver,
        } = self;
        receiver
            .blocking_recv()
            .unwrap_or_else(|_| Err(dropped(&connection, seq)))
    }

    /// Resolves once the operation has run.
    pub async fn settle(self) -> Result<T, DatabaseError> {
        let Ticket {
            connection,
            seq,
            receiver,
        } = self;
        receiver
            .await
            .unwrap_or_else(|_| Err(dropped(&connection, seq)))
    }
}

fn dropped(connection: &str, seq: u64) -> DatabaseError {
    DatabaseError::new(
        ErrorKind::ConnectionNotOpen,
        format!("database `{connection}` closed before operation {seq} ran"),
    )
}

fn run_worker(
    name: String,
    mut engine: Box<dyn BatchEngine>,
    mut receiver: mpsc::UnboundedReceiver<Message>,
) {
    debug!(connection = %name, "worker started");

    while let Some(message) = receiver.blocking_recv() {
        match message {
            Message::Run { seq, op } => {
                debug!(connection = %name, seq, "operation started");
                op.run(engine.as_mut());
                debug!(connection = %name, seq, "operation finished");
            }
            Message::Close { seq, done } => {
                receiver.close();
                while let Ok(straggler) = receiver.try_recv() {
                    reject(&name, straggler);
                }
                let result = close_engine(&name, engine.as_mut());
                info!(connection = %name, seq, "connection closed");
                let _ = done.send(result);
                return;
            }
        }
    }

    // Every sender is gone without an explicit close.
    if let Err(err) = close_engine(&name, engine.as_mut()) {
        warn!(connection = %name, error = %err, "engine close failed");
    }
    debug!(connection = %name, "worker stopped");
}

fn reject(name: &str, message: Message) {
    match message {
        Message::Run { seq, op } => {
            debug!(connection = %name, seq, "rejecting operation queued behind close");
            op.reject(dropped(name, seq));
        }
        Message::Close { done, .. } => {
            let _ = done.send(Err(EngineError::new(format!(
                "database `{name}` is already closed"
            ))));
        }
    }
}

fn close_engine(name: &str, engine: &mut dyn BatchEngine) -> Result<(), EngineError> {
    panic::catch_unwind(AssertUnwindSafe(|| engine.close())).unwrap_or_else(|payload| {
        let err = normalize_panic(payload);
        warn!(connection = %name, error = %err, "engine panicked while closing");
        Err(EngineError::new(err.message()))
    })
}
