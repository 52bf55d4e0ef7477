//! # Dedicated execution context of a worker.
//!
//! [`WorkerHandle::spawn`] runs a [`Worker`] on its own named OS thread and
//! shares an atomic status word with it:
//!
//! ```text
//! spawn() ──► Starting ──(thread enters start())──► Running ──(return / panic)──► Dead
//! ```
//!
//! The transition to `Dead` is made by a drop guard, so it also happens when
//! the worker panics. Liveness checks are lock-free loads.
//!
//! Threads are detached: dropping the handle does not stop the worker, and
//! nothing in this crate kills it. It ends with its own loop or with the process.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use crate::error::WorkerError;
use crate::workers::Worker;

const STARTING: u8 = 0;
const RUNNING: u8 = 1;
const DEAD: u8 = 2;

/// Observable state of a worker's execution context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Thread spawned, `start()` not entered yet.
    Starting,
    /// Inside `start()`.
    Running,
    /// Thread finished (returned or panicked).
    Dead,
}

#[derive(Debug, Default)]
struct Shared {
    status: AtomicU8,
    exit: OnceLock<String>,
}

/// Marks the worker dead when the thread body unwinds or returns.
struct DeadOnDrop(Arc<Shared>);

impl Drop for DeadOnDrop {
    fn drop(&mut self) {
        if thread::panicking() {
            let _ = self.0.exit.set("panicked".to_string());
        }
        self.0.status.store(DEAD, Ordering::Release);
    }
}

/// Handle to a worker thread with a liveness query.
#[derive(Debug)]
pub struct WorkerHandle {
    shared: Arc<Shared>,
    thread: thread::JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawns `worker` on a thread named `<name>-worker`.
    pub fn spawn(name: &str, mut worker: Box<dyn Worker>) -> Result<Self, WorkerError> {
        let shared = Arc::new(Shared::default());
        let inner = Arc::clone(&shared);
        let worker_name = name.to_string();

        let thread = thread::Builder::new()
            .name(format!("{name}-worker"))
            .spawn(move || {
                let guard = DeadOnDrop(inner);
                guard.0.status.store(RUNNING, Ordering::Release);
                let exit = match worker.start() {
                    Ok(()) => "run loop returned".to_string(),
                    Err(e) => {
                        tracing::error!(worker = %worker_name, error = %e, "worker run loop failed");
                        e.to_string()
                    }
                };
                let _ = guard.0.exit.set(exit);
            })
            .map_err(WorkerError::Spawn)?;

        Ok(Self { shared, thread })
    }

    pub fn status(&self) -> WorkerStatus {
        match self.shared.status.load(Ordering::Acquire) {
            STARTING => WorkerStatus::Starting,
            RUNNING => WorkerStatus::Running,
            _ => WorkerStatus::Dead,
        }
    }

    /// True unless the execution context has terminated.
    pub fn is_alive(&self) -> bool {
        self.status() != WorkerStatus::Dead
    }

    /// Why the worker ended, once it is dead.
    pub fn exit_reason(&self) -> Option<&str> {
        self.shared.exit.get().map(String::as_str)
    }

    /// Name given to the OS thread.
    pub fn thread_name(&self) -> Option<&str> {
        self.thread.thread().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    struct Scripted(mpsc::Receiver<Result<(), String>>);

    impl Worker for Scripted {
        fn start(&mut self) -> Result<(), WorkerError> {
            match self.0.recv() {
                Ok(Ok(())) | Err(_) => Ok(()),
                Ok(Err(msg)) if msg == "panic" => panic!("worker exploded"),
                Ok(Err(msg)) => Err(WorkerError::Failed(msg)),
            }
        }
    }

    fn wait_dead(h: &WorkerHandle) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while h.is_alive() {
            assert!(Instant::now() < deadline, "worker did not die");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_alive_until_start_returns() {
        let (tx, rx) = mpsc::channel();
        let h = WorkerHandle::spawn("Twitter", Box::new(Scripted(rx))).unwrap();
        assert_eq!(h.thread_name(), Some("Twitter-worker"));
        assert!(h.is_alive());
        assert!(h.exit_reason().is_none());

        tx.send(Ok(())).unwrap();
        wait_dead(&h);
        assert_eq!(h.status(), WorkerStatus::Dead);
        assert_eq!(h.exit_reason(), Some("run loop returned"));
    }

    #[test]
    fn test_error_exit_is_recorded() {
        let (tx, rx) = mpsc::channel();
        let h = WorkerHandle::spawn("Twitter", Box::new(Scripted(rx))).unwrap();
        tx.send(Err("rate limited".into())).unwrap();
        wait_dead(&h);
        assert_eq!(h.exit_reason(), Some("worker failed: rate limited"));
    }

    #[test]
    fn test_panic_marks_dead() {
        let (tx, rx) = mpsc::channel();
        let h = WorkerHandle::spawn("Twitter", Box::new(Scripted(rx))).unwrap();
        tx.send(Err("panic".into())).unwrap();
        wait_dead(&h);
        assert_eq!(h.exit_reason(), Some("panicked"));
    }
}
