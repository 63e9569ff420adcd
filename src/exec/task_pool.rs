//! Fixed-size thread pool over a shared FIFO task queue.
//!
//! The pool is constructed inside a [`std::thread::scope`] so posted tasks
//! may borrow data owned by the caller (the mapped source region, worker
//! batches). Lifecycle mirrors a classic io-service loop:
//!
//! - [`TaskPool::run`] spawns the workers; until then posted tasks queue up.
//! - [`TaskPool::post`] enqueues a task; workers execute in FIFO pickup
//!   order but with no cross-task completion ordering.
//! - [`TaskPool::wait`] stops accepting the implicit keep-alive, lets the
//!   queue drain, and joins the workers, surfacing task panics.
//! - [`TaskPool::stop`] discards queued tasks and joins; in-flight tasks
//!   finish.

use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{Scope, ScopedJoinHandle};

type Task<'scope> = Box<dyn FnOnce() + Send + 'scope>;

/// Queue phase, advanced by the pool owner.
///
/// `Accepting` corresponds to the keep-alive being held: workers sleep on
/// an empty queue instead of exiting. `Draining` lets workers run the
/// queue dry and exit. `Stopped` makes workers exit without touching the
/// remaining tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Accepting,
    Draining,
    Stopped,
}

struct State<'scope> {
    tasks: VecDeque<Task<'scope>>,
    phase: Phase,
}

struct Shared<'scope> {
    state: Mutex<State<'scope>>,
    ready: Condvar,
}

impl<'scope> Shared<'scope> {
    fn lock(&self) -> MutexGuard<'_, State<'scope>> {
        // A task that panics does so outside the lock, but a poisoned
        // mutex would otherwise wedge every surviving worker.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// One or more pool tasks panicked.
#[derive(Debug)]
#[non_exhaustive]
pub struct TaskPanic {
    /// Number of workers that died unwinding.
    pub workers_lost: usize,
}

impl fmt::Display for TaskPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pool worker(s) panicked", self.workers_lost)
    }
}

impl Error for TaskPanic {}

/// Fixed pool of scoped worker threads drawing from a FIFO.
pub struct TaskPool<'scope, 'env: 'scope> {
    shared: Arc<Shared<'scope>>,
    scope: &'scope Scope<'scope, 'env>,
    workers: Vec<ScopedJoinHandle<'scope, ()>>,
    worker_count: usize,
}

impl<'scope, 'env> TaskPool<'scope, 'env> {
    /// Creates an idle pool; call [`run`](Self::run) to spawn the workers.
    ///
    /// `workers` is clamped to at least 1.
    pub fn new(scope: &'scope Scope<'scope, 'env>, workers: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    tasks: VecDeque::new(),
                    phase: Phase::Accepting,
                }),
                ready: Condvar::new(),
            }),
            scope,
            workers: Vec::new(),
            worker_count: workers.max(1),
        }
    }

    /// Number of worker threads this pool runs.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Spawns the workers. A no-op when they are already running.
    pub fn run(&mut self) {
        if !self.workers.is_empty() {
            return;
        }
        self.shared.lock().phase = Phase::Accepting;
        for _ in 0..self.worker_count {
            let shared = Arc::clone(&self.shared);
            self.workers.push(self.scope.spawn(move || {
                loop {
                    let task = {
                        let mut state = shared.lock();
                        loop {
                            if state.phase == Phase::Stopped {
                                return;
                            }
                            if let Some(task) = state.tasks.pop_front() {
                                break task;
                            }
                            if state.phase == Phase::Draining {
                                return;
                            }
                            state = shared
                                .ready
                                .wait(state)
                                .unwrap_or_else(|p| p.into_inner());
                        }
                    };
                    task();
                }
            }));
        }
    }

    /// Enqueues a task. Tasks posted before [`run`](Self::run) sit in the
    /// queue and are only executed once workers exist.
    pub fn post(&self, task: impl FnOnce() + Send + 'scope) {
        let mut state = self.shared.lock();
        state.tasks.push_back(Box::new(task));
        drop(state);
        self.shared.ready.notify_one();
    }

    /// Lets the queue drain and joins all workers.
    ///
    /// Returns an error when any task panicked; remaining workers are
    /// still joined first, so partial progress never leaks threads.
    pub fn wait(&mut self) -> Result<(), TaskPanic> {
        self.shutdown(Phase::Draining)
    }

    /// Discards queued tasks and joins; tasks already picked up complete.
    pub fn stop(&mut self) -> Result<(), TaskPanic> {
        {
            let mut state = self.shared.lock();
            state.tasks.clear();
        }
        self.shutdown(Phase::Stopped)
    }

    fn shutdown(&mut self, phase: Phase) -> Result<(), TaskPanic> {
        {
            let mut state = self.shared.lock();
            state.phase = phase;
        }
        self.shared.ready.notify_all();

        let mut workers_lost = 0usize;
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                workers_lost += 1;
            }
        }

        if workers_lost == 0 {
            Ok(())
        } else {
            Err(TaskPanic { workers_lost })
        }
    }
}
