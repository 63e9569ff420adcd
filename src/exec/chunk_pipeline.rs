//! Dedicated-consumer chunk pipeline over a bounded SPSC ring.
//!
//! One producer (the strategy's dispatch loop) feeds one consumer thread
//! through a [`crate::stdx::spsc`] ring. Pushes spin with backoff while the
//! ring is full, which preserves push order without ever dropping a chunk.
//! The consumer spins briefly on an empty ring, then snoozes; after the
//! stop flag is raised it drains whatever is still queued before exiting,
//! so every chunk pushed before [`ChunkPipeline::stop`] is handled
//! (flush-on-stop).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{Scope, ScopedJoinHandle};

use crossbeam_utils::Backoff;

use crate::stdx::spsc;

/// Ring capacity between the producer and each consumer.
///
/// Deep enough that the producer only stalls when a consumer falls a full
/// window behind; at that point stalling is the correct backpressure.
pub const CHUNK_QUEUE_CAPACITY: usize = 32 * 1024;

/// A consumer thread bound to an SPSC ring of work items.
pub struct ChunkPipeline<'scope, T: Send> {
    tx: spsc::Producer<T>,
    stop: Arc<AtomicBool>,
    consumer: Option<ScopedJoinHandle<'scope, ()>>,
}

impl<'scope, T: Send + 'scope> ChunkPipeline<'scope, T> {
    /// Spawns the consumer thread and returns the producer-side handle.
    ///
    /// `handler` runs on the consumer thread, once per pushed item, in
    /// push order.
    pub fn start<'env, F>(
        scope: &'scope Scope<'scope, 'env>,
        capacity: usize,
        mut handler: F,
    ) -> Self
    where
        F: FnMut(T) + Send + 'scope,
    {
        let (tx, mut rx) = spsc::channel(capacity);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let consumer = scope.spawn(move || {
            let backoff = Backoff::new();
            while !stop_flag.load(Ordering::Acquire) {
                match rx.try_pop() {
                    Some(item) => {
                        handler(item);
                        backoff.reset();
                    }
                    None => backoff.snooze(),
                }
            }
            // Flush-on-stop: everything pushed before the flag was raised
            // is already in the ring; hand it all to the handler.
            while let Some(item) = rx.try_pop() {
                handler(item);
            }
        });

        Self {
            tx,
            stop,
            consumer: Some(consumer),
        }
    }

    /// Pushes one item, spinning while the ring is full.
    ///
    /// The spin is bounded by consumer latency in normal operation. If the
    /// consumer has died (handler panic) the item is dropped instead of
    /// spinning forever; the panic surfaces from [`stop`](Self::stop).
    pub fn push(&mut self, item: T) {
        let backoff = Backoff::new();
        let mut item = item;
        loop {
            match self.tx.try_push(item) {
                Ok(()) => return,
                Err(back) => {
                    if self
                        .consumer
                        .as_ref()
                        .is_some_and(ScopedJoinHandle::is_finished)
                    {
                        return;
                    }
                    item = back;
                    backoff.snooze();
                }
            }
        }
    }

    /// Raises the stop flag and joins the consumer after it drains the
    /// ring. Returns the consumer's panic payload as an error.
    pub fn stop(mut self) -> std::thread::Result<()> {
        self.stop.store(true, Ordering::Release);
        match self.consumer.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}
