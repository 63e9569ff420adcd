//! Wait-free bounded SPSC (single-producer, single-consumer) ring buffer.
//!
//! # Design
//!
//! The classic cached-index SPSC ring (Rigtorp's SPSCQueue lineage, the
//! same scheme used by rtrb, Folly, and DPDK):
//!
//! - **Wait-free**: `try_push` and `try_pop` complete in a bounded number
//!   of steps; there is no CAS, only `Acquire` loads and `Release` stores,
//!   which compile to plain `MOV` on x86-64 TSO.
//! - **Cached remote index**: the producer keeps a local snapshot of the
//!   consumer's `head` and only reloads it when the ring looks full; the
//!   consumer mirrors this with the producer's `tail`. Steady-state pushes
//!   and pops touch a remote cache line only on the slow path.
//! - **Padded indices**: `head` and `tail` live on separate cache lines so
//!   producer and consumer never false-share.
//! - **Power-of-two capacity**: slot index is `index & mask`; the indices
//!   themselves increase monotonically (wrapping), which keeps full/empty
//!   distinguishable without a separate flag.
//!
//! # Ordering
//!
//! ```text
//! producer: write slot, Release-store tail   consumer: Acquire-load tail, read slot
//! consumer: read slot,  Release-store head   producer: Acquire-load head, write slot
//! ```
//!
//! Each direction establishes happens-before between the slot access and
//! the index publication, so a slot is never read before it is written nor
//! overwritten before it is read.
//!
//! The ring itself never blocks; callers choose their own wait strategy
//! (the chunk pipeline spins with `crossbeam_utils::Backoff`).

#[cfg(not(loom))]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(loom)]
use loom::sync::atomic::{AtomicUsize, Ordering};

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::Arc;

use crossbeam_utils::CachePadded;

/// Shared ring storage.
///
/// # Invariants
///
/// - `slots.len()` is a power of two; `mask == slots.len() - 1`.
/// - `head <= tail` and `tail - head <= slots.len()` at all times (indices
///   are monotonically increasing and wrap as `usize`).
/// - Slots in `[head, tail)` (masked) are initialized; all others are not.
/// - Only the producer stores `tail`; only the consumer stores `head`.
struct Ring<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: usize,
    /// Consumer's read index; producer Acquire-loads it to detect space.
    head: CachePadded<AtomicUsize>,
    /// Producer's write index; consumer Acquire-loads it to detect data.
    tail: CachePadded<AtomicUsize>,
}

// SAFETY: the SPSC protocol gives the producer and consumer disjoint slot
// access windows, published through the Acquire/Release index handshake.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        // Both handles are gone, so plain loads suffice.
        let mut head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        while head != tail {
            let slot = head & self.mask;
            // SAFETY: slots in [head, tail) hold initialized values.
            unsafe { (*self.slots[slot].get()).assume_init_drop() };
            head = head.wrapping_add(1);
        }
    }
}

/// Producer half. Move it to the pushing thread; `try_push` needs `&mut`.
pub struct Producer<T> {
    ring: Arc<Ring<T>>,
    /// Snapshot of the consumer's `head`, refreshed only on apparent-full.
    cached_head: usize,
}

impl<T> Producer<T> {
    /// Attempts to push; returns the value back when the ring is full.
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        let ring = &*self.ring;
        let tail = ring.tail.load(Ordering::Relaxed);

        if tail.wrapping_sub(self.cached_head) > ring.mask {
            self.cached_head = ring.head.load(Ordering::Acquire);
            if tail.wrapping_sub(self.cached_head) > ring.mask {
                return Err(value);
            }
        }

        // SAFETY: the slot at `tail` is outside the consumer's initialized
        // window; the consumer will not read it until the store below.
        unsafe {
            (*ring.slots[tail & ring.mask].get()).write(value);
        }
        ring.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(())
    }
}

/// Consumer half. Move it to the popping thread; `try_pop` needs `&mut`.
pub struct Consumer<T> {
    ring: Arc<Ring<T>>,
    /// Snapshot of the producer's `tail`, refreshed only on apparent-empty.
    cached_tail: usize,
}

impl<T> Consumer<T> {
    /// Attempts to pop; `None` when the ring is empty.
    #[inline]
    pub fn try_pop(&mut self) -> Option<T> {
        let ring = &*self.ring;
        let head = ring.head.load(Ordering::Relaxed);

        if head == self.cached_tail {
            self.cached_tail = ring.tail.load(Ordering::Acquire);
            if head == self.cached_tail {
                return None;
            }
        }

        // SAFETY: the slot at `head` is inside [head, tail), hence
        // initialized; the producer will not overwrite it until the store
        // below frees it.
        let value = unsafe { (*ring.slots[head & ring.mask].get()).assume_init_read() };
        ring.head.store(head.wrapping_add(1), Ordering::Release);
        Some(value)
    }
}

/// Creates an SPSC ring with the given capacity (power of two, >= 2).
///
/// # Panics
///
/// Panics when `capacity` is zero, one, or not a power of two.
pub fn channel<T: Send>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    assert!(
        capacity >= 2 && capacity.is_power_of_two(),
        "spsc capacity must be a power of two >= 2, got {capacity}"
    );

    let slots = (0..capacity)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect::<Vec<_>>()
        .into_boxed_slice();

    let ring = Arc::new(Ring {
        slots,
        mask: capacity - 1,
        head: CachePadded::new(AtomicUsize::new(0)),
        tail: CachePadded::new(AtomicUsize::new(0)),
    });

    (
        Producer {
            ring: Arc::clone(&ring),
            cached_head: 0,
        },
        Consumer {
            ring,
            cached_tail: 0,
        },
    )
}
