//! Observable single-writer cells shared between gesture and app contexts.
//!
//! # Responsibility
//! - Let the gesture context publish values without blocking.
//! - Let application-side observers read snapshots or receive change
//!   notifications.
//!
//! # Invariants
//! - Each cell has one logical writer; reads never block that writer.
//! - Subscribers only receive values that differ from the previous one.
//! - Disconnected subscribers are pruned on the next publish.

use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Wait-free readable cell with change notifications.
pub struct ObservableCell<T> {
    value: ArcSwap<T>,
    version: AtomicU64,
    subscribers: Mutex<Vec<Sender<T>>>,
}

impl<T> std::fmt::Debug for ObservableCell<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableCell")
            .field("value", &**self.value.load())
            .field("version", &self.version.load(Ordering::Acquire))
            .finish()
    }
}

impl<T> ObservableCell<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            value: ArcSwap::from_pointee(initial),
            version: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        T::clone(&self.value.load())
    }

    /// Monotonic counter bumped on every effective change.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Publishes `value`. Returns `false` when it equals the current value.
    pub fn set(&self, value: T) -> bool {
        if **self.value.load() == value {
            return false;
        }
        self.value.store(Arc::new(value.clone()));
        self.version.fetch_add(1, Ordering::AcqRel);
        self.notify(value);
        true
    }

    /// Applies `update` to the current value and publishes the result.
    pub fn update(&self, update: impl FnOnce(&T) -> T) -> bool {
        let next = update(&self.value.load());
        self.set(next)
    }

    /// Registers a change listener.
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn notify(&self, value: T) {
        // A poisoned list only loses notifications; the value itself is stored.
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return;
        };
        subscribers.retain(|tx| tx.send(value.clone()).is_ok());
    }
}
