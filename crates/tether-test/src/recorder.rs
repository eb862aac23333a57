//! Handler call recording.

use std::sync::Arc;

use parking_lot::Mutex;

/// Records values passed to a handler so tests can inspect them afterwards.
///
/// Clones share the same log, so a clone can be moved into a handler while
/// the test keeps the original.
///
/// # Example
///
/// ```
/// use tether_test::Recorder;
///
/// let recorder = Recorder::new();
/// let in_handler = recorder.clone();
/// in_handler.record("First".to_string());
///
/// assert_eq!(recorder.last().as_deref(), Some("First"));
/// assert_eq!(recorder.call_count(), 1);
/// ```
#[derive(Debug)]
pub struct Recorder<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T> Recorder<T> {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Appends a call.
    pub fn record(&self, value: T) {
        self.calls.lock().push(value);
    }

    /// Returns the number of recorded calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Forgets all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl<T: Clone> Recorder<T> {
    /// Returns the most recent call.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.calls.lock().last().cloned()
    }

    /// Returns every call, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<T> {
        self.calls.lock().clone()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}
