//! Change notification registry
//!
//! Listeners are notified synchronously, in subscription order, after a
//! mapping mutates its table. A failing listener never stops delivery to the
//! ones after it.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

pub type ListenerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Observer of data changes on a table
pub trait ChangeListener: Send + Sync {
    fn data_set_changed(&self, table: &str) -> ListenerResult;
}

impl<F> ChangeListener for F
where
    F: Fn(&str) -> ListenerResult + Send + Sync,
{
    fn data_set_changed(&self, table: &str) -> ListenerResult {
        self(table)
    }
}

/// A listener that returned an error or panicked during notification
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerFailure {
    /// Position of the listener in subscription order at delivery time
    pub index: usize,
    pub message: String,
}

impl ListenerFailure {
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener #{}: {}", self.index, self.message)
    }
}

/// Ordered list of change listeners; removal is by `Arc` identity
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn ChangeListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, listener: &Arc<dyn ChangeListener>) -> bool {
        match self
            .listeners
            .iter()
            .position(|l| Arc::ptr_eq(l, listener))
        {
            Some(pos) => {
                self.listeners.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver a change to every listener and collect the ones that failed
    pub fn notify_changed(&self, table: &str) -> Vec<ListenerFailure> {
        let mut failures = Vec::new();

        for (index, listener) in self.listeners.iter().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.data_set_changed(table)));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };
            tracing::warn!(table, index, error = %message, "change listener failed");
            failures.push(ListenerFailure::new(index, message));
        }

        failures
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
