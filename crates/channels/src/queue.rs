//! Bounded fan-in queues shared by every connection.
//!
//! Producers hold plain `mpsc::Sender`s. Readers get a cloneable
//! [`QueueReceiver`] so several consumers can drain the same queue; each item
//! is delivered to exactly one of them.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::{event::Event, message::Message};

/// Read handle to the shared message queue.
pub type MessageStream = QueueReceiver<Message>;

/// Read handle to the shared event queue.
pub type EventStream = QueueReceiver<Event>;

/// Create a bounded queue with room for `capacity` items.
pub(crate) fn bounded<T>(capacity: usize) -> (mpsc::Sender<T>, QueueReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, QueueReceiver {
        inner: Arc::new(Mutex::new(rx)),
        capacity,
    })
}

/// Cloneable receiving side of a bounded queue.
pub struct QueueReceiver<T> {
    inner: Arc<Mutex<mpsc::Receiver<T>>>,
    capacity: usize,
}

impl<T> Clone for QueueReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            capacity: self.capacity,
        }
    }
}

impl<T> QueueReceiver<T> {
    /// Wait for the next item. Returns `None` once every sender is gone and
    /// the queue is drained.
    pub async fn recv(&self) -> Option<T> {
        self.inner.lock().await.recv().await
    }

    /// Take an item if one is buffered and no other reader holds the queue.
    pub fn try_recv(&self) -> Option<T> {
        self.inner.try_lock().ok()?.try_recv().ok()
    }

    /// Maximum number of buffered items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently buffered (0 while another reader holds the
    /// queue).
    pub fn len(&self) -> usize {
        self.inner.try_lock().map(|rx| rx.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
