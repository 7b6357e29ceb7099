//! Bounded hand-off between producers and the consumer
//!
//! Producers never block: a full queue is reported back to the caller.
//! The consumer blocks in [`MessageQueue::take`] until a message arrives or
//! a [`CancelHandle`] fires.

use crate::error::{Error, Result};
use crate::tag::TaggedMessage;
use crossbeam::channel::{bounded, select, Receiver, Sender, TrySendError};
use std::time::Duration;
use tracing::warn;

/// Fixed-capacity FIFO of tagged messages
pub struct MessageQueue {
    sender: Sender<TaggedMessage>,
    receiver: Receiver<TaggedMessage>,
    cancel_tx: Sender<()>,
    cancel_rx: Receiver<()>,
    capacity: usize,
}

/// Wakes a consumer blocked in `take` without handing it a message
#[derive(Clone)]
pub struct CancelHandle {
    tx: Sender<()>,
}

impl CancelHandle {
    /// Deliver one cancellation. Repeated calls before the consumer wakes
    /// collapse into a single signal.
    pub fn cancel(&self) {
        let _ = self.tx.try_send(());
    }
}

impl MessageQueue {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        let (cancel_tx, cancel_rx) = bounded(1);
        Self {
            sender,
            receiver,
            cancel_tx,
            cancel_rx,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Enqueue without blocking
    pub fn offer(&self, message: TaggedMessage) -> Result<()> {
        match self.sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(capacity = self.capacity, "Message queue full, rejecting tag");
                Err(Error::QueueSaturated {
                    capacity: self.capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => Err(Error::StreamClosed),
        }
    }

    /// Block until a message is available. Returns `None` when cancelled.
    pub fn take(&self) -> Option<TaggedMessage> {
        select! {
            recv(self.receiver) -> msg => msg.ok(),
            recv(self.cancel_rx) -> _ => None,
        }
    }

    /// Like [`take`](Self::take) but gives up after `timeout`
    pub fn take_timeout(&self, timeout: Duration) -> Option<TaggedMessage> {
        select! {
            recv(self.receiver) -> msg => msg.ok(),
            recv(self.cancel_rx) -> _ => None,
            default(timeout) => None,
        }
    }

    /// Dequeue without blocking
    pub fn try_take(&self) -> Option<TaggedMessage> {
        self.receiver.try_recv().ok()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }
}
