//! Pull interface consumed by the transport

use crate::metadata::MetadataRecord;
use crate::tag::TaggedMessage;
use std::sync::Arc;

/// Source of tagged messages for a streaming transport.
///
/// The transport delivers [`start_messages`](Self::start_messages) once,
/// then calls [`next`](Self::next) in a loop while
/// [`has_next`](Self::has_next) holds.
pub trait MediaReader: Send + Sync {
    /// Stream properties, once known
    fn metadata(&self) -> Option<Arc<MetadataRecord>>;

    /// Messages that must be sent before anything returned by `next`
    fn start_messages(&self) -> Vec<TaggedMessage>;

    /// Next message in delivery order. Blocks while none is available;
    /// `None` means the wait was cancelled or the stream has ended.
    fn next(&self) -> Option<TaggedMessage>;

    fn has_next(&self) -> bool;

    /// Current position in milliseconds
    fn time_position(&self) -> u32;

    /// Move to `time_position` if supported; returns the resulting position
    fn seek(&self, time_position: u32) -> u32;

    fn close(&self);

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Hint for transports that batch messages into aggregates.
    /// Sources that cannot aggregate ignore it.
    fn set_aggregate_duration(&self, _target_duration: u32) {}
}
