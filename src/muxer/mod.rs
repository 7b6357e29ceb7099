//! Real-time audio/video muxer

mod config;

pub use config::StreamConfig;

use crate::error::{Error, Result};
use crate::keyframe::{H264IdrDetector, KeyframeDetector};
use crate::metadata::MetadataRecord;
use crate::queue::{CancelHandle, MessageQueue};
use crate::reader::MediaReader;
use crate::tag::{audio_tag, video_tag, FrameType, TaggedMessage, MAX_DATA_SIZE};
use crate::{AudioCodec, BitDepth, ChannelMode, SampleRate, StreamKind, VideoCodec};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Default number of messages the queue holds before producers are refused
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Options for constructing a muxer
#[derive(Debug, Clone)]
pub struct MuxerOptions {
    /// Maximum number of undelivered messages
    pub queue_capacity: usize,
}

impl Default for MuxerOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl MuxerOptions {
    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(Error::InvalidInput(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

struct State {
    config: StreamConfig,
    closed: bool,
}

/// Turns encoded samples into tagged messages and queues them for a single
/// consumer.
///
/// All methods take `&self`; share the muxer between the encoder threads
/// and the transport with an `Arc`.
pub struct Muxer {
    // Producers hold the read guard for a whole send, so configuration
    // changes and `close` never interleave with a tag build.
    state: RwLock<State>,
    metadata: RwLock<Option<Arc<MetadataRecord>>>,
    last_time: AtomicU32,
    queue: MessageQueue,
    detector: Box<dyn KeyframeDetector>,
}

impl Default for Muxer {
    fn default() -> Self {
        Self::new()
    }
}

impl Muxer {
    /// Muxer with default options and H.264 keyframe detection
    pub fn new() -> Self {
        Self::build(MuxerOptions::default(), Box::new(H264IdrDetector))
    }

    /// Muxer with explicit options and keyframe oracle
    pub fn with_options<D>(options: MuxerOptions, detector: D) -> Result<Self>
    where
        D: KeyframeDetector + 'static,
    {
        options.validate()?;
        Ok(Self::build(options, Box::new(detector)))
    }

    fn build(options: MuxerOptions, detector: Box<dyn KeyframeDetector>) -> Self {
        Self {
            state: RwLock::new(State {
                config: StreamConfig::default(),
                closed: false,
            }),
            metadata: RwLock::new(None),
            last_time: AtomicU32::new(0),
            queue: MessageQueue::new(options.queue_capacity),
            detector,
        }
    }

    /// Build the metadata record from the current configuration.
    ///
    /// Call once, after configuration and before the consumer starts
    /// pulling. A later call replaces the record.
    pub fn start(&self) {
        let record = MetadataRecord::from_config(&self.state.read().config);
        debug!(
            width = record.width(),
            height = record.height(),
            audio_codec = ?record.audio_codec_id(),
            video_codec = ?record.video_codec_id(),
            "Built stream metadata"
        );
        *self.metadata.write() = Some(Arc::new(record));
    }

    /// Queue one encoded video access unit taken from
    /// `buffer[offset..offset + length]`.
    pub fn send_video(
        &self,
        timestamp: u32,
        buffer: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<()> {
        let state = self.state.read();
        if state.closed {
            return Err(Error::StreamClosed);
        }
        let codec = state
            .config
            .video_codec
            .ok_or(Error::CodecNotConfigured(StreamKind::Video))?;
        let payload = payload_slice(buffer, offset, length)?;

        self.last_time.store(timestamp, Ordering::Release);

        let frame_type = if self.detector.is_random_access(payload) {
            FrameType::Key
        } else {
            FrameType::Inter
        };
        let message = video_tag(timestamp, frame_type, codec.id(), payload);
        trace!(timestamp, length, ?frame_type, "Queueing video tag");

        self.queue.offer(message)
    }

    /// Queue one encoded audio frame taken from
    /// `buffer[offset..offset + length]`.
    pub fn send_audio(
        &self,
        timestamp: u32,
        buffer: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<()> {
        let state = self.state.read();
        if state.closed {
            return Err(Error::StreamClosed);
        }
        let sound_byte = state
            .config
            .sound_byte()
            .ok_or(Error::CodecNotConfigured(StreamKind::Audio))?;
        let payload = payload_slice(buffer, offset, length)?;

        self.last_time.store(timestamp, Ordering::Release);

        let message = audio_tag(timestamp, sound_byte, payload);
        trace!(timestamp, length, sound_byte, "Queueing audio tag");

        self.queue.offer(message)
    }

    /// Block until the next message is available.
    ///
    /// Returns `None` if the wait is cancelled through a [`CancelHandle`],
    /// or immediately once the muxer is closed and fully drained.
    pub fn next(&self) -> Option<TaggedMessage> {
        if let Some(message) = self.queue.try_take() {
            return Some(message);
        }
        if self.is_closed() {
            return None;
        }
        self.queue.take()
    }

    /// Like [`next`](Self::next), giving up after `timeout`
    pub fn next_timeout(&self, timeout: Duration) -> Option<TaggedMessage> {
        if let Some(message) = self.queue.try_take() {
            return Some(message);
        }
        if self.is_closed() {
            return None;
        }
        self.queue.take_timeout(timeout)
    }

    /// Handle for waking a consumer blocked in `next`
    pub fn cancel_handle(&self) -> CancelHandle {
        self.queue.cancel_handle()
    }

    /// The metadata record built by `start`
    pub fn metadata(&self) -> Option<Arc<MetadataRecord>> {
        self.metadata.read().clone()
    }

    /// Messages the transport must send before any `next` message
    pub fn start_messages(&self) -> Vec<TaggedMessage> {
        self.metadata
            .read()
            .iter()
            .map(|record| record.to_message())
            .collect()
    }

    /// Timestamp of the last accepted producer call
    pub fn time_position(&self) -> u32 {
        self.last_time.load(Ordering::Acquire)
    }

    /// Live sources cannot seek; reports the current position
    pub fn seek(&self, _time_position: u32) -> u32 {
        self.time_position()
    }

    /// Reject further samples. Queued messages stay available to `next`.
    pub fn close(&self) {
        let mut state = self.state.write();
        if !state.closed {
            state.closed = true;
            info!(pending = self.queue.len(), "Muxer closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    /// False only once the muxer is closed and every message was delivered
    pub fn has_next(&self) -> bool {
        !(self.is_closed() && self.queue.is_empty())
    }

    /// Number of messages waiting for the consumer
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> StreamConfig {
        self.state.read().config.clone()
    }

    /// Apply several configuration changes atomically
    pub fn update_config<F>(&self, f: F)
    where
        F: FnOnce(&mut StreamConfig),
    {
        let mut state = self.state.write();
        f(&mut state.config);
        debug!(config = ?state.config, "Stream configuration updated");
    }

    pub fn width(&self) -> u32 {
        self.state.read().config.width
    }

    pub fn set_width(&self, width: u32) {
        self.update_config(|c| c.width = width);
    }

    pub fn height(&self) -> u32 {
        self.state.read().config.height
    }

    pub fn set_height(&self, height: u32) {
        self.update_config(|c| c.height = height);
    }

    pub fn video_codec(&self) -> Option<VideoCodec> {
        self.state.read().config.video_codec
    }

    pub fn set_video_codec(&self, codec: VideoCodec) {
        self.update_config(|c| c.video_codec = Some(codec));
    }

    pub fn audio_codec(&self) -> Option<AudioCodec> {
        self.state.read().config.audio_codec
    }

    pub fn set_audio_codec(&self, codec: AudioCodec) {
        self.update_config(|c| c.audio_codec = Some(codec));
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.state.read().config.sample_rate
    }

    pub fn set_sample_rate(&self, rate: SampleRate) {
        self.update_config(|c| c.sample_rate = rate);
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.state.read().config.bit_depth
    }

    pub fn set_bit_depth(&self, depth: BitDepth) {
        self.update_config(|c| c.bit_depth = depth);
    }

    pub fn channel_mode(&self) -> ChannelMode {
        self.state.read().config.channel_mode
    }

    pub fn set_channel_mode(&self, mode: ChannelMode) {
        self.update_config(|c| c.channel_mode = mode);
    }

    /// Current sound byte, if an audio codec is configured
    pub fn sound_byte(&self) -> Option<u8> {
        self.state.read().config.sound_byte()
    }
}

impl MediaReader for Muxer {
    fn metadata(&self) -> Option<Arc<MetadataRecord>> {
        Muxer::metadata(self)
    }

    fn start_messages(&self) -> Vec<TaggedMessage> {
        Muxer::start_messages(self)
    }

    fn next(&self) -> Option<TaggedMessage> {
        Muxer::next(self)
    }

    fn has_next(&self) -> bool {
        Muxer::has_next(self)
    }

    fn time_position(&self) -> u32 {
        Muxer::time_position(self)
    }

    fn seek(&self, time_position: u32) -> u32 {
        Muxer::seek(self, time_position)
    }

    fn close(&self) {
        Muxer::close(self)
    }

    fn width(&self) -> u32 {
        Muxer::width(self)
    }

    fn height(&self) -> u32 {
        Muxer::height(self)
    }
}

fn payload_slice(buffer: &[u8], offset: usize, length: usize) -> Result<&[u8]> {
    if length > MAX_DATA_SIZE {
        return Err(Error::InvalidInput(format!(
            "payload of {} bytes exceeds tag limit of {} bytes",
            length, MAX_DATA_SIZE
        )));
    }
    offset
        .checked_add(length)
        .and_then(|end| buffer.get(offset..end))
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "range {}..{}+{} outside buffer of {} bytes",
                offset,
                offset,
                length,
                buffer.len()
            ))
        })
}
