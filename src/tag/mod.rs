//! Tag construction
//!
//! Every audio and video sample becomes one self-contained tag:
//!
//! ```text
//! type(1) size(3) ts-low(3) ts-high(1) stream-id(3) sub-header payload prev-tag-size(4)
//! ```
//!
//! The size field carries the payload length only. The trailer carries the
//! header plus body length so readers can walk the stream backwards.

pub mod sound;

pub use sound::sound_byte;

use bytes::{BufMut, Bytes, BytesMut};

/// Length of the common tag header
pub const TAG_HEADER_LEN: usize = 11;

/// Length of the previous-tag-size trailer
pub const TRAILER_LEN: usize = 4;

/// Video sub-header: frame/codec byte plus packet type and composition time
pub const VIDEO_SUB_HEADER_LEN: usize = 5;

/// Audio sub-header: the sound byte
pub const AUDIO_SUB_HEADER_LEN: usize = 1;

/// Largest payload the 24-bit size field can describe
pub const MAX_DATA_SIZE: usize = 0x00FF_FFFF;

/// Kind of message flowing from the muxer to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Audio,
    Video,
    Metadata,
}

impl MessageKind {
    /// Tag type marker written as the first byte of a tag
    pub fn tag_type(self) -> u8 {
        match self {
            MessageKind::Audio => 8,
            MessageKind::Video => 9,
            MessageKind::Metadata => 18,
        }
    }
}

/// Video frame type (high nibble of the frame/codec byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    Key = 1,
    Inter = 2,
}

impl FrameType {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// A fully formed message, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedMessage {
    kind: MessageKind,
    timestamp: u32,
    body: Bytes,
}

impl TaggedMessage {
    pub fn new(kind: MessageKind, timestamp: u32, body: Bytes) -> Self {
        Self {
            kind,
            timestamp,
            body,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Presentation time in milliseconds
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Wire bytes. For audio and video this is the complete tag including
    /// the trailer; for metadata it is the AMF0 body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// Build a video tag around `payload`.
///
/// The caller guarantees `payload.len() <= MAX_DATA_SIZE`.
pub fn video_tag(
    timestamp: u32,
    frame_type: FrameType,
    codec_id: u8,
    payload: &[u8],
) -> TaggedMessage {
    let body_len = VIDEO_SUB_HEADER_LEN + payload.len();
    let mut out = BytesMut::with_capacity(TAG_HEADER_LEN + body_len + TRAILER_LEN);

    put_header(&mut out, MessageKind::Video, payload.len(), timestamp);
    out.put_u8((frame_type.value() << 4) | (codec_id & 0x0F));
    // AVC packet type and composition time offset
    out.put_u32(0);
    out.put_slice(payload);
    out.put_u32((TAG_HEADER_LEN + body_len) as u32);

    TaggedMessage::new(MessageKind::Video, timestamp, out.freeze())
}

/// Build an audio tag around `payload`.
///
/// The caller guarantees `payload.len() <= MAX_DATA_SIZE`.
pub fn audio_tag(timestamp: u32, sound_byte: u8, payload: &[u8]) -> TaggedMessage {
    let body_len = AUDIO_SUB_HEADER_LEN + payload.len();
    let mut out = BytesMut::with_capacity(TAG_HEADER_LEN + body_len + TRAILER_LEN);

    put_header(&mut out, MessageKind::Audio, payload.len(), timestamp);
    out.put_u8(sound_byte);
    out.put_slice(payload);
    out.put_u32((TAG_HEADER_LEN + body_len) as u32);

    TaggedMessage::new(MessageKind::Audio, timestamp, out.freeze())
}

fn put_header(out: &mut BytesMut, kind: MessageKind, data_size: usize, timestamp: u32) {
    out.put_u8(kind.tag_type());
    out.put_uint(data_size as u64, 3);
    out.put_uint(u64::from(timestamp & 0x00FF_FFFF), 3);
    // Timestamp extension: bits 24-31
    out.put_u8((timestamp >> 24) as u8);
    // Stream ID
    out.put_uint(0, 3);
}
