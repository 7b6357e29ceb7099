//! rtmpmux - Real-time audio/video tag muxer
//!
//! Encoded audio and video samples are wrapped into FLV-style tags and
//! handed to a single consumer (usually an RTMP transport) through a
//! bounded FIFO queue:
//! - `Muxer::send_video` / `Muxer::send_audio`: producer side, never blocks
//! - `Muxer::next`: consumer side, blocks until a tag is available

pub mod error;
pub mod ffi;
pub mod keyframe;
pub mod metadata;
pub mod muxer;
pub mod queue;
pub mod reader;
pub mod tag;

pub use error::{Error, Result};
pub use keyframe::{H264IdrDetector, KeyframeDetector};
pub use metadata::MetadataRecord;
pub use muxer::{Muxer, MuxerOptions, StreamConfig};
pub use queue::CancelHandle;
pub use reader::MediaReader;
pub use tag::{MessageKind, TaggedMessage};

use std::fmt;

/// Which elementary stream a call refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Audio,
    Video,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Audio => f.write_str("audio"),
            StreamKind::Video => f.write_str("video"),
        }
    }
}

/// Video codec identifiers (low nibble of the video tag header)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VideoCodec {
    Jpeg = 1,
    SorensonH263 = 2,
    ScreenVideo = 3,
    On2Vp6 = 4,
    On2Vp6Alpha = 5,
    ScreenVideo2 = 6,
    /// H.264
    Avc = 7,
}

impl VideoCodec {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(VideoCodec::Jpeg),
            2 => Some(VideoCodec::SorensonH263),
            3 => Some(VideoCodec::ScreenVideo),
            4 => Some(VideoCodec::On2Vp6),
            5 => Some(VideoCodec::On2Vp6Alpha),
            6 => Some(VideoCodec::ScreenVideo2),
            7 => Some(VideoCodec::Avc),
            _ => None,
        }
    }
}

/// Audio codec identifiers (high nibble of the sound byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AudioCodec {
    Pcm = 0,
    Adpcm = 1,
    Mp3 = 2,
    PcmLittleEndian = 3,
    Nellymoser16kMono = 4,
    Nellymoser8kMono = 5,
    Nellymoser = 6,
    G711ALaw = 7,
    G711MuLaw = 8,
    Aac = 10,
    Speex = 11,
    Mp3_8k = 14,
    DeviceSpecific = 15,
}

impl AudioCodec {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(AudioCodec::Pcm),
            1 => Some(AudioCodec::Adpcm),
            2 => Some(AudioCodec::Mp3),
            3 => Some(AudioCodec::PcmLittleEndian),
            4 => Some(AudioCodec::Nellymoser16kMono),
            5 => Some(AudioCodec::Nellymoser8kMono),
            6 => Some(AudioCodec::Nellymoser),
            7 => Some(AudioCodec::G711ALaw),
            8 => Some(AudioCodec::G711MuLaw),
            10 => Some(AudioCodec::Aac),
            11 => Some(AudioCodec::Speex),
            14 => Some(AudioCodec::Mp3_8k),
            15 => Some(AudioCodec::DeviceSpecific),
            _ => None,
        }
    }
}

/// Audio sample rate codes (2 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SampleRate {
    Khz5_5 = 0,
    Khz11 = 1,
    Khz22 = 2,
    #[default]
    Khz44 = 3,
}

impl SampleRate {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SampleRate::Khz5_5),
            1 => Some(SampleRate::Khz11),
            2 => Some(SampleRate::Khz22),
            3 => Some(SampleRate::Khz44),
            _ => None,
        }
    }
}

/// Audio sample size, already shifted into bit 1 of the sound byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BitDepth {
    Bits8 = 0b00,
    #[default]
    Bits16 = 0b10,
}

impl BitDepth {
    pub fn flag(self) -> u8 {
        self as u8
    }
}

/// Audio channel layout, bit 0 of the sound byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ChannelMode {
    Mono = 0,
    #[default]
    Stereo = 1,
}

impl ChannelMode {
    pub fn flag(self) -> u8 {
        self as u8
    }
}
