//! Stream configuration

use crate::tag::sound_byte;
use crate::{AudioCodec, BitDepth, ChannelMode, SampleRate, VideoCodec};

/// Properties of the outgoing stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Video codec; video samples are rejected while unset
    pub video_codec: Option<VideoCodec>,
    /// Audio codec; audio samples are rejected while unset
    pub audio_codec: Option<AudioCodec>,
    pub sample_rate: SampleRate,
    pub bit_depth: BitDepth,
    pub channel_mode: ChannelMode,
}

impl StreamConfig {
    /// Sound byte for the current audio parameters, if an audio codec is set
    pub fn sound_byte(&self) -> Option<u8> {
        self.audio_codec
            .map(|codec| sound_byte(codec, self.sample_rate, self.bit_depth, self.channel_mode))
    }
}
