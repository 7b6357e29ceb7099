//! Sound configuration byte

use crate::{AudioCodec, BitDepth, ChannelMode, SampleRate};

/// Pack the four audio parameters into the byte that prefixes every audio tag.
///
/// Bits 7-4 hold the codec, bits 3-2 the sample rate, bit 1 the sample size
/// and bit 0 the channel layout.
pub fn sound_byte(
    codec: AudioCodec,
    rate: SampleRate,
    depth: BitDepth,
    channels: ChannelMode,
) -> u8 {
    ((codec.id() & 0x0F) << 4)
        | ((rate.code() & 0x03) << 2)
        | (depth.flag() & 0x02)
        | (channels.flag() & 0x01)
}
