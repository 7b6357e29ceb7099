//! Common test utilities

#![allow(dead_code)]

use rtmpmux::{AudioCodec, Muxer, VideoCodec};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route library logs to the test output (`RUST_LOG=rtmpmux=trace`)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A muxer with H.264 video and AAC audio configured
pub fn configured_muxer() -> Muxer {
    init_tracing();
    let muxer = Muxer::new();
    muxer.set_width(1280);
    muxer.set_height(720);
    muxer.set_video_codec(VideoCodec::Avc);
    muxer.set_audio_codec(AudioCodec::Aac);
    muxer
}

/// Annex B access unit holding an IDR slice
pub fn idr_access_unit(len: usize) -> Vec<u8> {
    let mut au = vec![0, 0, 0, 1, 0x65];
    au.resize(len.max(au.len()), 0xAB);
    au
}

/// Annex B access unit holding a non-IDR slice
pub fn inter_access_unit(len: usize) -> Vec<u8> {
    let mut au = vec![0, 0, 0, 1, 0x41];
    au.resize(len.max(au.len()), 0xCD);
    au
}

/// Parsed view of a tag's fixed fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFields {
    pub tag_type: u8,
    pub data_size: u32,
    pub timestamp: u32,
    pub stream_id: u32,
    pub trailer: u32,
}

pub fn parse_tag(bytes: &[u8]) -> TagFields {
    let be24 = |b: &[u8]| (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]);
    let n = bytes.len();
    TagFields {
        tag_type: bytes[0],
        data_size: be24(&bytes[1..4]),
        timestamp: be24(&bytes[4..7]) | (u32::from(bytes[7]) << 24),
        stream_id: be24(&bytes[8..11]),
        trailer: u32::from_be_bytes([bytes[n - 4], bytes[n - 3], bytes[n - 2], bytes[n - 1]]),
    }
}
