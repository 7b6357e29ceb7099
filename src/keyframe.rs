//! Keyframe detection
//!
//! The muxer does not parse video bitstreams itself. It asks a
//! [`KeyframeDetector`] whether an access unit is a random-access point and
//! sets the frame-type nibble from the answer.

/// NAL unit type of an IDR slice
pub const NAL_TYPE_IDR: u8 = 5;

/// Oracle answering "can decoding start at this access unit?"
pub trait KeyframeDetector: Send + Sync {
    fn is_random_access(&self, access_unit: &[u8]) -> bool;
}

impl<F> KeyframeDetector for F
where
    F: Fn(&[u8]) -> bool + Send + Sync,
{
    fn is_random_access(&self, access_unit: &[u8]) -> bool {
        self(access_unit)
    }
}

/// Detects IDR slices in H.264 Annex B access units.
///
/// Both 3-byte and 4-byte start codes are recognised. A buffer without any
/// start code is treated as a single bare NAL unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct H264IdrDetector;

impl KeyframeDetector for H264IdrDetector {
    fn is_random_access(&self, access_unit: &[u8]) -> bool {
        let mut headers = nal_headers(access_unit).peekable();
        if headers.peek().is_none() {
            return access_unit
                .first()
                .is_some_and(|header| header & 0x1F == NAL_TYPE_IDR);
        }
        headers.any(|header| header & 0x1F == NAL_TYPE_IDR)
    }
}

/// Header bytes of every NAL unit following a start code
fn nal_headers(data: &[u8]) -> impl Iterator<Item = u8> + '_ {
    data.windows(4)
        .filter(|w| w[0] == 0 && w[1] == 0 && w[2] == 1)
        .map(|w| w[3])
}
