//! Stream metadata (`onMetaData`)

use crate::muxer::StreamConfig;
use crate::tag::{MessageKind, TaggedMessage};
use bytes::{BufMut, Bytes, BytesMut};

/// Name of the script-data record carrying stream properties
pub const METADATA_NAME: &str = "onMetaData";

/// AMF0 type markers
mod markers {
    pub const NUMBER: u8 = 0x00;
    pub const STRING: u8 = 0x02;
    pub const ECMA_ARRAY: u8 = 0x08;
    pub const OBJECT_END: u8 = 0x09;
}

/// Stream properties announced once before any media tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    width: u32,
    height: u32,
    audio_codec_id: Option<u8>,
    video_codec_id: Option<u8>,
}

impl MetadataRecord {
    /// Snapshot the properties of `config`. Codec ids are only present when
    /// the corresponding codec has been configured.
    pub fn from_config(config: &StreamConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            audio_codec_id: config.audio_codec.map(|c| c.id()),
            video_codec_id: config.video_codec.map(|c| c.id()),
        }
    }

    pub fn name(&self) -> &'static str {
        METADATA_NAME
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn audio_codec_id(&self) -> Option<u8> {
        self.audio_codec_id
    }

    pub fn video_codec_id(&self) -> Option<u8> {
        self.video_codec_id
    }

    /// Key/value pairs in announcement order
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut entries = vec![
            ("width", f64::from(self.width)),
            ("height", f64::from(self.height)),
        ];
        if let Some(id) = self.audio_codec_id {
            entries.push(("audiocodecid", f64::from(id)));
        }
        if let Some(id) = self.video_codec_id {
            entries.push(("videocodecid", f64::from(id)));
        }
        entries
    }

    /// Look up a single value by key
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Encode as an AMF0 script-data body: the record name followed by an
    /// ECMA array of numbers.
    pub fn encode_amf0(&self) -> Bytes {
        let entries = self.entries();
        let mut out = BytesMut::with_capacity(64);

        out.put_u8(markers::STRING);
        put_amf_key(&mut out, METADATA_NAME);

        out.put_u8(markers::ECMA_ARRAY);
        out.put_u32(entries.len() as u32);
        for (key, value) in entries {
            put_amf_key(&mut out, key);
            out.put_u8(markers::NUMBER);
            out.put_f64(value);
        }
        out.put_slice(&[0x00, 0x00, markers::OBJECT_END]);

        out.freeze()
    }

    /// Wrap the record in a message for the transport
    pub fn to_message(&self) -> TaggedMessage {
        TaggedMessage::new(MessageKind::Metadata, 0, self.encode_amf0())
    }
}

fn put_amf_key(out: &mut BytesMut, key: &str) {
    out.put_u16(key.len() as u16);
    out.put_slice(key.as_bytes());
}
