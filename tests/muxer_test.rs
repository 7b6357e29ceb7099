//! Integration tests for the muxer's producer and consumer paths

mod common;

use common::*;
use rtmpmux::tag::MessageKind;
use rtmpmux::{
    AudioCodec, BitDepth, ChannelMode, Error, MediaReader, Muxer, MuxerOptions, SampleRate,
    StreamKind, VideoCodec,
};

#[test]
fn test_metadata_reflects_configuration() {
    let muxer = configured_muxer();
    muxer.start();

    let metadata = muxer.metadata().expect("metadata after start");
    assert_eq!(metadata.width(), 1280);
    assert_eq!(metadata.height(), 720);
    assert_eq!(metadata.video_codec_id(), Some(7));
    assert_eq!(metadata.audio_codec_id(), Some(10));

    let start = muxer.start_messages();
    assert_eq!(start.len(), 1);
    assert_eq!(start[0].kind(), MessageKind::Metadata);
    assert_eq!(start[0].body(), &metadata.encode_amf0());
}

#[test]
fn test_metadata_omits_unset_codecs() {
    let muxer = Muxer::new();
    muxer.set_width(320);
    muxer.set_height(240);
    muxer.set_video_codec(VideoCodec::SorensonH263);
    muxer.start();

    let metadata = muxer.metadata().unwrap();
    assert_eq!(metadata.video_codec_id(), Some(2));
    assert_eq!(metadata.audio_codec_id(), None);
    assert_eq!(metadata.get("audiocodecid"), None);
}

#[test]
fn test_video_tag_sizes() {
    let muxer = configured_muxer();
    for len in [0usize, 1, 5, 1000, 65_536] {
        let payload = vec![0x11; len];
        muxer.send_video(0, &payload, 0, len).unwrap();
        let msg = muxer.next().unwrap();
        let fields = parse_tag(msg.body());

        assert_eq!(fields.tag_type, 9);
        assert_eq!(fields.data_size as usize, len);
        assert_eq!(fields.trailer as usize, len + 16);
        assert_eq!(fields.stream_id, 0);
        assert_eq!(msg.body().len(), len + 20);
    }
}

#[test]
fn test_audio_tag_sizes() {
    let muxer = configured_muxer();
    for len in [0usize, 1, 7, 1024] {
        let payload = vec![0x22; len];
        muxer.send_audio(0, &payload, 0, len).unwrap();
        let msg = muxer.next().unwrap();
        let fields = parse_tag(msg.body());

        assert_eq!(fields.tag_type, 8);
        assert_eq!(fields.data_size as usize, len);
        assert_eq!(fields.trailer as usize, len + 12);
        assert_eq!(msg.body().len(), len + 16);
    }
}

#[test]
fn test_timestamp_split() {
    let muxer = configured_muxer();
    let timestamp = 0xDEAD_BEEF;
    muxer.send_audio(timestamp, &[0], 0, 1).unwrap();

    let msg = muxer.next().unwrap();
    assert_eq!(msg.timestamp(), timestamp);
    let body = msg.body();
    assert_eq!(&body[4..7], &[0xAD, 0xBE, 0xEF]);
    assert_eq!(body[7], 0xDE);
    assert_eq!(parse_tag(body).timestamp, timestamp);
}

#[test]
fn test_frame_type_from_keyframe_detection() {
    let muxer = configured_muxer();
    let idr = idr_access_unit(32);
    let inter = inter_access_unit(32);

    muxer.send_video(0, &idr, 0, idr.len()).unwrap();
    muxer.send_video(33, &inter, 0, inter.len()).unwrap();

    assert_eq!(muxer.next().unwrap().body()[11], 0x17);
    assert_eq!(muxer.next().unwrap().body()[11], 0x27);
}

#[test]
fn test_injected_keyframe_oracle() {
    let options = MuxerOptions::default();
    let muxer = Muxer::with_options(options, |au: &[u8]| au.first() == Some(&0xFF)).unwrap();
    muxer.set_video_codec(VideoCodec::On2Vp6);

    muxer.send_video(0, &[0xFF, 0x00], 0, 2).unwrap();
    muxer.send_video(0, &[0x00, 0xFF], 0, 2).unwrap();

    assert_eq!(muxer.next().unwrap().body()[11], 0x14);
    assert_eq!(muxer.next().unwrap().body()[11], 0x24);
}

#[test]
fn test_sound_byte_tracks_setters() {
    let muxer = configured_muxer();

    muxer.send_audio(0, &[0], 0, 1).unwrap();
    assert_eq!(muxer.next().unwrap().body()[11], 0xAF);

    muxer.set_channel_mode(ChannelMode::Mono);
    muxer.send_audio(0, &[0], 0, 1).unwrap();
    assert_eq!(muxer.next().unwrap().body()[11], 0xAE);

    muxer.set_bit_depth(BitDepth::Bits8);
    muxer.set_sample_rate(SampleRate::Khz11);
    muxer.send_audio(0, &[0], 0, 1).unwrap();
    assert_eq!(muxer.next().unwrap().body()[11], 0xA4);

    muxer.set_audio_codec(AudioCodec::Speex);
    muxer.send_audio(0, &[0], 0, 1).unwrap();
    assert_eq!(muxer.next().unwrap().body()[11], 0xB4);
}

#[test]
fn test_fifo_across_interleaved_streams() {
    let muxer = configured_muxer();
    let mut expected = Vec::new();
    for i in 0..20u32 {
        if i % 3 == 0 {
            muxer.send_video(i, &inter_access_unit(8), 0, 8).unwrap();
            expected.push((MessageKind::Video, i));
        } else {
            muxer.send_audio(i, &[i as u8], 0, 1).unwrap();
            expected.push((MessageKind::Audio, i));
        }
    }

    let received: Vec<_> = (0..20)
        .map(|_| {
            let msg = muxer.next().unwrap();
            (msg.kind(), msg.timestamp())
        })
        .collect();
    assert_eq!(received, expected);
}

#[test]
fn test_closed_muxer_rejects_samples() {
    let muxer = configured_muxer();
    muxer.send_audio(100, &[1], 0, 1).unwrap();
    muxer.close();

    assert_eq!(muxer.send_audio(200, &[1], 0, 1), Err(Error::StreamClosed));
    assert_eq!(muxer.send_video(300, &[1], 0, 1), Err(Error::StreamClosed));
    assert_eq!(muxer.time_position(), 100);
    assert_eq!(muxer.pending(), 1);

    // Already queued messages still drain
    assert_eq!(muxer.next().unwrap().timestamp(), 100);
    assert!(!muxer.has_next());
}

#[test]
fn test_missing_codec_rejects_samples() {
    let muxer = Muxer::new();
    assert_eq!(
        muxer.send_audio(10, &[1], 0, 1),
        Err(Error::CodecNotConfigured(StreamKind::Audio))
    );
    assert_eq!(
        muxer.send_video(10, &[1], 0, 1),
        Err(Error::CodecNotConfigured(StreamKind::Video))
    );
    assert_eq!(muxer.pending(), 0);
    assert_eq!(muxer.time_position(), 0);

    muxer.set_audio_codec(AudioCodec::Mp3);
    assert!(muxer.send_audio(10, &[1], 0, 1).is_ok());
    assert_eq!(
        muxer.send_video(10, &[1], 0, 1),
        Err(Error::CodecNotConfigured(StreamKind::Video))
    );
}

#[test]
fn test_queue_saturation_reported_when_full() {
    let options = MuxerOptions { queue_capacity: 3 };
    let muxer = Muxer::with_options(options, rtmpmux::H264IdrDetector).unwrap();
    muxer.set_audio_codec(AudioCodec::Aac);

    for ts in 0..3 {
        assert!(muxer.send_audio(ts, &[0], 0, 1).is_ok());
    }
    assert_eq!(
        muxer.send_audio(3, &[0], 0, 1),
        Err(Error::QueueSaturated { capacity: 3 })
    );
    assert_eq!(muxer.pending(), 3);

    assert_eq!(muxer.next().unwrap().timestamp(), 0);
    assert!(muxer.send_audio(4, &[0], 0, 1).is_ok());
    let rest: Vec<_> = (0..3).map(|_| muxer.next().unwrap().timestamp()).collect();
    assert_eq!(rest, [1, 2, 4]);
}

#[test]
fn test_default_capacity_is_one_hundred() {
    let muxer = configured_muxer();
    assert_eq!(muxer.queue_capacity(), 100);
    for ts in 0..100 {
        muxer.send_audio(ts, &[0], 0, 1).unwrap();
    }
    assert!(matches!(
        muxer.send_audio(100, &[0], 0, 1),
        Err(Error::QueueSaturated { .. })
    ));
}

#[test]
fn test_seek_reports_position() {
    let muxer = configured_muxer();
    assert_eq!(muxer.seek(5000), 0);
    muxer.send_audio(1234, &[0], 0, 1).unwrap();
    for t in [0, 1, 1234, u32::MAX] {
        assert_eq!(muxer.seek(t), 1234);
        assert_eq!(muxer.time_position(), 1234);
    }
    assert_eq!(muxer.pending(), 1);
}

#[test]
fn test_reader_trait_object() {
    let muxer = configured_muxer();
    muxer.start();
    muxer.send_video(0, &idr_access_unit(16), 0, 16).unwrap();

    let reader: &dyn MediaReader = &muxer;
    reader.set_aggregate_duration(500);
    assert_eq!(reader.width(), 1280);
    assert_eq!(reader.height(), 720);
    assert_eq!(reader.start_messages().len(), 1);
    assert!(reader.has_next());
    assert_eq!(reader.next().unwrap().kind(), MessageKind::Video);
    reader.close();
    assert!(!reader.has_next());
}
