//! FFI (Foreign Function Interface) for C/Go interoperability
//!
//! A muxer handle returned by `rtmpmux_new` may be used from several threads
//! at once (producers and one consumer), exactly like `Arc<Muxer>` in Rust.

use crate::error::ErrorCode;
use crate::{
    AudioCodec, BitDepth, ChannelMode, Error, Muxer, MuxerOptions, SampleRate, VideoCodec,
};
use libc::{c_char, size_t};
use std::ffi::CString;
use std::ptr;
use std::slice;

/// FFI result structure
#[repr(C)]
pub struct FfiResult {
    pub code: ErrorCode,
    pub message: *mut c_char,
}

impl FfiResult {
    fn ok() -> Self {
        Self {
            code: ErrorCode::Ok,
            message: ptr::null_mut(),
        }
    }

    fn error(code: ErrorCode, message: &str) -> Self {
        let message = CString::new(message)
            .map(CString::into_raw)
            .unwrap_or(ptr::null_mut());
        Self { code, message }
    }

    fn from_result(result: crate::Result<()>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::error(ErrorCode::from(&e), &e.to_string()),
        }
    }
}

/// A dequeued message. `data` is owned by the caller until passed to
/// `rtmpmux_free_message`.
#[repr(C)]
pub struct FfiMessage {
    /// Tag type: 8 audio, 9 video, 18 metadata
    pub tag_type: u8,
    pub timestamp: u32,
    pub data: *mut u8,
    pub len: size_t,
}

/// Create a muxer. A `queue_capacity` of zero selects the default.
///
/// Returns null if the muxer cannot be created.
#[no_mangle]
pub extern "C" fn rtmpmux_new(queue_capacity: size_t) -> *mut Muxer {
    let options = if queue_capacity == 0 {
        MuxerOptions::default()
    } else {
        MuxerOptions { queue_capacity }
    };
    match Muxer::with_options(options, crate::H264IdrDetector) {
        Ok(muxer) => Box::into_raw(Box::new(muxer)),
        Err(_) => ptr::null_mut(),
    }
}

/// Destroy a muxer
///
/// # Safety
/// - `muxer` must come from `rtmpmux_new` and no other thread may still use it
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_free(muxer: *mut Muxer) {
    if !muxer.is_null() {
        drop(Box::from_raw(muxer));
    }
}

/// Set the frame dimensions announced in the metadata
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_set_dimensions(muxer: *const Muxer, width: u32, height: u32) {
    if let Some(muxer) = muxer.as_ref() {
        muxer.update_config(|c| {
            c.width = width;
            c.height = height;
        });
    }
}

/// Set the video codec by its numeric id
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_set_video_codec(muxer: *const Muxer, codec_id: u8) -> FfiResult {
    let Some(muxer) = muxer.as_ref() else {
        return FfiResult::error(ErrorCode::InvalidInput, "Muxer is null");
    };
    match VideoCodec::from_id(codec_id) {
        Some(codec) => {
            muxer.set_video_codec(codec);
            FfiResult::ok()
        }
        None => FfiResult::error(ErrorCode::InvalidInput, "Unknown video codec id"),
    }
}

/// Set the audio codec by its numeric id
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_set_audio_codec(muxer: *const Muxer, codec_id: u8) -> FfiResult {
    let Some(muxer) = muxer.as_ref() else {
        return FfiResult::error(ErrorCode::InvalidInput, "Muxer is null");
    };
    match AudioCodec::from_id(codec_id) {
        Some(codec) => {
            muxer.set_audio_codec(codec);
            FfiResult::ok()
        }
        None => FfiResult::error(ErrorCode::InvalidInput, "Unknown audio codec id"),
    }
}

/// Set the audio format: sample rate code (0-3), 16-bit samples, stereo
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_set_audio_format(
    muxer: *const Muxer,
    sample_rate_code: u8,
    sixteen_bit: bool,
    stereo: bool,
) -> FfiResult {
    let Some(muxer) = muxer.as_ref() else {
        return FfiResult::error(ErrorCode::InvalidInput, "Muxer is null");
    };
    let Some(rate) = SampleRate::from_code(sample_rate_code) else {
        return FfiResult::error(ErrorCode::InvalidInput, "Unknown sample rate code");
    };
    muxer.update_config(|c| {
        c.sample_rate = rate;
        c.bit_depth = if sixteen_bit {
            BitDepth::Bits16
        } else {
            BitDepth::Bits8
        };
        c.channel_mode = if stereo {
            ChannelMode::Stereo
        } else {
            ChannelMode::Mono
        };
    });
    FfiResult::ok()
}

/// Build the stream metadata
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_start(muxer: *const Muxer) {
    if let Some(muxer) = muxer.as_ref() {
        muxer.start();
    }
}

/// Queue an encoded video access unit
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
/// - `data` must point to `len` readable bytes (or be null with `len == 0`)
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_send_video(
    muxer: *const Muxer,
    timestamp: u32,
    data: *const u8,
    len: size_t,
) -> FfiResult {
    let Some(muxer) = muxer.as_ref() else {
        return FfiResult::error(ErrorCode::InvalidInput, "Muxer is null");
    };
    match sample_slice(data, len) {
        Ok(payload) => FfiResult::from_result(muxer.send_video(timestamp, payload, 0, len)),
        Err(e) => FfiResult::from_result(Err(e)),
    }
}

/// Queue an encoded audio frame
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
/// - `data` must point to `len` readable bytes (or be null with `len == 0`)
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_send_audio(
    muxer: *const Muxer,
    timestamp: u32,
    data: *const u8,
    len: size_t,
) -> FfiResult {
    let Some(muxer) = muxer.as_ref() else {
        return FfiResult::error(ErrorCode::InvalidInput, "Muxer is null");
    };
    match sample_slice(data, len) {
        Ok(payload) => FfiResult::from_result(muxer.send_audio(timestamp, payload, 0, len)),
        Err(e) => FfiResult::from_result(Err(e)),
    }
}

/// Copy the start message (metadata) into `out`.
///
/// Returns false if `start` has not been called.
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
/// - `out` must point to writable memory for one `FfiMessage`
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_start_message(muxer: *const Muxer, out: *mut FfiMessage) -> bool {
    let Some(muxer) = muxer.as_ref() else {
        return false;
    };
    if out.is_null() {
        return false;
    }
    match muxer.start_messages().into_iter().next() {
        Some(message) => {
            out.write(into_ffi_message(message));
            true
        }
        None => false,
    }
}

/// Block until the next message is available and move it into `out`.
///
/// Returns false if the wait was cancelled or the stream has ended.
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
/// - `out` must point to writable memory for one `FfiMessage`
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_next(muxer: *const Muxer, out: *mut FfiMessage) -> bool {
    let Some(muxer) = muxer.as_ref() else {
        return false;
    };
    if out.is_null() {
        return false;
    }
    match muxer.next() {
        Some(message) => {
            out.write(into_ffi_message(message));
            true
        }
        None => false,
    }
}

/// Wake a consumer blocked in `rtmpmux_next`
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_cancel(muxer: *const Muxer) {
    if let Some(muxer) = muxer.as_ref() {
        muxer.cancel_handle().cancel();
    }
}

/// Timestamp of the last accepted sample
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_time_position(muxer: *const Muxer) -> u32 {
    muxer.as_ref().map_or(0, Muxer::time_position)
}

/// Reject further samples
///
/// # Safety
/// - `muxer` must be a live handle from `rtmpmux_new`
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_close(muxer: *const Muxer) {
    if let Some(muxer) = muxer.as_ref() {
        muxer.close();
    }
}

/// Release the data of a message filled by `rtmpmux_next`
///
/// # Safety
/// - `message` must point to an `FfiMessage` filled by this library
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_free_message(message: *mut FfiMessage) {
    if message.is_null() {
        return;
    }

    let message = &mut *message;
    if !message.data.is_null() {
        let data = ptr::slice_from_raw_parts_mut(message.data, message.len);
        drop(Box::from_raw(data));
        message.data = ptr::null_mut();
        message.len = 0;
    }
}

/// Free a result's message string
///
/// # Safety
/// - `result` must point to a valid `FfiResult` that was returned by an rtmpmux function
#[no_mangle]
pub unsafe extern "C" fn rtmpmux_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }

    let result = &mut *result;
    if !result.message.is_null() {
        // Reclaim the CString and let it drop
        let _ = CString::from_raw(result.message);
        result.message = ptr::null_mut();
    }
}

/// Get version string
#[no_mangle]
pub extern "C" fn rtmpmux_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

unsafe fn sample_slice<'a>(data: *const u8, len: size_t) -> crate::Result<&'a [u8]> {
    if len == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(Error::InvalidInput("Sample data is null".to_string()));
    }
    Ok(slice::from_raw_parts(data, len))
}

fn into_ffi_message(message: crate::TaggedMessage) -> FfiMessage {
    let tag_type = message.kind().tag_type();
    let timestamp = message.timestamp();
    let data: Box<[u8]> = message.into_body().to_vec().into_boxed_slice();
    let len = data.len();
    FfiMessage {
        tag_type,
        timestamp,
        data: Box::into_raw(data) as *mut u8,
        len,
    }
}
