//! Media decoding
//!
//! Images decode in-process with the `image` crate. Videos go through the
//! [`VideoDecoder`] collaborator, which yields a [`VideoClip`] able to probe
//! its frame count and decode individual frames into memory.
//!
//! Every decode failure is an input-validation error: it aborts the request
//! before any provider is contacted.

pub mod ffmpeg;
pub mod frame_sampler;

pub use ffmpeg::FfmpegDecoder;
pub use frame_sampler::{
    effective_duration, frames_for_duration, representative_frames, select_frames,
};

use crate::error::AnalysisError;
use crate::types::FrameSample;
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

/// JPEG quality used when re-encoding frames for the AI provider
const JPEG_QUALITY: u8 = 85;

/// Longest side of a frame sent to the AI provider
const MAX_FRAME_SIDE: u32 = 1024;

/// Encoded image handed to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFrame {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl MediaFrame {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn jpeg(data: Vec<u8>) -> Self {
        Self::new("image/jpeg", data)
    }
}

/// Stream metadata of an opened video
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProbe {
    pub total_frames: u64,
    pub fps: f64,
    pub duration_secs: f64,
}

/// Opened video; temporary resources are released on drop
#[async_trait]
pub trait VideoClip: Send + Sync {
    fn probe(&self) -> VideoProbe;

    /// Decode the frame at `sample`
    async fn frame(&self, sample: &FrameSample) -> Result<DynamicImage, AnalysisError>;
}

/// Media-decode collaborator for videos
#[async_trait]
pub trait VideoDecoder: Send + Sync {
    /// Open uploaded video bytes; unreadable input is a validation error
    async fn open(&self, bytes: &[u8]) -> Result<Box<dyn VideoClip>, AnalysisError>;
}

/// Decode image bytes
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, AnalysisError> {
    if bytes.is_empty() {
        return Err(AnalysisError::validation("Image is empty"));
    }
    image::load_from_memory(bytes)
        .map_err(|e| AnalysisError::validation(format!("Unreadable image: {}", e)))
}

/// MIME type of encoded image bytes, if recognised
pub fn image_mime_type(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

/// Re-encode an image as JPEG, downscaled to at most [`MAX_FRAME_SIDE`]
pub fn encode_jpeg(image: &DynamicImage) -> Result<MediaFrame, AnalysisError> {
    let resized;
    let source = if image.width() > MAX_FRAME_SIDE || image.height() > MAX_FRAME_SIDE {
        resized = image.thumbnail(MAX_FRAME_SIDE, MAX_FRAME_SIDE);
        &resized
    } else {
        image
    };

    // JPEG has no alpha channel
    let rgb = source.to_rgb8();
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| AnalysisError::Internal(format!("JPEG encoding failed: {}", e)))?;
    Ok(MediaFrame::jpeg(data))
}

/// Frame for an uploaded image
///
/// Small JPEG and PNG uploads are forwarded untouched; anything else is
/// re-encoded with [`encode_jpeg`].
pub fn upload_frame(bytes: &[u8], image: &DynamicImage) -> Result<MediaFrame, AnalysisError> {
    let fits = image.width() <= MAX_FRAME_SIDE && image.height() <= MAX_FRAME_SIDE;
    match image_mime_type(bytes) {
        Some(mime @ ("image/jpeg" | "image/png")) if fits => Ok(MediaFrame::new(mime, bytes.to_vec())),
        _ => encode_jpeg(image),
    }
}
