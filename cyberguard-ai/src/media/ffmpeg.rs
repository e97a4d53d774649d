//! ffmpeg-backed video decoder
//!
//! The upload is written to a scoped temporary file (removed when the clip is
//! dropped, on every exit path). `ffprobe` reads stream metadata; `ffmpeg`
//! decodes single frames as PNG piped back over stdout, so decoded frames never
//! touch the filesystem.

use super::{effective_duration, VideoClip, VideoDecoder, VideoProbe};
use crate::error::AnalysisError;
use crate::types::FrameSample;
use async_trait::async_trait;
use image::DynamicImage;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

/// Decoder shelling out to `ffprobe` / `ffmpeg`
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegDecoder {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Check that both binaries run
    pub async fn is_available(&self) -> bool {
        let mut available = true;
        for binary in [&self.ffmpeg, &self.ffprobe] {
            let ok = Command::new(binary)
                .arg("-version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map(|status| status.success())
                .unwrap_or(false);
            debug!(command = ?binary, available = ok, "ffmpeg availability check");
            available &= ok;
        }
        available
    }

    async fn probe(&self, path: &Path) -> Result<VideoProbe, AnalysisError> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-count_packets",
                "-show_entries",
                "stream=nb_read_packets,nb_frames,r_frame_rate,duration:format=duration",
                "-of",
                "json",
            ])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AnalysisError::Internal(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::validation(format!(
                "Unreadable video: {}",
                stderr.trim()
            )));
        }

        let parsed: ProbeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| AnalysisError::validation(format!("Unreadable video metadata: {}", e)))?;
        parsed.into_probe()
    }
}

#[async_trait]
impl VideoDecoder for FfmpegDecoder {
    async fn open(&self, bytes: &[u8]) -> Result<Box<dyn VideoClip>, AnalysisError> {
        if bytes.is_empty() {
            return Err(AnalysisError::validation("Video is empty"));
        }

        let file = tempfile::Builder::new()
            .prefix("cyberguard-")
            .suffix(".video")
            .tempfile()
            .map_err(|e| AnalysisError::Internal(format!("Failed to create temp file: {}", e)))?;
        tokio::fs::write(file.path(), bytes)
            .await
            .map_err(|e| AnalysisError::Internal(format!("Failed to write temp file: {}", e)))?;

        let probe = self.probe(file.path()).await?;
        debug!(
            total_frames = probe.total_frames,
            fps = probe.fps,
            duration_secs = probe.duration_secs,
            "Video probed"
        );

        Ok(Box::new(FfmpegClip {
            ffmpeg: self.ffmpeg.clone(),
            file,
            probe,
        }))
    }
}

/// Opened video backed by a temporary file
struct FfmpegClip {
    ffmpeg: PathBuf,
    file: NamedTempFile,
    probe: VideoProbe,
}

#[async_trait]
impl VideoClip for FfmpegClip {
    fn probe(&self) -> VideoProbe {
        self.probe
    }

    async fn frame(&self, sample: &FrameSample) -> Result<DynamicImage, AnalysisError> {
        let mut command = Command::new(&self.ffmpeg);
        command.args(["-v", "error"]);
        match frame_locator(sample, &self.probe) {
            FrameLocator::Seek(seek) => {
                command.args(["-ss", seek.as_str(), "-i"]).arg(self.file.path());
            }
            FrameLocator::Index(filter) => {
                command
                    .arg("-i")
                    .arg(self.file.path())
                    .args(["-vf", filter.as_str(), "-vsync", "0"]);
            }
        }
        let output = command
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "pipe:1"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AnalysisError::Internal(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() || output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(position = sample.position, error = %stderr.trim(), "Frame decode failed");
            return Err(AnalysisError::validation(format!(
                "Could not decode frame {}",
                sample.position
            )));
        }

        image::load_from_memory(&output.stdout)
            .map_err(|e| AnalysisError::validation(format!("Unreadable frame: {}", e)))
    }
}

/// How ffmpeg reaches a sampled frame
#[derive(Debug, PartialEq)]
enum FrameLocator {
    /// `-ss` seek to a timestamp in seconds
    Seek(String),
    /// `select` filter on the decoded frame index
    Index(String),
}

/// Seek by timestamp, or select by index when the clip has no timing
/// information and every timestamp would collapse to 0
fn frame_locator(sample: &FrameSample, probe: &VideoProbe) -> FrameLocator {
    let untimed = effective_duration(probe.total_frames, probe.duration_secs, probe.fps) <= 0.0;
    if untimed && sample.position > 0 {
        FrameLocator::Index(format!("select=eq(n\\,{})", sample.position))
    } else {
        FrameLocator::Seek(format!("{:.3}", sample.timestamp_sec.max(0.0)))
    }
}

// ============================================================================
// ffprobe JSON output
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    nb_read_packets: Option<String>,
    nb_frames: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl ProbeOutput {
    fn into_probe(self) -> Result<VideoProbe, AnalysisError> {
        let stream = self
            .streams
            .into_iter()
            .next()
            .ok_or_else(|| AnalysisError::validation("No video stream found"))?;

        let fps = stream
            .r_frame_rate
            .as_deref()
            .and_then(parse_rate)
            .unwrap_or(0.0);
        let duration_secs = stream
            .duration
            .as_deref()
            .or(self.format.as_ref().and_then(|f| f.duration.as_deref()))
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(0.0);
        let counted = stream
            .nb_read_packets
            .as_deref()
            .or(stream.nb_frames.as_deref())
            .and_then(|n| n.parse::<u64>().ok());
        let total_frames = match counted {
            Some(n) => n,
            None => (duration_secs * fps).round() as u64,
        };

        if total_frames == 0 {
            return Err(AnalysisError::validation("Video contains no frames"));
        }

        let duration_secs = effective_duration(total_frames, duration_secs, fps);

        Ok(VideoProbe {
            total_frames,
            fps,
            duration_secs,
        })
    }
}

/// Parse an ffprobe rational like `30000/1001`
fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((n, d)) => (n.parse::<f64>().ok()?, d.parse::<f64>().ok()?),
        None => (rate.parse::<f64>().ok()?, 1.0),
    };
    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}
