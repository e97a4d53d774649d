//! Shared test fixtures for cyberguard-ai integration tests
//!
//! Scripted providers, a synthetic video decoder and image generators.

#![allow(dead_code)]

use async_trait::async_trait;
use cyberguard_ai::error::AnalysisError;
use cyberguard_ai::fanout::FanOut;
use cyberguard_ai::history::MemoryHistory;
use cyberguard_ai::media::{VideoClip, VideoDecoder, VideoProbe};
use cyberguard_ai::providers::{Provider, ProviderError, ProviderRequest};
use cyberguard_ai::scoring::ScoringEngine;
use cyberguard_ai::types::{ContentKind, FrameSample, ProviderKind, RawPayload};
use cyberguard_ai::{Analyzer, AnalyzerSettings};
use image::{DynamicImage, GrayImage, Luma};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a scripted provider answers
#[derive(Debug, Clone)]
pub enum Script {
    Respond(RawPayload),
    HttpError(u16, String),
}

/// Provider that replays a fixed answer and records what it was asked
pub struct ScriptedProvider {
    kind: ProviderKind,
    configured: bool,
    delay: Duration,
    script: Script,
    pub calls: Arc<AtomicUsize>,
    /// Frame count of every media request received
    pub frames_seen: Arc<Mutex<Vec<usize>>>,
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind, script: Script) -> Self {
        Self {
            kind,
            configured: true,
            delay: Duration::ZERO,
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            frames_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn text(kind: ProviderKind, body: &str) -> Self {
        Self::new(kind, Script::Respond(RawPayload::Text(body.to_string())))
    }

    pub fn json(kind: ProviderKind, body: serde_json::Value) -> Self {
        Self::new(kind, Script::Respond(RawPayload::Json(body)))
    }

    pub fn unconfigured(kind: ProviderKind) -> Self {
        Self {
            configured: false,
            ..Self::new(kind, Script::Respond(RawPayload::Empty))
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn supports(&self, kind: ContentKind) -> bool {
        self.kind == ProviderKind::AiVerdict || kind == ContentKind::Text
    }

    async fn fetch(&self, request: &ProviderRequest) -> Result<RawPayload, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let ProviderRequest::Media { frames, .. } = request {
            self.frames_seen.lock().unwrap().push(frames.len());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.script {
            Script::Respond(payload) => Ok(payload.clone()),
            Script::HttpError(status, message) => Err(ProviderError::Http {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

/// Decoder yielding checkerboard frames for any input
pub struct SyntheticVideo {
    pub total_frames: u64,
    pub fps: f64,
    pub opened: Arc<AtomicUsize>,
}

impl SyntheticVideo {
    pub fn new(total_frames: u64, fps: f64) -> Self {
        Self {
            total_frames,
            fps,
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }
}

struct SyntheticClip {
    probe: VideoProbe,
}

#[async_trait]
impl VideoClip for SyntheticClip {
    fn probe(&self) -> VideoProbe {
        self.probe
    }

    async fn frame(&self, _sample: &FrameSample) -> Result<DynamicImage, AnalysisError> {
        Ok(checkerboard(96, 96, 8))
    }
}

#[async_trait]
impl VideoDecoder for SyntheticVideo {
    async fn open(&self, bytes: &[u8]) -> Result<Box<dyn VideoClip>, AnalysisError> {
        if bytes.is_empty() {
            return Err(AnalysisError::validation("Video is empty"));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SyntheticClip {
            probe: VideoProbe {
                total_frames: self.total_frames,
                fps: self.fps,
                duration_secs: self.total_frames as f64 / self.fps,
            },
        }))
    }
}

/// Sharp high-contrast image
pub fn checkerboard(width: u32, height: u32, cell: u32) -> DynamicImage {
    let img = GrayImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Luma([30u8])
        } else {
            Luma([220u8])
        }
    });
    DynamicImage::ImageLuma8(img)
}

/// Flat mid-grey image (blurry, no contrast)
pub fn flat(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([128u8])))
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    image.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Claims payload with `n` claims, the first one rated false by a reputable site
pub fn claims_payload(n: usize) -> serde_json::Value {
    let claims: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "text": format!("Claim number {}", i),
                "claimReview": [{
                    "publisher": {"name": "Snopes", "site": "snopes.com"},
                    "url": format!("https://www.snopes.com/fact-check/{}", i),
                    "textualRating": if i == 0 { "False" } else { "Mixture" }
                }]
            })
        })
        .collect();
    json!({ "claims": claims })
}

/// News payload with `reputable` Reuters articles and `other` blog articles
pub fn news_payload(reputable: usize, other: usize) -> serde_json::Value {
    let mut articles = Vec::new();
    for i in 0..reputable {
        articles.push(json!({
            "source": {"name": "Reuters"},
            "title": format!("Reuters report {}", i),
            "url": format!("https://www.reuters.com/world/{}", i)
        }));
    }
    for i in 0..other {
        articles.push(json!({
            "source": {"name": "Some Blog"},
            "title": format!("Blog post {}", i),
            "url": format!("https://example-blog.net/{}", i)
        }));
    }
    json!({ "status": "ok", "totalResults": articles.len(), "articles": articles })
}

pub fn analyzer_with(
    providers: Vec<Arc<dyn Provider>>,
    video: Arc<dyn VideoDecoder>,
    settings: AnalyzerSettings,
) -> Analyzer {
    Analyzer::new(
        FanOut::new(providers),
        ScoringEngine::default(),
        video,
        Arc::new(MemoryHistory::default()),
        settings,
    )
}

pub fn analyzer(providers: Vec<Arc<dyn Provider>>) -> Analyzer {
    analyzer_with(
        providers,
        Arc::new(SyntheticVideo::new(300, 30.0)),
        AnalyzerSettings::default(),
    )
}

pub const CLICKBAIT: &str = "BREAKING NEWS!!! SHOCKING TRUTH they don't want you to know!!!";
