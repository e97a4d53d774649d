//! Analysis pipeline
//!
//! Drives one request from raw input to a recorded [`RiskAssessment`]:
//!
//! 1. Validate and decode the input (fatal on failure, before any provider call)
//! 2. Run the local extractors
//! 3. Fan out to the remote providers under the configured deadlines
//! 4. Normalize every outcome into a verdict
//! 5. Score, build the assessment and hand it to the history sink
//!
//! CPU-bound work (image decode, Laplacian, JPEG encode) runs on the blocking
//! pool so provider calls keep making progress.

use crate::error::AnalysisError;
use crate::extractors::{ExtractorOutputs, TechnicalExtractor};
use crate::fanout::{FanOut, FanOutPolicy};
use crate::history::AssessmentSink;
use crate::media::{
    decode_image, effective_duration, encode_jpeg, frames_for_duration, representative_frames,
    select_frames, upload_frame, VideoDecoder,
};
use crate::normalizer::normalize_outcome;
use crate::providers::ProviderRequest;
use crate::scoring::ScoringEngine;
use crate::types::{
    AnalysisInput, ContentKind, FrameSample, ProviderKind, ProviderOutcome, RiskAssessment,
    SignalReport,
};
use futures::future::join_all;
use image::DynamicImage;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tunables for the pipeline
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerSettings {
    pub fanout: FanOutPolicy,
    /// Ceiling on sampled video frames
    pub max_video_frames: usize,
    /// Frames sent to the AI provider in the single video call
    pub ai_batch_frames: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            fanout: FanOutPolicy::default(),
            max_video_frames: 6,
            ai_batch_frames: 3,
        }
    }
}

/// Configuration state of one registered provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderAvailability {
    pub provider: ProviderKind,
    pub configured: bool,
}

/// Analysis pipeline
///
/// Shared across requests; holds no per-request state.
pub struct Analyzer {
    fanout: FanOut,
    engine: ScoringEngine,
    video_decoder: Arc<dyn VideoDecoder>,
    history: Arc<dyn AssessmentSink>,
    settings: AnalyzerSettings,
}

impl Analyzer {
    pub fn new(
        fanout: FanOut,
        engine: ScoringEngine,
        video_decoder: Arc<dyn VideoDecoder>,
        history: Arc<dyn AssessmentSink>,
        settings: AnalyzerSettings,
    ) -> Self {
        Self {
            fanout,
            engine,
            video_decoder,
            history,
            settings,
        }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    pub fn history(&self) -> &Arc<dyn AssessmentSink> {
        &self.history
    }

    pub fn provider_status(&self) -> Vec<ProviderAvailability> {
        self.fanout
            .providers()
            .iter()
            .map(|p| ProviderAvailability {
                provider: p.kind(),
                configured: p.is_configured(),
            })
            .collect()
    }

    /// Analyze one input
    ///
    /// Only validation failures (and internal faults) are returned as errors;
    /// provider failures are folded into the assessment.
    pub async fn analyze(&self, input: AnalysisInput) -> Result<RiskAssessment, AnalysisError> {
        let start = Instant::now();
        let kind = input.kind();
        debug!(kind = %kind, fingerprint = %input.fingerprint(), "Analysis started");

        let assessment = match kind {
            ContentKind::Text => self.analyze_text(&input).await?,
            ContentKind::Image => self.analyze_image(&input).await?,
            ContentKind::Video => self.analyze_video(&input).await?,
        };

        self.history.record(&assessment).await;

        info!(
            kind = %kind,
            fingerprint = assessment.fingerprint(),
            score = assessment.score(),
            confidence = assessment.confidence(),
            risk_level = assessment.risk_level().as_str(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis complete"
        );
        Ok(assessment)
    }

    async fn analyze_text(&self, input: &AnalysisInput) -> Result<RiskAssessment, AnalysisError> {
        let text = input
            .as_text()
            .ok_or_else(|| AnalysisError::Internal("Text input without text payload".into()))?;
        if text.trim().is_empty() {
            return Err(AnalysisError::validation("Text is empty"));
        }

        let extractors = ExtractorOutputs::for_text(text);
        let outcomes = self
            .fanout
            .assess(ProviderRequest::Text(text.to_string()), self.settings.fanout)
            .await;

        Ok(self.assemble(input, extractors, outcomes, Vec::new()))
    }

    async fn analyze_image(&self, input: &AnalysisInput) -> Result<RiskAssessment, AnalysisError> {
        let bytes: Arc<[u8]> = Arc::from(media_bytes(input)?);

        let decode_bytes = Arc::clone(&bytes);
        let image = Arc::new(tokio::task::spawn_blocking(move || decode_image(&decode_bytes)).await??);

        let frame_image = Arc::clone(&image);
        let frame =
            tokio::task::spawn_blocking(move || upload_frame(&bytes, &frame_image)).await??;

        let request = ProviderRequest::Media {
            kind: ContentKind::Image,
            frames: vec![frame],
        };
        let technical = tokio::task::spawn_blocking(move || TechnicalExtractor::analyze(&image));
        let (technical, outcomes) =
            tokio::join!(technical, self.fanout.assess(request, self.settings.fanout));

        let extractors = ExtractorOutputs::for_media(ContentKind::Image, vec![technical?]);
        Ok(self.assemble(input, extractors, outcomes, Vec::new()))
    }

    async fn analyze_video(&self, input: &AnalysisInput) -> Result<RiskAssessment, AnalysisError> {
        let bytes = media_bytes(input)?;
        if bytes.is_empty() {
            return Err(AnalysisError::validation("Video is empty"));
        }

        let (samples, images) = self.sample_video(bytes).await?;
        let images = Arc::new(images);

        let batch: Vec<usize> = representative_frames(&samples, self.settings.ai_batch_frames)
            .iter()
            .filter_map(|rep| samples.iter().position(|s| s.position == rep.position))
            .collect();
        debug!(sampled = samples.len(), ai_batch = batch.len(), "Video frames selected");

        let encode_images = Arc::clone(&images);
        let frames = tokio::task::spawn_blocking(move || {
            batch
                .iter()
                .map(|&i| encode_jpeg(&encode_images[i]))
                .collect::<Result<Vec<_>, _>>()
        })
        .await??;

        let request = ProviderRequest::Media {
            kind: ContentKind::Video,
            frames,
        };
        let technical = tokio::task::spawn_blocking(move || {
            images.iter().map(TechnicalExtractor::analyze).collect::<Vec<_>>()
        });
        let (technical, outcomes) =
            tokio::join!(technical, self.fanout.assess(request, self.settings.fanout));

        let extractors = ExtractorOutputs::for_media(ContentKind::Video, technical?);
        Ok(self.assemble(input, extractors, outcomes, samples))
    }

    /// Open the clip, pick frames and decode them
    ///
    /// Frames that fail to decode are skipped; the clip (and its temporary
    /// file) is released before returning.
    async fn sample_video(
        &self,
        bytes: &[u8],
    ) -> Result<(Vec<FrameSample>, Vec<DynamicImage>), AnalysisError> {
        let clip = self.video_decoder.open(bytes).await?;
        let probe = clip.probe();

        let duration = effective_duration(probe.total_frames, probe.duration_secs, probe.fps);
        let max_frames = frames_for_duration(duration).min(self.settings.max_video_frames);
        let samples = select_frames(probe.total_frames, probe.duration_secs, probe.fps, max_frames);
        if samples.is_empty() {
            return Err(AnalysisError::validation("Video has no frames"));
        }

        let decoded = join_all(samples.iter().map(|s| clip.frame(s))).await;
        drop(clip);

        let mut kept_samples = Vec::with_capacity(samples.len());
        let mut images = Vec::with_capacity(samples.len());
        for (sample, result) in samples.into_iter().zip(decoded) {
            match result {
                Ok(image) => {
                    kept_samples.push(sample);
                    images.push(image);
                }
                Err(e) => {
                    warn!(position = sample.position, error = %e, "Skipping undecodable frame")
                }
            }
        }

        if images.is_empty() {
            return Err(AnalysisError::validation("No video frames could be decoded"));
        }
        Ok((kept_samples, images))
    }

    /// Normalize, score and wrap into the final assessment
    fn assemble(
        &self,
        input: &AnalysisInput,
        extractors: ExtractorOutputs,
        outcomes: Vec<ProviderOutcome>,
        frames: Vec<FrameSample>,
    ) -> RiskAssessment {
        let kind = input.kind();
        let sources: Vec<_> = outcomes
            .iter()
            .map(|outcome| normalize_outcome(outcome, kind))
            .collect();
        let card = self.engine.score(&extractors, &sources);

        let signals = SignalReport {
            linguistic: extractors.linguistic,
            sentiment: extractors.sentiment,
            technical: extractors.technical,
            verdicts: sources.into_iter().filter_map(|s| s.verdict).collect(),
            frames,
        };
        let reports = outcomes.iter().map(ProviderOutcome::report).collect();

        RiskAssessment::new(input, card, reports, signals)
    }
}

fn media_bytes(input: &AnalysisInput) -> Result<&[u8], AnalysisError> {
    input
        .as_bytes()
        .ok_or_else(|| AnalysisError::Internal("Media input without byte payload".into()))
}
