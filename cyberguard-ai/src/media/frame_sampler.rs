//! Video frame sampling
//!
//! Picks a small, bounded set of frame positions at fixed fractions of the
//! timeline. Longer clips get more frames up to [`MAX_SAMPLED_FRAMES`].

use crate::types::{FrameSample, FrameSection};

/// Ceiling on sampled frames per video
pub const MAX_SAMPLED_FRAMES: usize = 6;

/// Base timeline offsets (fractions of the total frame count)
const BASE_OFFSETS: [f64; 5] = [0.10, 0.25, 0.50, 0.75, 0.90];

/// Frames to sample for a clip of `duration_secs`
pub fn frames_for_duration(duration_secs: f64) -> usize {
    if duration_secs <= 10.0 {
        4
    } else if duration_secs <= 30.0 {
        5
    } else {
        MAX_SAMPLED_FRAMES
    }
}

/// Timeline offsets for exactly `count` frames
///
/// Fewer than five picks evenly spaced base entries (one frame → 50%); more
/// than five repeatedly splits the widest gap.
fn offsets_for(count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.5],
        n if n <= BASE_OFFSETS.len() => {
            let last = (BASE_OFFSETS.len() - 1) as f64;
            (0..n)
                .map(|i| {
                    let index = (i as f64 * last / (n - 1) as f64).round() as usize;
                    BASE_OFFSETS[index]
                })
                .collect()
        }
        n => {
            let mut offsets = BASE_OFFSETS.to_vec();
            while offsets.len() < n {
                let mut widest = 0;
                for i in 1..offsets.len() - 1 {
                    if offsets[i + 1] - offsets[i] > offsets[widest + 1] - offsets[widest] {
                        widest = i;
                    }
                }
                let midpoint = (offsets[widest] + offsets[widest + 1]) / 2.0;
                offsets.insert(widest + 1, midpoint);
            }
            offsets
        }
    }
}

fn section_for(fraction: f64) -> FrameSection {
    if fraction < 1.0 / 3.0 {
        FrameSection::Beginning
    } else if fraction < 2.0 / 3.0 {
        FrameSection::Middle
    } else {
        FrameSection::End
    }
}

/// Clip length in seconds, derived from the frame rate when the container
/// reports no duration; 0 when neither is known
pub fn effective_duration(total_frames: u64, duration_secs: f64, fps: f64) -> f64 {
    if duration_secs.is_finite() && duration_secs > 0.0 {
        duration_secs
    } else if fps.is_finite() && fps > 0.0 {
        total_frames as f64 / fps
    } else {
        0.0
    }
}

/// Select frame positions for a video
///
/// Positions are unique, ascending and `< total_frames`. Clips shorter than
/// the requested count yield fewer samples after deduplication. Timestamps
/// are 0 only when neither duration nor frame rate is known.
pub fn select_frames(
    total_frames: u64,
    duration_secs: f64,
    fps: f64,
    max_frames: usize,
) -> Vec<FrameSample> {
    if total_frames == 0 {
        return Vec::new();
    }

    let last = total_frames - 1;
    let mut positions: Vec<u64> = offsets_for(max_frames.min(MAX_SAMPLED_FRAMES))
        .into_iter()
        .map(|offset| ((offset * total_frames as f64).floor() as u64).min(last))
        .collect();
    positions.sort_unstable();
    positions.dedup();

    let duration = effective_duration(total_frames, duration_secs, fps);

    positions
        .into_iter()
        .map(|position| {
            let fraction = position as f64 / total_frames as f64;
            FrameSample {
                position,
                timestamp_sec: fraction * duration,
                section: section_for(fraction),
            }
        })
        .collect()
}

/// Evenly spread subset of `samples` for the single AI batch call
///
/// With three or more samples and a batch of three this yields one frame
/// per section.
pub fn representative_frames(samples: &[FrameSample], count: usize) -> Vec<FrameSample> {
    if count == 0 || samples.is_empty() {
        return Vec::new();
    }
    if count >= samples.len() {
        return samples.to_vec();
    }
    if count == 1 {
        return vec![samples[samples.len() / 2]];
    }

    let last = (samples.len() - 1) as f64;
    let mut picked: Vec<FrameSample> = (0..count)
        .map(|i| samples[(i as f64 * last / (count - 1) as f64).round() as usize])
        .collect();
    picked.dedup_by_key(|s| s.position);
    picked
}
