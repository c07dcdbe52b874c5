//! Mixer: sums processed track buffers and normalizes the result.

use serde::Serialize;

use crate::song::SAMPLE_RATE;

use super::channel::ChannelBuffer;

/// Full-scale divisor taking mix samples to floating point.
pub const NORMALIZE_SCALE: f32 = 65536.0;

/// Interleaved stereo `i32` accumulator shared by every track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixBuffer {
    samples: Vec<i32>,
}

impl MixBuffer {
    pub fn new(frames: usize) -> Self {
        MixBuffer {
            samples: vec![0; frames * 2],
        }
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Add a track's processed output. Sums wrap like the stores they mirror.
    pub fn add_channel(&mut self, channel: &ChannelBuffer) {
        for (mix, &s) in self.samples.iter_mut().zip(channel.as_slice()) {
            *mix = mix.wrapping_add(s);
        }
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.samples
    }

    /// Split into left/right `f32` channels scaled by [`NORMALIZE_SCALE`].
    ///
    /// No clamping: loud mixes come out beyond ±1.
    pub fn normalize(&self) -> RenderedAudio {
        let frames = self.frames();
        let mut left = Vec::with_capacity(frames);
        let mut right = Vec::with_capacity(frames);
        for frame in self.samples.chunks_exact(2) {
            left.push(frame[0] as f32 / NORMALIZE_SCALE);
            right.push(frame[1] as f32 / NORMALIZE_SCALE);
        }
        RenderedAudio {
            sample_rate: SAMPLE_RATE,
            left,
            right,
        }
    }
}

/// Normalized stereo output of a song.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedAudio {
    pub sample_rate: u32,
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl RenderedAudio {
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Interleave back to `L R L R ...`.
    pub fn interleaved(&self) -> Vec<f32> {
        self.left
            .iter()
            .zip(&self.right)
            .flat_map(|(&l, &r)| [l, r])
            .collect()
    }

    /// Interleaved 16-bit PCM, clamped to full scale.
    pub fn to_pcm_i16(&self) -> Vec<i16> {
        self.interleaved()
            .into_iter()
            .map(|s| (s as f64 * 32767.0).round().clamp(-32768.0, 32767.0) as i16)
            .collect()
    }

    /// Largest absolute sample over both channels.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(&self.right)
            .fold(0.0_f32, |m, &s| m.max(s.abs()))
    }
}
