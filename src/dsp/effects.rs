//! Per-track effects chain: filter → distortion → drive → pan → delay.
//!
//! [`RowEffects`] holds the parameters derived from the instrument
//! register at the start of each row. [`EffectsChain`] carries the state
//! that persists across the whole track render (filter integrators and
//! the ringing flag) and processes one frame at a time.

use crate::instrument::{Instrument, Param};
use crate::song::SAMPLE_RATE;

use super::channel::ChannelBuffer;
use super::delay::Delay;
use super::filter::{FilterMode, StateVariableFilter};
use super::oscillator::{self, TWO_PI, Waveform};
use super::wrap_i32;

/// Below this squared level the filter stops ringing and bypasses again.
const RING_THRESHOLD: f64 = 1e-5;

/// π as the cutoff scaling rounds it.
const CUTOFF_PI: f64 = 3.141592;

/// Effect parameters for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEffects {
    pub lfo_waveform: Waveform,
    pub lfo_amount: f64,
    pub lfo_freq: f64,
    /// LFO modulates the filter cutoff.
    pub lfo_filter: bool,
    pub filter_mode: FilterMode,
    pub cutoff: f64,
    /// Damping factor, `1 - resonance / 255`.
    pub q: f64,
    pub distortion: f64,
    pub drive: f64,
    pub pan_amount: f64,
    pub pan_freq: f64,
    pub delay: Delay,
}

impl RowEffects {
    pub fn from_instrument(instrument: &Instrument, row_len: u32) -> Self {
        let reg = |p: Param| instrument.get(p) as f64;
        let row_len_f = row_len as f64;
        RowEffects {
            lfo_waveform: Waveform::from_register(instrument.get(Param::LfoWaveform)),
            lfo_amount: reg(Param::LfoAmount) / 512.0,
            lfo_freq: 2.0_f64.powf(reg(Param::LfoFrequency) - 9.0) / row_len_f,
            lfo_filter: instrument.get(Param::LfoFilter) != 0,
            filter_mode: FilterMode::from_register(instrument.get(Param::FilterMode)),
            cutoff: reg(Param::FilterCutoff) * 43.23529 * CUTOFF_PI / SAMPLE_RATE as f64,
            q: 1.0 - reg(Param::FilterResonance) / 255.0,
            distortion: reg(Param::Distortion) * 1e-5,
            drive: reg(Param::Drive) / 32.0,
            pan_amount: reg(Param::PanAmount) / 512.0,
            pan_freq: TWO_PI * 2.0_f64.powf(reg(Param::PanFrequency) - 9.0) / row_len_f,
            delay: Delay::from_registers(
                instrument.get(Param::DelayTime),
                instrument.get(Param::DelayAmount),
                row_len,
            ),
        }
    }
}

/// Sine soft-clip inside [-1, 1], hard clip outside, at the given input gain.
#[inline]
pub fn distort(sample: f64, amount: f64) -> f64 {
    let s = sample * amount;
    let s = if s < 1.0 {
        if s > -1.0 { oscillator::sine(s * 0.25) } else { -1.0 }
    } else {
        1.0
    };
    s / amount
}

/// Effect state carried across every row of a track.
#[derive(Debug, Clone, Default)]
pub struct EffectsChain {
    filter: StateVariableFilter,
    ringing: bool,
}

impl EffectsChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the last processed sample was still audible.
    pub fn is_ringing(&self) -> bool {
        self.ringing
    }

    /// Process `frame` in place and return the stored `(left, right)`.
    ///
    /// The LFO and panner advance on the interleaved sample index, i.e.
    /// twice per frame.
    pub fn process(&mut self, fx: &RowEffects, channel: &mut ChannelBuffer, frame: usize) -> (i32, i32) {
        let k = (frame * 2) as f64;
        let mut right = channel.dry(frame) as f64;
        let mut left = 0.0;

        if right != 0.0 || self.ringing {
            let mut cutoff = fx.cutoff;
            if fx.lfo_filter {
                cutoff *= fx.lfo_waveform.sample(fx.lfo_freq * k) * fx.lfo_amount + 0.5;
            }
            right = self.filter.process(right, cutoff, fx.q, fx.filter_mode);

            if fx.distortion != 0.0 {
                right = distort(right, fx.distortion);
            }

            right *= fx.drive;

            self.ringing = right * right > RING_THRESHOLD;

            let t = (fx.pan_freq * k).sin() * fx.pan_amount + 0.5;
            left = right * (1.0 - t);
            right *= t;
        }

        // Delay runs even on silent input so echoes can ring out
        let (echo_left, echo_right) = fx.delay.tap(channel, frame);
        left += echo_left;
        right += echo_right;

        let out = (wrap_i32(left), wrap_i32(right));
        channel.store(frame, out.0, out.1);
        out
    }
}
