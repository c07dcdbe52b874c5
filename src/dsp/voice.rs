//! Voice: renders one complete note (attack + sustain + release).
//!
//! Two oscillators with independent semitone offsets, an optional noise
//! layer and the note envelope are combined into a mono `i32` buffer.
//! Oscillator frequencies follow the arpeggio register, which is rotated
//! every `arp_interval` samples.

use rand::Rng;

use crate::instrument::{Instrument, Param};

use super::envelope::Envelope;
use super::oscillator::Waveform;
use super::wrap_i32;

/// Phase increment per sample at the reference pitch (174.61 Hz / 44100, F3).
const REFERENCE_INCREMENT: f64 = 0.003959503758;

/// Pitch value that plays at the reference increment.
const REFERENCE_PITCH: f64 = 128.0;

/// Output gain applied before truncation to `i32`.
const NOTE_GAIN: f64 = 80.0;

/// Phase increment (cycles per sample) for a pitch value.
/// Twelve steps double the frequency.
pub fn note_increment(pitch: f64) -> f64 {
    REFERENCE_INCREMENT * 2.0_f64.powf((pitch - REFERENCE_PITCH) / 12.0)
}

/// Render `note` with the current register state.
///
/// `noise` is only consumed when the noise volume register is nonzero.
pub fn render_note<R: Rng + ?Sized>(
    instrument: &Instrument,
    note: u32,
    row_len: u32,
    noise: &mut R,
) -> Vec<i32> {
    render_note_clipped(instrument, note, row_len, usize::MAX, noise)
}

/// [`render_note`], stopping after at most `max_len` samples.
///
/// Register arithmetic is done in `f64`, so out-of-range registers give
/// odd audio instead of overflowing.
pub fn render_note_clipped<R: Rng + ?Sized>(
    instrument: &Instrument,
    note: u32,
    row_len: u32,
    max_len: usize,
    noise: &mut R,
) -> Vec<i32> {
    let osc1 = Waveform::from_register(instrument.get(Param::Osc1Waveform));
    let osc1_vol = instrument.get(Param::Osc1Volume) as f64;
    let osc1_semi = instrument.get(Param::Osc1Semitone) as f64;
    let osc1_env = instrument.get(Param::Osc1EnvelopeExp) as f64 / 32.0;
    let osc2 = Waveform::from_register(instrument.get(Param::Osc2Waveform));
    let osc2_vol = instrument.get(Param::Osc2Volume) as f64;
    let osc2_semi = instrument.get(Param::Osc2Semitone) as f64;
    let osc2_detune = 1.0 + 0.0008 * instrument.get(Param::Osc2Detune) as f64;
    let osc2_env = instrument.get(Param::Osc2EnvelopeExp) as f64 / 32.0;
    let noise_vol = instrument.get(Param::NoiseVolume) as f64;

    let envelope = Envelope::from_instrument(instrument);
    let mut arp = instrument.get(Param::Arpeggio);
    let arp_interval =
        row_len as f64 * 2.0_f64.powf(2.0 - instrument.get(Param::ArpeggioSpeed) as f64);

    let note = note as f64;
    let mut buf = vec![0_i32; envelope.len().min(max_len)];

    // Oscillators retrigger at phase 0 for every note
    let mut phase1 = 0.0;
    let mut phase2 = 0.0;
    let mut inc1 = 0.0;
    let mut inc2 = 0.0;
    let mut arp_countdown = 0.0;

    for (j, out) in buf.iter_mut().enumerate() {
        if arp_countdown >= 0.0 {
            arp = (arp >> 8) | ((arp & 255) << 4);
            arp_countdown -= arp_interval;

            let base = note + (arp & 15) as f64;
            inc1 = note_increment(base + osc1_semi - 128.0);
            inc2 = note_increment(base + osc2_semi - 128.0) * osc2_detune;
        }

        let e = envelope.level(j);

        phase1 += inc1 * e.powf(osc1_env);
        let mut sample = osc1.sample(phase1) * osc1_vol;

        phase2 += inc2 * e.powf(osc2_env);
        sample += osc2.sample(phase2) * osc2_vol;

        if noise_vol != 0.0 {
            sample += (2.0 * noise.r#gen::<f64>() - 1.0) * noise_vol;
        }

        *out = wrap_i32(NOTE_GAIN * sample * e);
        arp_countdown += 1.0;
    }

    buf
}
