//! Instrument register: the 32 numeric slots that shape one track.
//!
//! Slot indices are part of the song format: effect commands address
//! registers by number, so the `Param` discriminants must never move.

use serde::{Deserialize, Serialize};

/// Number of slots in an instrument register.
pub const REGISTER_COUNT: usize = 32;

/// Registers below this index feed the note renderer. Writing one of them
/// makes every cached note buffer of the track stale.
pub const TONE_REGISTER_COUNT: usize = 16;

/// Named register slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Param {
    // ── Oscillators ──
    Osc1Waveform = 0,
    Osc1Volume = 1,
    /// Semitone offset, centered at 128.
    Osc1Semitone = 2,
    /// Envelope exponent applied to the phase increment (`value / 32`).
    Osc1EnvelopeExp = 3,
    Osc2Waveform = 4,
    Osc2Volume = 5,
    Osc2Semitone = 6,
    /// Fine detune, ratio `1 + 0.0008 * value`.
    Osc2Detune = 7,
    Osc2EnvelopeExp = 8,
    NoiseVolume = 9,

    // ── Envelope ──
    Attack = 10,
    Sustain = 11,
    Release = 12,
    /// Release curvature: larger values decay faster.
    ExpDecay = 13,

    // ── Arpeggio ──
    /// Two semitone offsets packed as nibbles.
    Arpeggio = 14,
    ArpeggioSpeed = 15,

    // ── Effects ──
    LfoWaveform = 16,
    LfoAmount = 17,
    LfoFrequency = 18,
    /// Nonzero routes the LFO to the filter cutoff.
    LfoFilter = 19,
    FilterMode = 20,
    FilterCutoff = 21,
    FilterResonance = 22,
    Distortion = 23,
    Drive = 24,
    PanAmount = 25,
    PanFrequency = 26,
    DelayAmount = 27,
    DelayTime = 28,
}

impl Param {
    /// Every named slot, in register order.
    pub const ALL: [Param; 29] = [
        Param::Osc1Waveform,
        Param::Osc1Volume,
        Param::Osc1Semitone,
        Param::Osc1EnvelopeExp,
        Param::Osc2Waveform,
        Param::Osc2Volume,
        Param::Osc2Semitone,
        Param::Osc2Detune,
        Param::Osc2EnvelopeExp,
        Param::NoiseVolume,
        Param::Attack,
        Param::Sustain,
        Param::Release,
        Param::ExpDecay,
        Param::Arpeggio,
        Param::ArpeggioSpeed,
        Param::LfoWaveform,
        Param::LfoAmount,
        Param::LfoFrequency,
        Param::LfoFilter,
        Param::FilterMode,
        Param::FilterCutoff,
        Param::FilterResonance,
        Param::Distortion,
        Param::Drive,
        Param::PanAmount,
        Param::PanFrequency,
        Param::DelayAmount,
        Param::DelayTime,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Param> {
        Self::ALL.get(index).copied()
    }

    /// True if writing this slot changes how notes render.
    pub const fn affects_tone(self) -> bool {
        (self as usize) < TONE_REGISTER_COUNT
    }
}

/// A track's instrument: one integer per register slot.
///
/// Serialized as a plain JSON array. Shorter arrays are zero-padded and
/// longer ones truncated to `REGISTER_COUNT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<i32>", into = "Vec<i32>")]
pub struct Instrument {
    registers: [i32; REGISTER_COUNT],
}

impl Instrument {
    pub fn new(registers: [i32; REGISTER_COUNT]) -> Self {
        Instrument { registers }
    }

    #[inline]
    pub fn get(&self, param: Param) -> i32 {
        self.registers[param.index()]
    }

    pub fn set(&mut self, param: Param, value: i32) {
        self.registers[param.index()] = value;
    }

    /// Builder-style `set`.
    pub fn with(mut self, param: Param, value: i32) -> Self {
        self.set(param, value);
        self
    }

    /// Read a slot by raw index, including the unnamed tail slots.
    pub fn register(&self, index: usize) -> Option<i32> {
        self.registers.get(index).copied()
    }

    /// Write a slot by raw index. Returns false if the index is out of range.
    pub fn write_register(&mut self, index: usize, value: i32) -> bool {
        match self.registers.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn registers(&self) -> &[i32; REGISTER_COUNT] {
        &self.registers
    }
}

impl Default for Instrument {
    fn default() -> Self {
        Instrument {
            registers: [0; REGISTER_COUNT],
        }
    }
}

impl From<Vec<i32>> for Instrument {
    fn from(values: Vec<i32>) -> Self {
        let mut registers = [0; REGISTER_COUNT];
        for (slot, value) in registers.iter_mut().zip(values) {
            *slot = value;
        }
        Instrument { registers }
    }
}

impl From<Instrument> for Vec<i32> {
    fn from(instrument: Instrument) -> Self {
        instrument.registers.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_indices_match_register_layout() {
        for (i, param) in Param::ALL.iter().enumerate() {
            assert_eq!(param.index(), i, "{param:?} is out of order");
            assert_eq!(Param::from_index(i), Some(*param));
        }
        assert_eq!(Param::from_index(29), None);
        assert_eq!(Param::DelayTime.index(), 28);
    }

    #[test]
    fn tone_registers_end_at_arpeggio_speed() {
        assert!(Param::ArpeggioSpeed.affects_tone());
        assert!(Param::Release.affects_tone());
        assert!(!Param::LfoWaveform.affects_tone());
        assert!(!Param::DelayTime.affects_tone());
    }

    #[test]
    fn short_arrays_are_zero_padded() {
        let inst: Instrument = serde_json::from_str("[2, 100, 128]").unwrap();
        assert_eq!(inst.get(Param::Osc1Waveform), 2);
        assert_eq!(inst.get(Param::Osc1Semitone), 128);
        assert_eq!(inst.get(Param::Osc2Volume), 0);
        assert_eq!(inst.registers().len(), REGISTER_COUNT);
    }

    #[test]
    fn long_arrays_are_truncated() {
        let values: Vec<i32> = (0..40).collect();
        let inst = Instrument::from(values);
        assert_eq!(inst.register(31), Some(31));
        assert_eq!(inst.register(32), None);
    }

    #[test]
    fn serializes_as_plain_array() {
        let inst = Instrument::default().with(Param::Drive, 32);
        let json = serde_json::to_string(&inst).unwrap();
        assert!(json.starts_with('['), "expected array, got {json}");
        let back: Instrument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);
    }

    #[test]
    fn write_register_rejects_out_of_range() {
        let mut inst = Instrument::default();
        assert!(inst.write_register(31, 7));
        assert_eq!(inst.register(31), Some(7));
        assert!(!inst.write_register(32, 7));
    }
}
