//! Note envelope: linear attack, flat sustain, curved release.

use crate::instrument::{Instrument, Param};

/// Envelope timings for one note, in samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub attack: usize,
    pub sustain: usize,
    pub release: usize,
    release_inv: f64,
    /// Exponent base-3 curvature applied during release.
    decay: f64,
}

impl Envelope {
    /// Derive timings from the register: each phase lasts `value² * 4` samples.
    pub fn from_instrument(instrument: &Instrument) -> Self {
        let attack = phase_len(instrument.get(Param::Attack));
        let sustain = phase_len(instrument.get(Param::Sustain));
        let release = phase_len(instrument.get(Param::Release));
        Envelope {
            attack,
            sustain,
            release,
            release_inv: if release > 0 { 1.0 / release as f64 } else { 0.0 },
            decay: -(instrument.get(Param::ExpDecay) as f64) / 16.0,
        }
    }

    /// Total note length.
    pub fn len(&self) -> usize {
        self.attack
            .saturating_add(self.sustain)
            .saturating_add(self.release)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Envelope level at sample `j`.
    #[inline]
    pub fn level(&self, j: usize) -> f64 {
        if j < self.attack {
            j as f64 / self.attack as f64
        } else if j >= self.attack.saturating_add(self.sustain) {
            let r = (j - self.attack - self.sustain) as f64 * self.release_inv;
            (1.0 - r) * 3.0_f64.powf(self.decay * r)
        } else {
            1.0
        }
    }
}

/// Saturates instead of overflowing for out-of-range registers.
fn phase_len(value: i32) -> usize {
    let v = (value as i64).unsigned_abs();
    usize::try_from(v.saturating_mul(v).saturating_mul(4)).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(attack: i32, sustain: i32, release: i32, decay: i32) -> Envelope {
        Envelope::from_instrument(
            &Instrument::default()
                .with(Param::Attack, attack)
                .with(Param::Sustain, sustain)
                .with(Param::Release, release)
                .with(Param::ExpDecay, decay),
        )
    }

    #[test]
    fn phases_are_squared_times_four() {
        let e = env(2, 5, 10, 0);
        assert_eq!(e.attack, 16);
        assert_eq!(e.sustain, 100);
        assert_eq!(e.release, 400);
        assert_eq!(e.len(), 516);
    }

    #[test]
    fn attack_ramps_from_zero() {
        let e = env(2, 1, 1, 0);
        assert_eq!(e.level(0), 0.0);
        assert_eq!(e.level(8), 0.5);
        assert_eq!(e.level(16), 1.0);
    }

    #[test]
    fn release_only_starts_at_one_and_decays() {
        let e = env(0, 0, 10, 40);
        assert_eq!(e.len(), 400);
        assert_eq!(e.level(0), 1.0);
        let mut prev = e.level(0);
        for j in 1..e.len() {
            let l = e.level(j);
            assert!(l < prev, "release must fall monotonically at {j}: {l} >= {prev}");
            assert!(l > 0.0);
            prev = l;
        }
        assert!(prev < 0.01, "release should end near zero, got {prev}");
    }

    #[test]
    fn decay_register_bends_release_curve() {
        let linear = env(0, 0, 10, 0);
        let curved = env(0, 0, 10, 64);
        assert!((linear.level(200) - 0.5).abs() < 1e-12);
        assert!(curved.level(200) < linear.level(200));
    }

    #[test]
    fn extreme_registers_saturate() {
        let e = env(i32::MIN, i32::MAX, 1, 0);
        assert_eq!(e.attack, usize::MAX);
        assert_eq!(e.len(), usize::MAX);
        assert_eq!(e.level(0), 0.0);
        assert!(e.level(1_000) > 0.0);
    }

    #[test]
    fn zero_length_envelope_is_empty() {
        let e = env(0, 0, 0, 0);
        assert!(e.is_empty());
    }
}
