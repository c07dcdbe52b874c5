//! Stateless oscillators. Phase is measured in cycles, not radians.

/// 2π truncated to six decimals. Every sine in the engine uses this value.
pub const TWO_PI: f64 = 6.283184;

/// Supported waveform shapes, selected by register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Map a register value to a waveform. Unknown selectors play a sine.
    pub fn from_register(value: i32) -> Self {
        match value {
            1 => Waveform::Square,
            2 => Waveform::Sawtooth,
            3 => Waveform::Triangle,
            _ => Waveform::Sine,
        }
    }

    /// Amplitude in [-1, 1] at `phase`.
    #[inline]
    pub fn sample(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => sine(phase),
            Waveform::Square => square(phase),
            Waveform::Sawtooth => sawtooth(phase),
            Waveform::Triangle => triangle(phase),
        }
    }
}

#[inline]
pub fn sine(phase: f64) -> f64 {
    (phase * TWO_PI).sin()
}

/// Rises from -1 to +1 over each cycle.
#[inline]
pub fn sawtooth(phase: f64) -> f64 {
    2.0 * (phase % 1.0) - 1.0
}

#[inline]
pub fn square(phase: f64) -> f64 {
    if phase % 1.0 < 0.5 { 1.0 } else { -1.0 }
}

/// -1 at phase 0, +1 at phase 0.5.
#[inline]
pub fn triangle(phase: f64) -> f64 {
    let v = (phase % 1.0) * 4.0;
    if v < 2.0 { v - 1.0 } else { 3.0 - v }
}
