//! State-variable filter (Chamberlin topology).
//!
//! Two integrators produce low-, high- and band-pass outputs from one
//! cutoff/resonance pair. State persists across calls so a filter can keep
//! ringing after its input falls silent.

/// Filter output selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Pass the input through untouched. Register value 0.
    ///
    /// Songs written for the JavaScript SoundBox player get a low-pass on
    /// mode 0 there; here it is a bypass, so a zero-cutoff mode-0 track
    /// that was silent in that player is audible.
    Off,
    HighPass,
    LowPass,
    BandPass,
}

impl FilterMode {
    /// Map the filter-mode register. Unknown values select low-pass.
    pub fn from_register(value: i32) -> Self {
        match value {
            0 => FilterMode::Off,
            1 => FilterMode::HighPass,
            3 => FilterMode::BandPass,
            _ => FilterMode::LowPass,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StateVariableFilter {
    low: f64,
    band: f64,
}

impl StateVariableFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one sample.
    ///
    /// `cutoff` is the normalized angular frequency before the `1.5 * sin`
    /// warp; `q` is the damping factor (1 = no resonance).
    #[inline]
    pub fn process(&mut self, input: f64, cutoff: f64, q: f64, mode: FilterMode) -> f64 {
        if mode == FilterMode::Off {
            return input;
        }
        let f = 1.5 * cutoff.sin();
        self.low += f * self.band;
        let high = q * (input - self.band) - self.low;
        self.band += f * high;
        match mode {
            FilterMode::HighPass => high,
            FilterMode::BandPass => self.band,
            _ => self.low,
        }
    }

    /// Reset filter state.
    pub fn reset(&mut self) {
        self.low = 0.0;
        self.band = 0.0;
    }
}
