//! DSP: numeric synthesis of songs into PCM.
//!
//! Everything here is deterministic apart from the noise stream passed in
//! by the caller, so the same song and seed always render the same bytes.

pub mod channel;
pub mod delay;
pub mod effects;
pub mod engine;
pub mod envelope;
pub mod filter;
pub mod mixer;
pub mod note_cache;
pub mod oscillator;
pub mod renderer;
pub mod track;
pub mod voice;

/// Convert to `i32` the way 32-bit integer sample buffers store values:
/// truncate toward zero, wrap modulo 2^32, and map NaN/infinity to 0.
#[inline]
pub fn wrap_i32(x: f64) -> i32 {
    if !x.is_finite() {
        return 0;
    }
    let t = x.trunc();
    if t.abs() < 9.0e18 {
        t as i64 as i32
    } else {
        (t % 4_294_967_296.0) as i64 as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(wrap_i32(1.9), 1);
        assert_eq!(wrap_i32(-1.9), -1);
        assert_eq!(wrap_i32(0.4), 0);
    }

    #[test]
    fn wraps_past_i32_range() {
        assert_eq!(wrap_i32(2_147_483_648.0), i32::MIN);
        assert_eq!(wrap_i32(4_294_967_301.0), 5);
        assert_eq!(wrap_i32(-2_147_483_649.0), i32::MAX);
    }

    #[test]
    fn non_finite_is_zero() {
        assert_eq!(wrap_i32(f64::NAN), 0);
        assert_eq!(wrap_i32(f64::INFINITY), 0);
        assert_eq!(wrap_i32(f64::NEG_INFINITY), 0);
    }
}
