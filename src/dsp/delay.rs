//! Cross-feeding stereo delay.
//!
//! The echo is read from the channel buffer's own processed history:
//! the left output picks up the right channel from `frames` ago and vice
//! versa, so echoes ping-pong between channels and decay by `feedback`
//! per bounce. History for the current frame must be read before the
//! frame is stored.

use super::channel::ChannelBuffer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delay {
    /// Delay length in stereo frames.
    pub frames: usize,
    /// Gain applied to each echo.
    pub feedback: f64,
}

impl Delay {
    /// Build from the delay-time register: `time * row_len` interleaved
    /// samples, rounded down to a whole frame.
    pub fn from_registers(time: i32, amount: i32, row_len: u32) -> Self {
        let interleaved = (time as i64 * row_len as i64).max(0) & !1;
        Delay {
            frames: (interleaved / 2) as usize,
            feedback: amount as f64 / 255.0,
        }
    }

    /// Echo contribution `(left, right)` for `frame`.
    ///
    /// Frames earlier than the delay length have no history and get
    /// nothing.
    #[inline]
    pub fn tap(&self, history: &ChannelBuffer, frame: usize) -> (f64, f64) {
        let Some(source) = frame.checked_sub(self.frames) else {
            return (0.0, 0.0);
        };
        (
            history.right(source) as f64 * self.feedback,
            history.left(source) as f64 * self.feedback,
        )
    }
}
