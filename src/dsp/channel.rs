//! Channel buffer: one track's interleaved stereo samples.
//!
//! Before a frame is processed its left slot holds the dry mono mix of
//! every note overlapping it; afterwards both slots hold the processed
//! output. The delay reads that processed output back as history.

/// Interleaved stereo `i32` buffer owned by one track render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBuffer {
    samples: Vec<i32>,
}

impl ChannelBuffer {
    /// Silent buffer of `frames` stereo frames.
    pub fn new(frames: usize) -> Self {
        ChannelBuffer {
            samples: vec![0; frames * 2],
        }
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Mix a mono note into the left slots starting at `start_frame`.
    /// Samples past the end of the buffer are dropped.
    pub fn add_note(&mut self, start_frame: usize, note: &[i32]) {
        let Some(tail) = self.samples.get_mut(start_frame * 2..) else {
            return;
        };
        for (slot, &s) in tail.iter_mut().step_by(2).zip(note) {
            *slot = slot.wrapping_add(s);
        }
    }

    /// Dry mono input of a frame that has not been processed yet.
    #[inline]
    pub fn dry(&self, frame: usize) -> i32 {
        self.samples[frame * 2]
    }

    #[inline]
    pub fn left(&self, frame: usize) -> i32 {
        self.samples[frame * 2]
    }

    #[inline]
    pub fn right(&self, frame: usize) -> i32 {
        self.samples[frame * 2 + 1]
    }

    /// Overwrite a frame with processed output.
    #[inline]
    pub fn store(&mut self, frame: usize, left: i32, right: i32) {
        self.samples[frame * 2] = left;
        self.samples[frame * 2 + 1] = right;
    }

    /// Interleaved samples.
    pub fn as_slice(&self) -> &[i32] {
        &self.samples
    }

    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0)
    }
}
