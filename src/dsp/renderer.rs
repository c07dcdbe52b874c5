//! Raw PCM export: interleaved little-endian `f32`, no header.
//!
//! Readable by most audio tools as "raw 32-bit float, stereo, 44100 Hz".

use std::io::{self, Write};

use crate::song::Song;

use super::engine::AudioEngine;
use super::mixer::RenderedAudio;

/// Bytes per exported stereo frame.
pub const BYTES_PER_FRAME: usize = 2 * std::mem::size_of::<f32>();

/// Render a song with the given seed straight to raw bytes.
pub fn render_raw(song: &Song, seed: u64) -> Vec<u8> {
    let audio = AudioEngine::with_seed(seed).render_audio(song);
    encode_raw_f32(&audio)
}

/// Encode interleaved samples as little-endian `f32` bytes.
pub fn encode_raw_f32(audio: &RenderedAudio) -> Vec<u8> {
    let mut buf = Vec::with_capacity(audio.frames() * BYTES_PER_FRAME);
    for (l, r) in audio.left.iter().zip(&audio.right) {
        buf.extend_from_slice(&l.to_le_bytes());
        buf.extend_from_slice(&r.to_le_bytes());
    }
    buf
}

/// Stream the encoded samples to `writer`.
pub fn write_raw_f32<W: Write>(writer: &mut W, audio: &RenderedAudio) -> io::Result<()> {
    writer.write_all(&encode_raw_f32(audio))?;
    writer.flush()
}
