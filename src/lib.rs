pub mod dsp;
pub mod error;
pub mod instrument;
pub mod song;

pub use crate::dsp::engine::AudioEngine;
pub use crate::dsp::mixer::{MixBuffer, RenderedAudio};
pub use crate::error::{SongError, SongResult};
pub use crate::instrument::{Instrument, Param};
pub use crate::song::{Song, SongInfo};

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the soundbox_core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Parse song JSON, turning errors into a readable diagnostic for JS.
fn load(source: &str) -> Result<Song, JsValue> {
    Song::from_json(source).map_err(|e| JsValue::from_str(&e.report("song.json", source)))
}

/// WASM-exposed: output shape of a song (`{sampleRate, channels, frames, tracks, durationSecs}`).
#[wasm_bindgen]
pub fn song_info(source: &str) -> Result<JsValue, JsValue> {
    let song = load(source)?;
    serde_wasm_bindgen::to_value(&song.info()).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render song JSON to interleaved stereo f32 samples.
/// Returns the raw audio buffer for AudioWorklet playback.
#[wasm_bindgen]
pub fn render_song_samples(source: &str, seed: u32) -> Result<Vec<f32>, JsValue> {
    let song = load(source)?;
    let audio = AudioEngine::with_seed(seed as u64).render_audio(&song);
    Ok(audio.interleaved())
}

/// WASM-exposed: render song JSON to `{sampleRate, left, right}`.
#[wasm_bindgen]
pub fn render_song(source: &str, seed: u32) -> Result<JsValue, JsValue> {
    let song = load(source)?;
    let audio = AudioEngine::with_seed(seed as u64).render_audio(&song);
    serde_wasm_bindgen::to_value(&audio).map_err(|e| JsValue::from_str(&format!("{e}")))
}
