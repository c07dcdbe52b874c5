//! Audio engine: renders every track of a song and mixes the result.
//!
//! Tracks are independent. Each one gets its own noise stream, picked by
//! track index from the engine seed, so a track sounds the same whether
//! it renders first, last or on another thread.

use rand_pcg::Pcg32;

use crate::song::Song;

use super::channel::ChannelBuffer;
use super::mixer::{MixBuffer, RenderedAudio};
use super::track::{TrackRenderer, TrackStats};

/// Seed used by [`AudioEngine::new`].
pub const DEFAULT_SEED: u64 = 0x5EED_B0C5;

/// Noise generator for one track. The track index selects the PCG stream.
pub fn track_rng(seed: u64, index: usize) -> Pcg32 {
    Pcg32::new(seed, index as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioEngine {
    seed: u64,
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        AudioEngine { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Render one of the song's rendered tracks on its own.
    ///
    /// Returns `None` when `index` is past `numChannels` or the track list.
    pub fn render_track(&self, song: &Song, index: usize) -> Option<(ChannelBuffer, TrackStats)> {
        let track = song.rendered_tracks().get(index)?;
        let mut noise = track_rng(self.seed, index);
        let (channel, stats) = TrackRenderer::new(song, track).render_with_stats(&mut noise);
        tracing::debug!(
            track = index,
            frames = channel.frames(),
            notes_played = stats.notes_played,
            notes_rendered = stats.notes_rendered,
            cache_invalidations = stats.cache_invalidations,
            "rendered track"
        );
        Some((channel, stats))
    }

    /// Render all tracks and sum them into a mix buffer.
    pub fn render(&self, song: &Song) -> MixBuffer {
        let tracks = song.rendered_tracks().len();
        let mut mix = MixBuffer::new(song.frames());

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let channels: Vec<ChannelBuffer> = (0..tracks)
                .into_par_iter()
                .filter_map(|i| self.render_track(song, i).map(|(c, _)| c))
                .collect();
            for channel in &channels {
                mix.add_channel(channel);
            }
        }

        #[cfg(not(feature = "parallel"))]
        for i in 0..tracks {
            if let Some((channel, _)) = self.render_track(song, i) {
                mix.add_channel(&channel);
            }
        }

        tracing::debug!(tracks, frames = mix.frames(), "song mixed");
        mix
    }

    /// Render and normalize to floating-point stereo.
    pub fn render_audio(&self, song: &Song) -> RenderedAudio {
        self.render(song).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::voice::render_note;
    use crate::instrument::{Instrument, Param};
    use crate::song::{Column, Track};

    const NOTE: u32 = 147;

    /// Sine pair, sustain only, filter off, unity drive, no pan or delay.
    fn clean_instrument() -> Instrument {
        Instrument::default()
            .with(Param::Osc1Volume, 100)
            .with(Param::Osc1Semitone, 128)
            .with(Param::Osc2Volume, 60)
            .with(Param::Osc2Semitone, 128)
            .with(Param::Sustain, 5)
            .with(Param::Drive, 32)
    }

    fn track_with_note(instrument: Instrument, pattern_len: usize, row: usize, note: u32) -> Track {
        let mut column = Column::new(pattern_len);
        column.set_note(row, 0, pattern_len, note);
        let mut track = Track::new(instrument);
        track.sequence = vec![Some(1)];
        track.columns.push(column);
        track
    }

    fn noisy_song() -> Song {
        let noisy = clean_instrument()
            .with(Param::NoiseVolume, 80)
            .with(Param::FilterMode, 2)
            .with(Param::FilterCutoff, 90)
            .with(Param::DelayTime, 2)
            .with(Param::DelayAmount, 100);
        let mut song = Song::new(400, 4, 1);
        song.push_track(track_with_note(noisy.clone(), 4, 0, NOTE));
        song.push_track(track_with_note(noisy, 4, 1, NOTE + 5));
        song.push_track(track_with_note(clean_instrument(), 4, 2, NOTE - 12));
        song
    }

    #[test]
    fn single_note_end_to_end() {
        let mut song = Song::new(100, 1, 0);
        song.push_track(track_with_note(clean_instrument(), 1, 0, NOTE));
        let mix = AudioEngine::new().render(&song);
        assert_eq!(mix.as_slice().len(), 200);

        let mut silent = Pcg32::new(0, 0);
        let note = render_note(&clean_instrument(), NOTE, 100, &mut silent);
        assert!(note.iter().any(|&s| s != 0));
        for (j, &s) in note.iter().enumerate() {
            let half = (s as f64 * 0.5).trunc() as i32;
            assert_eq!(mix.as_slice()[2 * j], half, "left {j}");
            assert_eq!(mix.as_slice()[2 * j + 1], half, "right {j}");
        }
    }

    #[test]
    fn same_seed_is_reproducible() {
        let song = noisy_song();
        let a = AudioEngine::with_seed(42).render(&song);
        let b = AudioEngine::with_seed(42).render(&song);
        assert_eq!(a, b);
    }

    #[test]
    fn seed_changes_noise() {
        let song = noisy_song();
        let a = AudioEngine::with_seed(1).render(&song);
        let b = AudioEngine::with_seed(2).render(&song);
        assert_ne!(a, b);
    }

    #[test]
    fn seed_is_irrelevant_without_noise() {
        let mut song = Song::new(200, 2, 0);
        song.push_track(track_with_note(clean_instrument(), 2, 0, NOTE));
        let a = AudioEngine::with_seed(1).render(&song);
        let b = AudioEngine::with_seed(99).render(&song);
        assert_eq!(a, b);
    }

    #[test]
    fn mix_is_sum_of_tracks() {
        let song = noisy_song();
        let engine = AudioEngine::with_seed(7);
        let mut expected = MixBuffer::new(song.frames());
        for i in 0..song.tracks.len() {
            let (channel, _) = engine.render_track(&song, i).unwrap();
            expected.add_channel(&channel);
        }
        assert_eq!(engine.render(&song), expected);
    }

    #[test]
    fn tracks_past_num_channels_are_skipped() {
        let mut song = noisy_song();
        let engine = AudioEngine::with_seed(7);
        let full = engine.render(&song);
        song.num_channels = 2;
        assert!(engine.render_track(&song, 2).is_none());
        let (third, _) = AudioEngine::with_seed(7)
            .render_track(&noisy_song(), 2)
            .unwrap();
        let mut partial = engine.render(&song);
        partial.add_channel(&third);
        assert_eq!(partial, full);
    }

    #[test]
    fn track_streams_are_independent() {
        let mut a = track_rng(5, 0);
        let mut b = track_rng(5, 1);
        let xs: Vec<u32> = (0..8).map(|_| rand::RngCore::next_u32(&mut a)).collect();
        let ys: Vec<u32> = (0..8).map(|_| rand::RngCore::next_u32(&mut b)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn render_audio_matches_song_shape() {
        let song = noisy_song();
        let audio = AudioEngine::new().render_audio(&song);
        let info = song.info();
        assert_eq!(audio.frames(), info.frames);
        assert_eq!(audio.right.len(), info.frames);
        assert_eq!(audio.sample_rate, info.sample_rate);
        assert!(audio.peak() > 0.0);
    }
}
