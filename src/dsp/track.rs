//! Track renderer: sequences one track and runs its effects chain.
//!
//! Walks song positions → rows → note slots in a single pass. Effect
//! commands rewrite the track's working copy of the instrument as they
//! are reached, so every row reads the register state in force at that
//! row. Filter and delay state live for the whole render.

use rand::Rng;

use crate::instrument::{Instrument, Param, REGISTER_COUNT};
use crate::song::{EffectCommand, NOTE_SLOTS, Song, Track};

use super::channel::ChannelBuffer;
use super::effects::{EffectsChain, RowEffects};
use super::note_cache::NoteCache;
use super::voice::render_note_clipped;

/// Counters collected while rendering a track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackStats {
    /// Notes triggered, cached or not.
    pub notes_played: usize,
    /// Notes actually synthesized (cache misses).
    pub notes_rendered: usize,
    pub cache_invalidations: usize,
    pub commands_applied: usize,
}

/// Renders one track of a song into its own channel buffer.
pub struct TrackRenderer<'a> {
    song: &'a Song,
    track: &'a Track,
    instrument: Instrument,
    cache: NoteCache,
    chain: EffectsChain,
    channel: ChannelBuffer,
    stats: TrackStats,
}

impl<'a> TrackRenderer<'a> {
    pub fn new(song: &'a Song, track: &'a Track) -> Self {
        TrackRenderer {
            song,
            track,
            instrument: track.instrument.clone(),
            cache: NoteCache::new(),
            chain: EffectsChain::new(),
            channel: ChannelBuffer::new(song.frames()),
            stats: TrackStats::default(),
        }
    }

    /// Render the whole track. The returned buffer is the processed stereo
    /// output, i.e. this track's contribution to the mix.
    pub fn render<R: Rng + ?Sized>(self, noise: &mut R) -> ChannelBuffer {
        self.render_with_stats(noise).0
    }

    pub fn render_with_stats<R: Rng + ?Sized>(mut self, noise: &mut R) -> (ChannelBuffer, TrackStats) {
        let track = self.track;
        // Anything past the song end is never heard
        let max_note_len = self.song.frames();
        let row_len = self.song.row_len as usize;
        let pattern_len = self.song.pattern_len as usize;

        for position in 0..self.song.positions() {
            let column = track.column_at(position);
            if column.is_none() && track.pattern_at(position) != 0 {
                tracing::warn!(
                    position,
                    pattern = track.pattern_at(position),
                    "pattern missing, position plays silence"
                );
            }

            for row in 0..pattern_len {
                if let Some(cmd) = column.and_then(|c| c.effect(row, pattern_len)) {
                    self.apply(cmd);
                }

                let fx = RowEffects::from_instrument(&self.instrument, self.song.row_len);
                let row_start = (position * pattern_len + row) * row_len;

                if let Some(column) = column {
                    for slot in 0..NOTE_SLOTS {
                        let note = column.note(row, slot, pattern_len);
                        if note == 0 {
                            continue;
                        }
                        let instrument = &self.instrument;
                        let row_len = self.song.row_len;
                        let buf = self
                            .cache
                            .get_or_render(note, || {
                                render_note_clipped(instrument, note, row_len, max_note_len, &mut *noise)
                            });
                        self.channel.add_note(row_start, buf);
                        self.stats.notes_played += 1;
                    }
                }

                for frame in row_start..row_start + row_len {
                    self.chain.process(&fx, &mut self.channel, frame);
                }
            }
        }

        self.stats.notes_rendered = self.cache.renders();
        self.stats.cache_invalidations = self.cache.invalidations();
        (self.channel, self.stats)
    }

    /// Write a register and drop cached notes if the tone changed.
    fn apply(&mut self, cmd: EffectCommand) {
        if !self.instrument.write_register(cmd.register, cmd.value) {
            tracing::warn!(
                register = cmd.register,
                limit = REGISTER_COUNT,
                "effect command ignored, register out of range"
            );
            return;
        }
        self.stats.commands_applied += 1;

        let param = Param::from_index(cmd.register);
        if param.is_some_and(Param::affects_tone) {
            tracing::trace!(?param, value = cmd.value, "tone changed, clearing note cache");
            self.cache.invalidate();
        }
    }
}
