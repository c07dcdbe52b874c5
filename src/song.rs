//! Song model: tracks, pattern sequences and note/effect columns.
//!
//! These types map directly to the compact song JSON produced by the
//! editor: `songData[].i` is the instrument register, `p` the pattern
//! sequence and `c` the pattern columns with notes `n` and effects `f`.

use serde::{Deserialize, Serialize};

use crate::error::{SongError, SongResult};
use crate::instrument::{Instrument, REGISTER_COUNT};

/// Output sample rate. Songs are authored against it and it cannot change.
pub const SAMPLE_RATE: u32 = 44_100;

/// Simultaneous note slots per pattern row.
pub const NOTE_SLOTS: usize = 4;

/// Output channels (interleaved stereo).
pub const OUTPUT_CHANNELS: usize = 2;

// ── Song ────────────────────────────────────────────────────

/// A complete song, supplied in full before rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// One track per channel.
    #[serde(rename = "songData")]
    pub tracks: Vec<Track>,
    /// Samples per row.
    pub row_len: u32,
    /// Rows per pattern.
    pub pattern_len: u32,
    /// Last sequence position to render (inclusive).
    pub end_pattern: u32,
    /// Number of tracks to render.
    pub num_channels: u32,
}

impl Song {
    /// Create an empty song with the given timing.
    pub fn new(row_len: u32, pattern_len: u32, end_pattern: u32) -> Self {
        Song {
            tracks: Vec::new(),
            row_len,
            pattern_len,
            end_pattern,
            num_channels: 0,
        }
    }

    /// Append a track and count it as a rendered channel.
    pub fn push_track(&mut self, track: Track) {
        self.tracks.push(track);
        self.num_channels += 1;
    }

    /// Parse song JSON and validate its structure.
    pub fn from_json(source: &str) -> SongResult<Song> {
        let song: Song = serde_json::from_str(source)?;
        song.validate()?;
        Ok(song)
    }

    pub fn to_json(&self) -> SongResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number of sequence positions rendered.
    pub fn positions(&self) -> usize {
        self.end_pattern as usize + 1
    }

    /// Total rendered length in stereo frames.
    pub fn frames(&self) -> usize {
        self.row_len as usize * self.pattern_len as usize * self.positions()
    }

    /// Tracks that take part in rendering (the first `numChannels`).
    pub fn rendered_tracks(&self) -> &[Track] {
        let n = (self.num_channels as usize).min(self.tracks.len());
        &self.tracks[..n]
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / SAMPLE_RATE as f64
    }

    /// Check the references the renderer would otherwise silently skip.
    pub fn validate(&self) -> SongResult<()> {
        let declared = self.num_channels as usize;
        if declared > self.tracks.len() {
            return Err(SongError::MissingTracks {
                declared,
                available: self.tracks.len(),
            });
        }

        let pattern_len = self.pattern_len as usize;
        for (t, track) in self.rendered_tracks().iter().enumerate() {
            for position in 0..self.positions() {
                let pattern = track.pattern_at(position);
                if pattern != 0 && track.column(pattern).is_none() {
                    return Err(SongError::MissingPattern {
                        track: t,
                        position,
                        pattern,
                        available: track.columns.len(),
                    });
                }
            }

            for (c, column) in track.columns.iter().enumerate() {
                for row in 0..pattern_len {
                    if let Some(cmd) = column.effect(row, pattern_len) {
                        if cmd.register >= REGISTER_COUNT {
                            return Err(SongError::InvalidRegister {
                                track: t,
                                pattern: c + 1,
                                row,
                                register: cmd.register,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Summary of the rendered output shape.
    pub fn info(&self) -> SongInfo {
        SongInfo {
            sample_rate: SAMPLE_RATE,
            channels: OUTPUT_CHANNELS,
            frames: self.frames(),
            tracks: self.rendered_tracks().len(),
            duration_secs: self.duration_secs(),
        }
    }
}

/// Output shape of a song, reported to callers before rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongInfo {
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    pub tracks: usize,
    pub duration_secs: f64,
}

// ── Track ───────────────────────────────────────────────────

/// One channel: instrument, pattern sequence and pattern columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "i")]
    pub instrument: Instrument,
    /// Pattern index per song position; 0 or missing is silence.
    #[serde(rename = "p", default)]
    pub sequence: Vec<Option<u32>>,
    /// Pattern `k` lives at `columns[k - 1]`.
    #[serde(rename = "c", default)]
    pub columns: Vec<Column>,
}

impl Track {
    pub fn new(instrument: Instrument) -> Self {
        Track {
            instrument,
            sequence: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Pattern index at a song position (0 = silent).
    pub fn pattern_at(&self, position: usize) -> usize {
        self.sequence
            .get(position)
            .copied()
            .flatten()
            .unwrap_or(0) as usize
    }

    /// Column data for a 1-based pattern index.
    pub fn column(&self, pattern: usize) -> Option<&Column> {
        pattern.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    /// Column data playing at a song position, if any.
    pub fn column_at(&self, position: usize) -> Option<&Column> {
        self.column(self.pattern_at(position))
    }
}

// ── Column ──────────────────────────────────────────────────

/// One pattern's notes and effect commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Notes, addressed `row + slot * pattern_len`. 0 or missing is no note.
    #[serde(rename = "n", default)]
    pub notes: Vec<Option<u32>>,
    /// Effect commands: `f[row]` is the 1-based target register,
    /// `f[row + pattern_len]` the value written.
    #[serde(rename = "f", default)]
    pub effects: Vec<Option<i32>>,
}

impl Column {
    /// Empty column sized for `pattern_len` rows.
    pub fn new(pattern_len: usize) -> Self {
        Column {
            notes: vec![None; pattern_len * NOTE_SLOTS],
            effects: vec![None; pattern_len * 2],
        }
    }

    /// Note at a row and slot (0 = none).
    pub fn note(&self, row: usize, slot: usize, pattern_len: usize) -> u32 {
        self.notes
            .get(row + slot * pattern_len)
            .copied()
            .flatten()
            .unwrap_or(0)
    }

    pub fn set_note(&mut self, row: usize, slot: usize, pattern_len: usize, note: u32) {
        let index = row + slot * pattern_len;
        if self.notes.len() <= index {
            self.notes.resize(index + 1, None);
        }
        self.notes[index] = Some(note);
    }

    /// Effect command on a row, if any.
    pub fn effect(&self, row: usize, pattern_len: usize) -> Option<EffectCommand> {
        let target = self.effects.get(row).copied().flatten().unwrap_or(0);
        if target <= 0 {
            return None;
        }
        let value = self
            .effects
            .get(row + pattern_len)
            .copied()
            .flatten()
            .unwrap_or(0);
        Some(EffectCommand {
            register: target as usize - 1,
            value,
        })
    }

    pub fn set_effect(&mut self, row: usize, pattern_len: usize, cmd: EffectCommand) {
        let len = (row + pattern_len + 1).max(pattern_len * 2);
        if self.effects.len() < len {
            self.effects.resize(len, None);
        }
        self.effects[row] = Some(cmd.register as i32 + 1);
        self.effects[row + pattern_len] = Some(cmd.value);
    }
}

/// Register write triggered by a pattern row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectCommand {
    /// 0-based register index.
    pub register: usize,
    pub value: i32,
}

impl EffectCommand {
    pub fn new(register: usize, value: i32) -> Self {
        EffectCommand { register, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::Param;
    use pretty_assertions::assert_eq;

    const SONG_JSON: &str = r#"{
        "songData": [
            {
                "i": [0, 255, 116, 64, 0, 255, 120, 0, 64, 127, 4, 6, 35, 0, 0, 0,
                      0, 0, 0, 0, 2, 14, 0, 10, 32, 0, 0, 0, 0],
                "p": [1, 1, null, 2],
                "c": [
                    {"n": [147, null, 150], "f": [25, null, null, 64]},
                    {"n": [], "f": []}
                ]
            }
        ],
        "rowLen": 5513,
        "patternLen": 3,
        "endPattern": 3,
        "numChannels": 1
    }"#;

    #[test]
    fn parses_editor_json() {
        let song = Song::from_json(SONG_JSON).unwrap();
        assert_eq!(song.tracks.len(), 1);
        assert_eq!(song.row_len, 5513);
        let track = &song.tracks[0];
        assert_eq!(track.instrument.get(Param::Osc1Volume), 255);
        assert_eq!(track.instrument.get(Param::FilterMode), 2);
        assert_eq!(track.pattern_at(0), 1);
        assert_eq!(track.pattern_at(2), 0);
        assert_eq!(track.pattern_at(3), 2);
        assert_eq!(track.pattern_at(99), 0);
    }

    #[test]
    fn column_addressing() {
        let song = Song::from_json(SONG_JSON).unwrap();
        let column = song.tracks[0].column(1).unwrap();
        assert_eq!(column.note(0, 0, 3), 147);
        assert_eq!(column.note(1, 0, 3), 0);
        assert_eq!(column.note(2, 0, 3), 150);
        assert_eq!(column.note(0, 3, 3), 0);
        assert_eq!(column.effect(0, 3), Some(EffectCommand::new(24, 64)));
        assert_eq!(column.effect(1, 3), None);
    }

    #[test]
    fn frames_cover_every_position() {
        let song = Song::from_json(SONG_JSON).unwrap();
        assert_eq!(song.frames(), 5513 * 3 * 4);
        let info = song.info();
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 44_100);
        assert_eq!(info.tracks, 1);
    }

    #[test]
    fn json_roundtrip_preserves_song() {
        let song = Song::from_json(SONG_JSON).unwrap();
        let json = song.to_json().unwrap();
        let back = Song::from_json(&json).unwrap();
        assert_eq!(back, song);
    }

    #[test]
    fn rejects_missing_tracks() {
        let mut song = Song::new(100, 1, 0);
        song.push_track(Track::default());
        song.num_channels = 2;
        assert!(matches!(
            song.validate(),
            Err(SongError::MissingTracks { declared: 2, available: 1 })
        ));
    }

    #[test]
    fn rejects_missing_pattern() {
        let mut song = Song::new(100, 1, 1);
        let mut track = Track::default();
        track.sequence = vec![None, Some(3)];
        track.columns.push(Column::new(1));
        song.push_track(track);
        assert!(matches!(
            song.validate(),
            Err(SongError::MissingPattern { track: 0, position: 1, pattern: 3, available: 1 })
        ));
    }

    #[test]
    fn rejects_out_of_range_register() {
        let mut song = Song::new(100, 2, 0);
        let mut column = Column::new(2);
        column.set_effect(1, 2, EffectCommand::new(40, 1));
        let mut track = Track::default();
        track.sequence = vec![Some(1)];
        track.columns.push(column);
        song.push_track(track);
        assert!(matches!(
            song.validate(),
            Err(SongError::InvalidRegister { register: 40, row: 1, .. })
        ));
    }

    #[test]
    fn set_effect_roundtrips() {
        let mut column = Column::new(4);
        column.set_effect(2, 4, EffectCommand::new(Param::Osc1Volume.index(), 99));
        assert_eq!(column.effect(2, 4), Some(EffectCommand::new(1, 99)));
        assert_eq!(column.effects.len(), 8);
    }

    #[test]
    fn syntax_error_is_json_error() {
        let err = Song::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SongError::Json(_)));
    }
}
