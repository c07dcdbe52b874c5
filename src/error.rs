use std::ops::Range;

use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Result type for song loading.
pub type SongResult<T> = Result<T, SongError>;

/// Errors raised while loading a song. Rendering itself never fails.
#[derive(Debug, Error)]
pub enum SongError {
    /// The song text is not valid song JSON.
    #[error("invalid song JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `numChannels` asks for more tracks than `songData` defines.
    #[error("song declares {declared} channels but defines {available} tracks")]
    MissingTracks { declared: usize, available: usize },

    /// A sequence entry points at a pattern the track does not have.
    #[error("track {track}, position {position}: pattern {pattern} does not exist ({available} defined)")]
    MissingPattern {
        track: usize,
        position: usize,
        pattern: usize,
        available: usize,
    },

    /// An effect command targets a register outside the instrument.
    #[error("track {track}, pattern {pattern}, row {row}: effect targets register {register}, instruments have 32")]
    InvalidRegister {
        track: usize,
        pattern: usize,
        row: usize,
        register: usize,
    },
}

impl SongError {
    /// Byte range in the source text this error points at, if known.
    fn span(&self, source: &str) -> Option<Range<usize>> {
        let SongError::Json(e) = self else {
            return None;
        };
        if e.line() == 0 {
            return None;
        }
        let line_start: usize = source
            .split_inclusive('\n')
            .take(e.line() - 1)
            .map(str::len)
            .sum();
        let mut offset = (line_start + e.column().saturating_sub(1)).min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let end = source[offset..]
            .chars()
            .next()
            .map_or(offset, |c| offset + c.len_utf8());
        Some(offset..end)
    }

    /// Render a human-readable diagnostic against the song source.
    pub fn report(&self, name: &str, source: &str) -> String {
        let span = self.span(source);
        let mut builder = Report::build(ReportKind::Error, (name, span.clone().unwrap_or(0..0)))
            .with_config(
                Config::default()
                    .with_color(false)
                    .with_index_type(IndexType::Byte),
            )
            .with_message(self.to_string());
        if let (Some(span), SongError::Json(e)) = (span, self) {
            builder = builder.with_label(Label::new((name, span)).with_message(json_hint(e)));
        }

        let mut out = Vec::new();
        if builder.finish().write((name, Source::from(source)), &mut out).is_err() {
            return self.to_string();
        }
        String::from_utf8_lossy(&out).into_owned()
    }
}

fn json_hint(e: &serde_json::Error) -> &'static str {
    use serde_json::error::Category;
    match e.classify() {
        Category::Syntax => "syntax error here",
        Category::Data => "unexpected value here",
        Category::Eof => "input ends here",
        Category::Io => "read failed here",
    }
}
