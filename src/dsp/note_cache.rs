//! Per-track cache of rendered notes, keyed by pitch.

use std::collections::HashMap;

/// Rendered note buffers for one track render.
///
/// Entries stay valid only while the tone registers are unchanged; the
/// track renderer calls [`NoteCache::invalidate`] on every tone write.
#[derive(Debug, Default)]
pub struct NoteCache {
    notes: HashMap<u32, Vec<i32>>,
    renders: usize,
    invalidations: usize,
}

impl NoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached buffer for `note`, rendering it with `render` on a miss.
    pub fn get_or_render<F>(&mut self, note: u32, render: F) -> &[i32]
    where
        F: FnOnce() -> Vec<i32>,
    {
        let renders = &mut self.renders;
        self.notes.entry(note).or_insert_with(|| {
            *renders += 1;
            render()
        })
    }

    /// Drop every cached buffer.
    pub fn invalidate(&mut self) {
        self.notes.clear();
        self.invalidations += 1;
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Number of cache misses so far.
    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations
    }
}
