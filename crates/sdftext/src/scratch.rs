// this_file: crates/sdftext/src/scratch.rs

//! Reusable buffers for shaping
//!
//! Shaping a string needs a decoded character buffer and two run lists.
//! The registry owns one set of them and lends it out under its lock, so
//! repeated calls reuse the same allocations. Buffers grow to the largest
//! text seen and are cleared, never shrunk, between calls.

use sdftext_unicode::{BidiRun, ScriptRun};

#[derive(Debug, Default)]
pub struct ScratchArena {
    pub chars: Vec<char>,
    pub bidi_runs: Vec<BidiRun>,
    pub script_runs: Vec<ScriptRun>,
}

impl ScratchArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty every buffer while keeping its capacity
    pub fn reset(&mut self) {
        self.chars.clear();
        self.bidi_runs.clear();
        self.script_runs.clear();
    }

    /// Character capacity currently held
    pub fn char_capacity(&self) -> usize {
        self.chars.capacity()
    }
}
