// this_file: crates/sdftext-unicode/src/lib.rs

//! Unicode services for the shaper: decoding, script runs and bidi runs.
//!
//! Two ways of cutting text into runs live side by side. [`ScriptClassifier::script_runs`]
//! is the quick heuristic: a new run starts whenever a "unique" script shows up
//! that differs from the one already open. [`find_bidi_runs`] runs the full
//! Unicode bidirectional algorithm first. Callers pick one; the shaper can do
//! both in sequence.

mod decode;

pub use decode::TextInput;
pub use icu_properties::props::Script;

use icu_properties::{CodePointMapData, CodePointMapDataBorrowed};
use sdftext_core::types::Direction;
use unicode_bidi::BidiInfo;

/// Looks up Unicode script properties with ICU data baked in.
pub struct ScriptClassifier {
    script_map: CodePointMapDataBorrowed<'static, Script>,
}

/// A maximal span of characters sharing one unique script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRun {
    pub start: usize,
    pub count: usize,
    /// First unique script in the run, or `Common` when it has none
    pub script: Script,
    /// Index of the character that fixed `script`, or `start`
    pub first_unique: usize,
}

impl ScriptClassifier {
    pub fn new() -> Self {
        Self {
            script_map: CodePointMapData::<Script>::new(),
        }
    }

    /// Script of a code point
    ///
    /// ASCII whitespace reports `Inherited` so it always folds into the run
    /// it sits in.
    pub fn script_of(&self, ch: char) -> Script {
        if ch.is_ascii_whitespace() {
            return Script::Inherited;
        }
        self.script_map.get(ch)
    }

    /// Whether a script is specific enough to open a run of its own
    pub fn is_unique_script(&self, script: Script) -> bool {
        !matches!(script, Script::Common | Script::Inherited | Script::Unknown)
    }

    /// Natural writing direction of a script
    pub fn direction_of(&self, script: Script) -> Direction {
        match script {
            Script::Arabic
            | Script::Hebrew
            | Script::Syriac
            | Script::Thaana
            | Script::Nko
            | Script::Samaritan
            | Script::Mandaic
            | Script::Adlam => Direction::RightToLeft,
            _ => Direction::LeftToRight,
        }
    }

    /// ISO 15924 tag handed to the shaping engine
    pub fn iso15924_tag(&self, script: Script) -> [u8; 4] {
        match script {
            Script::Inherited => *b"Zinh",
            Script::Unknown => *b"Zzzz",
            Script::Adlam => *b"Adlm",
            Script::Arabic => *b"Arab",
            Script::Armenian => *b"Armn",
            Script::Bengali => *b"Beng",
            Script::Cyrillic => *b"Cyrl",
            Script::Devanagari => *b"Deva",
            Script::Ethiopic => *b"Ethi",
            Script::Georgian => *b"Geor",
            Script::Greek => *b"Grek",
            Script::Gujarati => *b"Gujr",
            Script::Gurmukhi => *b"Guru",
            Script::Hangul => *b"Hang",
            Script::Han => *b"Hani",
            Script::Hebrew => *b"Hebr",
            Script::Hiragana => *b"Hira",
            Script::Kannada => *b"Knda",
            Script::Katakana => *b"Kana",
            Script::Khmer => *b"Khmr",
            Script::Lao => *b"Laoo",
            Script::Latin => *b"Latn",
            Script::Malayalam => *b"Mlym",
            Script::Mandaic => *b"Mand",
            Script::Myanmar => *b"Mymr",
            Script::Nko => *b"Nkoo",
            Script::Oriya => *b"Orya",
            Script::Samaritan => *b"Samr",
            Script::Sinhala => *b"Sinh",
            Script::Syriac => *b"Syrc",
            Script::Tamil => *b"Taml",
            Script::Telugu => *b"Telu",
            Script::Thaana => *b"Thaa",
            Script::Thai => *b"Thai",
            Script::Tibetan => *b"Tibt",
            _ => *b"Zyyy",
        }
    }

    /// Split `chars` into script runs, replacing the contents of `runs`
    ///
    /// Characters without a unique script join whichever run they sit in;
    /// leading ones join the first run. Run indices are relative to `chars`.
    pub fn script_runs(&self, chars: &[char], runs: &mut Vec<ScriptRun>) {
        runs.clear();
        if chars.is_empty() {
            return;
        }

        let mut current = ScriptRun {
            start: 0,
            count: 0,
            script: Script::Common,
            first_unique: 0,
        };
        let mut has_unique = false;

        for (index, &ch) in chars.iter().enumerate() {
            let script = self.script_of(ch);
            if self.is_unique_script(script) {
                if !has_unique {
                    current.script = script;
                    current.first_unique = index;
                    has_unique = true;
                } else if script != current.script {
                    current.count = index - current.start;
                    runs.push(current);
                    current = ScriptRun {
                        start: index,
                        count: 0,
                        script,
                        first_unique: index,
                    };
                }
            }
        }

        current.count = chars.len() - current.start;
        runs.push(current);
    }
}

impl Default for ScriptClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// One directional run found by the bidi algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidiRun {
    pub start: usize,
    pub count: usize,
    pub direction: Direction,
    /// Paragraph separators that close this run
    pub newline_count: u32,
}

/// Paragraph separators under the bidi algorithm (class B)
pub fn is_paragraph_separator(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}' | '\u{2029}'
    )
}

/// Resolve embedding levels and cut `chars` into directional runs
///
/// Runs come back in logical order and cover every character exactly once.
/// A paragraph separator stays with the run it ends, so a new paragraph
/// always opens a new run.
pub fn find_bidi_runs(chars: &[char], runs: &mut Vec<BidiRun>) {
    runs.clear();
    if chars.is_empty() {
        return;
    }

    let text: String = chars.iter().collect();
    let bidi = BidiInfo::new(&text, None);

    let mut current: Option<BidiRun> = None;
    let mut after_separator = false;
    let mut prev = None;

    for (index, (byte, ch)) in text.char_indices().enumerate() {
        let direction = match bidi.levels.get(byte) {
            Some(level) if level.is_rtl() => Direction::RightToLeft,
            _ => Direction::LeftToRight,
        };

        let crlf = prev == Some('\r') && ch == '\n';
        prev = Some(ch);

        match current.as_mut() {
            Some(run) if crlf => {
                run.count += 1;
                continue;
            }
            Some(run) if is_paragraph_separator(ch) && !after_separator => {
                run.count += 1;
                run.newline_count += 1;
                after_separator = true;
                continue;
            }
            Some(run) if run.direction == direction && !after_separator => {
                run.count += 1;
                continue;
            }
            Some(run) => runs.push(*run),
            None => {}
        }

        let separator = is_paragraph_separator(ch);
        current = Some(BidiRun {
            start: index,
            count: 1,
            direction,
            newline_count: u32::from(separator),
        });
        after_separator = separator;
    }

    if let Some(run) = current {
        runs.push(run);
    }
    log::trace!("bidi split {} chars into {} runs", chars.len(), runs.len());
}


#[cfg(test)]
mod proptests;
