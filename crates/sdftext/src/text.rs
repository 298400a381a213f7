// this_file: crates/sdftext/src/text.rs

//! Shaped text: code points in, glyph runs out
//!
//! A [`Text`] is the flat result of shaping one string against one font.
//! The string is cut into runs, each run picks a face and goes through the
//! shaper, and the glyphs of every run land in one shared array. Ranges
//! describe which characters and glyphs belong to which run.
//!
//! Glyph metrics are stored in em units (font units divided by units per
//! em), which is also the unit the glyph cache reports bounds in.

use sdftext_core::{
    error::{Result, ShapingError, TextError},
    traits::{FontRef, GlyphTexture},
    types::{Direction, GlyphId, ShapingParams, Vec2},
};
use sdftext_unicode::{find_bidi_runs, ScriptClassifier, ScriptRun, TextInput};

use crate::font::Font;
use crate::registry::Face;
use crate::scratch::ScratchArena;

/// How a string is cut into shaping runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Segmentation {
    /// Script changes only; direction follows the run's script
    #[default]
    Script,
    /// Bidi runs first, then script changes inside each of them
    Bidi,
}

/// One shaped glyph
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextGlyph {
    pub glyph_id: GlyphId,
    /// Character this glyph came from, as an index into the whole text
    pub char_index: usize,
    /// A line may break before this glyph without reshaping
    pub can_break: bool,
    /// Offset from the pen, y down
    pub offset: Vec2,
    /// Pen advance; negative inside backward ranges
    pub advance: f32,
}

/// One shaping run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRange {
    /// Index of the face inside the font
    pub face: u32,
    pub first_char: usize,
    pub char_count: usize,
    pub first_glyph: usize,
    pub glyph_count: usize,
    /// The run reads right to left
    pub backward: bool,
}

/// Glyphs produced by one character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharMapping {
    pub first_glyph: usize,
    pub glyph_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    font_id: u64,
    characters: Vec<char>,
    glyphs: Vec<TextGlyph>,
    ranges: Vec<TextRange>,
    char_mappings: Vec<CharMapping>,
}

/// Characters that end a line without taking any room
pub fn is_line_separator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

impl Text {
    /// Shape `input` with `font`
    ///
    /// Malformed input is a format error. Shaping failures abort the whole
    /// call; no partially shaped text is returned.
    pub fn create<'a, T: GlyphTexture>(
        font: &Font<T>,
        input: impl Into<TextInput<'a>>,
        segmentation: Segmentation,
    ) -> Result<Self> {
        let input = input.into();
        let registry = font.registry();

        let text = registry.with_lock(|state| {
            let result = shape_locked(
                font,
                registry.classifier(),
                &mut state.scratch,
                input,
                segmentation,
            );
            state.scratch.reset();
            result
        })?;

        log::debug!(
            "Shaped {} characters into {} glyphs across {} ranges",
            text.characters.len(),
            text.glyphs.len(),
            text.ranges.len()
        );
        Ok(text)
    }

    /// Id of the font the text was shaped with
    pub fn font_id(&self) -> u64 {
        self.font_id
    }

    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    pub fn glyphs(&self) -> &[TextGlyph] {
        &self.glyphs
    }

    pub fn ranges(&self) -> &[TextRange] {
        &self.ranges
    }

    pub fn char_mappings(&self) -> &[CharMapping] {
        &self.char_mappings
    }

    pub fn char_count(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Index of the range holding glyph `glyph`
    pub fn range_of_glyph(&self, glyph: usize) -> Option<usize> {
        let index = self
            .ranges
            .partition_point(|range| range.first_glyph + range.glyph_count <= glyph);
        (index < self.ranges.len()).then_some(index)
    }
}

fn shape_locked<T: GlyphTexture>(
    font: &Font<T>,
    classifier: &ScriptClassifier,
    scratch: &mut ScratchArena,
    input: TextInput<'_>,
    segmentation: Segmentation,
) -> Result<Text> {
    let ScratchArena {
        chars,
        bidi_runs,
        script_runs,
    } = scratch;

    input.decode_into(chars)?;
    let mut text = Text {
        font_id: font.id(),
        ..Text::default()
    };
    if chars.is_empty() {
        return Ok(text);
    }

    text.characters
        .try_reserve_exact(chars.len())
        .map_err(|_| TextError::out_of_memory("text characters"))?;
    text.characters.extend_from_slice(chars);
    text.glyphs
        .try_reserve(chars.len())
        .map_err(|_| TextError::out_of_memory("text glyphs"))?;

    match segmentation {
        Segmentation::Script => {
            classifier.script_runs(chars, script_runs);
            for run in script_runs.iter() {
                let direction = classifier.direction_of(run.script);
                shape_run(font, classifier, &mut text, *run, 0, direction)?;
            }
        }
        Segmentation::Bidi => {
            find_bidi_runs(chars, bidi_runs);
            for bidi in bidi_runs.iter() {
                let span = &chars[bidi.start..bidi.start + bidi.count];
                classifier.script_runs(span, script_runs);
                for run in script_runs.iter() {
                    shape_run(font, classifier, &mut text, *run, bidi.start, bidi.direction)?;
                }
            }
        }
    }

    text.char_mappings = map_characters(text.characters.len(), &text.glyphs)?;
    check_ranges(&text)?;
    Ok(text)
}

/// First face that has a glyph for `ch`, or the primary face
fn select_face(faces: &[std::sync::Arc<Face>], ch: char) -> usize {
    faces
        .iter()
        .position(|face| face.font().has_glyph(ch))
        .unwrap_or(0)
}

fn shape_run<T: GlyphTexture>(
    font: &Font<T>,
    classifier: &ScriptClassifier,
    text: &mut Text,
    run: ScriptRun,
    base: usize,
    direction: Direction,
) -> Result<()> {
    let first_char = base + run.start;
    let span = &text.characters[first_char..first_char + run.count];
    let face_index = select_face(font.faces(), span[0]);
    let face = &font.faces()[face_index];
    let face_font: &dyn FontRef = face.font();

    let params = ShapingParams {
        direction,
        script: Some(classifier.iso15924_tag(run.script)),
        language: None,
    };
    let shaped = font.registry().shaper().shape(span, face_font, &params)?;

    let upem = f32::from(face_font.units_per_em().max(1));
    let backward = direction.is_backward();
    let first_glyph = text.glyphs.len();
    text.glyphs
        .try_reserve(shaped.glyphs.len())
        .map_err(|_| ShapingError::BufferExhausted)?;

    let mut push = |glyph: &sdftext_core::types::ShapedGlyph| {
        let local = (glyph.cluster as usize).min(run.count - 1);
        let char_index = first_char + local;
        let magnitude = if is_line_separator(text.characters[char_index]) {
            0.0
        } else {
            (glyph.x_advance as f32 / upem).abs()
        };
        text.glyphs.push(TextGlyph {
            glyph_id: glyph.glyph_id,
            char_index,
            can_break: !glyph.unsafe_to_break,
            offset: Vec2::new(glyph.x_offset as f32 / upem, -(glyph.y_offset as f32) / upem),
            advance: if backward { -magnitude } else { magnitude },
        });
    };

    // Shapers report visual order; keep glyphs in reading order.
    if backward {
        shaped.glyphs.iter().rev().for_each(&mut push);
    } else {
        shaped.glyphs.iter().for_each(&mut push);
    }

    text.ranges.push(TextRange {
        face: face_index as u32,
        first_char,
        char_count: run.count,
        first_glyph,
        glyph_count: text.glyphs.len() - first_glyph,
        backward,
    });

    log::trace!(
        "Shaped run {}..{} with face '{}' ({:?}, {:?})",
        first_char,
        first_char + run.count,
        face.name(),
        run.script,
        direction
    );
    Ok(())
}

fn map_characters(char_count: usize, glyphs: &[TextGlyph]) -> Result<Vec<CharMapping>> {
    let mut mappings = Vec::new();
    mappings
        .try_reserve_exact(char_count)
        .map_err(|_| TextError::out_of_memory("character mappings"))?;
    mappings.resize(char_count, CharMapping::default());

    for (index, glyph) in glyphs.iter().enumerate() {
        let mapping = &mut mappings[glyph.char_index];
        if mapping.glyph_count == 0 {
            mapping.first_glyph = index;
        }
        mapping.glyph_count += 1;
    }

    // Characters folded into a neighbour's cluster point at the next glyph
    let mut next = glyphs.len();
    for mapping in mappings.iter_mut().rev() {
        if mapping.glyph_count == 0 {
            mapping.first_glyph = next;
        } else {
            next = mapping.first_glyph;
        }
    }

    Ok(mappings)
}

fn check_ranges(text: &Text) -> Result<()> {
    let mut next_char = 0;
    let mut next_glyph = 0;
    for (index, range) in text.ranges.iter().enumerate() {
        if range.first_char != next_char || range.first_glyph != next_glyph {
            return Err(ShapingError::InconsistentRanges(format!(
                "range {} starts at char {} glyph {}, expected {} and {}",
                index, range.first_char, range.first_glyph, next_char, next_glyph
            ))
            .into());
        }
        next_char += range.char_count;
        next_glyph += range.glyph_count;
    }

    if next_char != text.characters.len() || next_glyph != text.glyphs.len() {
        return Err(ShapingError::InconsistentRanges(format!(
            "ranges cover {} chars and {} glyphs of {} and {}",
            next_char,
            next_glyph,
            text.characters.len(),
            text.glyphs.len()
        ))
        .into());
    }
    Ok(())
}
