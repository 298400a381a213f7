// this_file: crates/sdftext/src/layout.rs

//! Layout: shaped glyphs in, positioned quads out
//!
//! [`TextLayout::layout`] runs in passes over the text's glyph array:
//!
//! 1. **Cache** - fetch every visible glyph from the font's atlas (under
//!    the registry lock) and scale its bounds by its style.
//! 2. **Break** - walk characters in reading order, assign each glyph a
//!    line, wrap at word starts that would overflow `max_width` and hide
//!    the whitespace left dangling at the wrap.
//! 3. **Place** - walk glyphs line by line, lay out forward glyphs left to
//!    right and backward runs back to front, then justify each line.
//! 4. **Finish** - pad geometry by the distance field margin and compute
//!    texture coordinates.
//!
//! Output coordinates are y-down with the first baseline at y = 0.

use std::sync::Arc;

use sdftext_core::{
    error::{Result, TextError},
    traits::GlyphTexture,
    types::{AlignedBox, Vec2},
};

use crate::atlas::TexturePosition;
use crate::font::{Font, GlyphInfo};
use crate::text::{is_line_separator, Text};

/// Horizontal alignment of each line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Justification {
    #[default]
    Left,
    Right,
    Center,
    /// Left for left-to-right text, right otherwise
    Start,
    /// Right for left-to-right text, left otherwise
    End,
}

impl Justification {
    /// Resolve `Start` and `End` against the reading direction
    pub fn resolve(self, backward: bool) -> Self {
        match (self, backward) {
            (Justification::Start, false) | (Justification::End, true) => Justification::Left,
            (Justification::Start, true) | (Justification::End, false) => Justification::Right,
            (other, _) => other,
        }
    }
}

/// Rendering style for a span of characters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub start: usize,
    pub count: usize,
    /// Layout units per em
    pub scale: f32,
    /// Extra stroke as a fraction of the distance field margin
    pub embolden: f32,
    /// Horizontal shear; positive leans right
    pub slant: f32,
    pub outline_position: f32,
    pub outline_thickness: f32,
    /// Edge softness for the shader
    pub anti_alias: f32,
    pub color: [u8; 4],
    pub outline_color: [u8; 4],
    /// Shift applied to glyph geometry, y down
    pub vertical_offset: f32,
}

impl TextStyle {
    pub fn new(start: usize, count: usize, scale: f32) -> Self {
        Self {
            start,
            count,
            scale,
            ..Self::default()
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            start: 0,
            count: 0,
            scale: 1.0,
            embolden: 0.0,
            slant: 0.0,
            outline_position: 0.0,
            outline_thickness: 0.0,
            anti_alias: 0.0,
            color: [255, 255, 255, 255],
            outline_color: [0, 0, 0, 255],
            vertical_offset: 0.0,
        }
    }
}

/// Final placement of one glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphLayout {
    /// Quad relative to `position`, y down, padded for the distance field
    pub geometry: AlignedBox,
    /// Normalised atlas coordinates
    pub tex_coords: AlignedBox,
    pub mip_level: u32,
    /// Pen position; `f32::MAX` for hidden glyphs
    pub position: Vec2,
    pub style_index: usize,
}

impl GlyphLayout {
    /// Whitespace swallowed by a line wrap
    pub fn is_hidden(&self) -> bool {
        self.position.x == f32::MAX
    }

    /// Whether there is anything to draw
    pub fn is_empty(&self) -> bool {
        self.geometry.is_degenerate()
    }
}

impl Default for GlyphLayout {
    fn default() -> Self {
        Self {
            geometry: AlignedBox::zero(),
            tex_coords: AlignedBox::zero(),
            mip_level: 0,
            position: Vec2::default(),
            style_index: 0,
        }
    }
}

/// One laid out line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLine {
    /// First character on the line
    pub start: usize,
    pub count: usize,
    pub bounds: AlignedBox,
}

/// Atlas placement remembered between passes
#[derive(Debug, Clone, Copy, Default)]
struct AtlasSlot {
    position: TexturePosition,
    tex_size: (u32, u32),
}

pub struct TextLayout {
    text: Arc<Text>,
    styles: Vec<TextStyle>,
    glyphs: Vec<GlyphLayout>,
    slots: Vec<AtlasSlot>,
    lines: Vec<TextLine>,
    bounds: AlignedBox,
}

impl TextLayout {
    /// Pair a text with style ranges
    ///
    /// Styles must start at character 0, follow each other without gaps
    /// or overlaps, and cover every character.
    pub fn new(text: Arc<Text>, styles: &[TextStyle]) -> Result<Self> {
        validate_styles(styles, text.char_count())?;

        let glyph_count = text.glyphs().len();
        Ok(Self {
            text,
            styles: styles.to_vec(),
            glyphs: vec![GlyphLayout::default(); glyph_count],
            slots: vec![AtlasSlot::default(); glyph_count],
            lines: Vec::new(),
            bounds: AlignedBox::invalid(),
        })
    }

    pub fn text(&self) -> &Arc<Text> {
        &self.text
    }

    pub fn styles(&self) -> &[TextStyle] {
        &self.styles
    }

    pub fn glyphs(&self) -> &[GlyphLayout] {
        &self.glyphs
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    /// Union of every line; invalid when nothing was laid out
    pub fn bounds(&self) -> AlignedBox {
        self.bounds
    }

    /// Lay out the text, rendering any glyphs missing from the atlas
    ///
    /// On error the previous layout is kept.
    pub fn layout<T: GlyphTexture>(
        &mut self,
        font: &mut Font<T>,
        commands: &mut T::Commands,
        justification: Justification,
        max_width: f32,
        line_scale: f32,
    ) -> Result<()> {
        self.check_font(font)?;
        let text = Arc::clone(&self.text);
        let backward = text.ranges().first().is_some_and(|range| range.backward);
        let justification = justification.resolve(backward);

        let mut glyphs = vec![GlyphLayout::default(); text.glyphs().len()];
        let mut slots = vec![AtlasSlot::default(); text.glyphs().len()];
        if glyphs.is_empty() {
            self.glyphs = glyphs;
            self.slots = slots;
            self.lines.clear();
            self.bounds = AlignedBox::invalid();
            return Ok(());
        }

        let registry = Arc::clone(font.registry());
        registry.with_lock(|_| self.cache_glyphs(font, commands, &mut glyphs, &mut slots))?;

        let glyph_size = font.atlas().glyph_size() as f32;
        let window = font.atlas().window_size() as f32;
        let metrics = Metrics { glyph_size, window };

        let (line_of, hidden) = self.break_lines(&glyphs, &slots, &metrics, max_width);
        let (lines, bounds) = self.place(&mut glyphs, &line_of, &hidden, justification, line_scale);

        for (glyph, slot) in glyphs.iter_mut().zip(&slots) {
            if glyph.is_empty() {
                continue;
            }
            let scale = self.styles[glyph.style_index].scale;
            let padding = metrics.padding(slot.tex_size, scale);
            glyph.geometry.min.x -= padding.x;
            glyph.geometry.min.y -= padding.y;
            glyph.geometry.max.x += padding.x;
            glyph.geometry.max.y += padding.y;
            glyph.tex_coords = font.atlas().texture_bounds(slot.position, slot.tex_size);
        }

        log::debug!(
            "Laid out {} glyphs on {} lines, bounds {:?}",
            glyphs.len(),
            lines.len(),
            bounds
        );
        self.glyphs = glyphs;
        self.slots = slots;
        self.lines = lines;
        self.bounds = bounds;
        Ok(())
    }

    /// Re-fetch every glyph after the atlas may have evicted some
    pub fn refresh<T: GlyphTexture>(
        &mut self,
        font: &mut Font<T>,
        commands: &mut T::Commands,
    ) -> Result<()> {
        let count = self.text.char_count();
        self.refresh_range(font, commands, 0, count)
    }

    /// Re-fetch the glyphs of `count` characters starting at `first_char`
    pub fn refresh_range<T: GlyphTexture>(
        &mut self,
        font: &mut Font<T>,
        commands: &mut T::Commands,
        first_char: usize,
        count: usize,
    ) -> Result<()> {
        self.check_font(font)?;
        let char_count = self.text.char_count();
        if first_char.checked_add(count).is_none_or(|end| end > char_count) {
            return Err(TextError::InvalidArgument(format!(
                "characters {}+{} out of range for {}",
                first_char, count, char_count
            )));
        }

        let text = Arc::clone(&self.text);
        let registry = Arc::clone(font.registry());
        registry.with_lock(|_| {
            for mapping in &text.char_mappings()[first_char..first_char + count] {
                for index in mapping.first_glyph..mapping.first_glyph + mapping.glyph_count {
                    if self.glyphs[index].is_empty() {
                        continue;
                    }
                    let Some(range) = text.range_of_glyph(index).map(|r| text.ranges()[r]) else {
                        continue;
                    };
                    let info = font.glyph_info(commands, range.face, text.glyphs()[index].glyph_id)?;
                    self.update_glyph(font, index, &info);
                }
            }
            Ok(())
        })
    }

    fn update_glyph<T: GlyphTexture>(&mut self, font: &Font<T>, index: usize, info: &GlyphInfo) {
        self.slots[index] = AtlasSlot {
            position: info.position,
            tex_size: info.tex_size,
        };
        let glyph = &mut self.glyphs[index];
        glyph.mip_level = info.position.mip_level;
        glyph.tex_coords = font.atlas().texture_bounds(info.position, info.tex_size);
    }

    fn check_font<T: GlyphTexture>(&self, font: &Font<T>) -> Result<()> {
        if self.text.font_id() != font.id() {
            return Err(TextError::InvalidArgument(format!(
                "text was shaped with font {}, not font {}",
                self.text.font_id(),
                font.id()
            )));
        }
        Ok(())
    }

    fn style_index(&self, char_index: usize) -> usize {
        self.styles
            .partition_point(|style| style.start + style.count <= char_index)
            .min(self.styles.len() - 1)
    }

    /// First pass: atlas lookups and scaled geometry
    fn cache_glyphs<T: GlyphTexture>(
        &self,
        font: &mut Font<T>,
        commands: &mut T::Commands,
        glyphs: &mut [GlyphLayout],
        slots: &mut [AtlasSlot],
    ) -> Result<()> {
        let text = self.text.as_ref();
        for range in text.ranges() {
            for index in range.first_glyph..range.first_glyph + range.glyph_count {
                let shaped = &text.glyphs()[index];
                let style_index = self.style_index(shaped.char_index);
                let glyph = &mut glyphs[index];
                glyph.style_index = style_index;

                if text.characters()[shaped.char_index].is_whitespace() {
                    continue;
                }

                let style = &self.styles[style_index];
                let info = font.glyph_info(commands, range.face, shaped.glyph_id)?;
                let bounds = info.bounds;
                glyph.geometry = AlignedBox::new(
                    Vec2::new(
                        bounds.min.x * style.scale,
                        -bounds.max.y * style.scale + style.vertical_offset,
                    ),
                    Vec2::new(
                        bounds.max.x * style.scale,
                        -bounds.min.y * style.scale + style.vertical_offset,
                    ),
                );
                glyph.mip_level = info.position.mip_level;
                slots[index] = AtlasSlot {
                    position: info.position,
                    tex_size: info.tex_size,
                };
            }
        }
        Ok(())
    }

    /// Second pass: line index per glyph and the whitespace hidden at line ends
    fn break_lines(
        &self,
        glyphs: &[GlyphLayout],
        slots: &[AtlasSlot],
        metrics: &Metrics,
        max_width: f32,
    ) -> (Vec<u32>, Vec<bool>) {
        let text = self.text.as_ref();
        let mut line_of = vec![0u32; glyphs.len()];
        let mut hidden = vec![false; glyphs.len()];

        let mut x = 0.0f32;
        let mut line = 0u32;
        let mut word_count = 0u32;
        let mut last_is_whitespace = true;
        let mut word_start = 0usize;
        let mut word_x = 0.0f32;
        let mut whitespace_start = 0usize;

        for (char_index, mapping) in text.char_mappings().iter().enumerate() {
            if mapping.glyph_count == 0 {
                continue;
            }
            let glyph_range = mapping.first_glyph..mapping.first_glyph + mapping.glyph_count;
            let ch = text.characters()[char_index];
            let is_whitespace = ch.is_whitespace();

            if is_line_separator(ch) {
                // Whitespace trailing the line's last word is hidden like at a wrap
                if last_is_whitespace && word_count > 0 && whitespace_start < char_index {
                    for gap in &text.char_mappings()[whitespace_start..char_index] {
                        hidden[gap.first_glyph..gap.first_glyph + gap.glyph_count].fill(true);
                    }
                }
                line_of[glyph_range].fill(line);
                line += 1;
                x = 0.0;
                word_count = 0;
                last_is_whitespace = true;
                continue;
            }

            let mut advance = 0.0f32;
            let mut width = 0.0f32;
            for index in glyph_range.clone() {
                let style = &self.styles[glyphs[index].style_index];
                let shaped = &text.glyphs()[index];
                advance += shaped.advance.abs() * style.scale;
                if !is_whitespace {
                    width += metrics.glyph_width(&glyphs[index], slots[index], shaped.offset, style);
                }
            }

            if last_is_whitespace && !is_whitespace {
                word_start = char_index;
                word_x = x;
                word_count += 1;
            } else if !last_is_whitespace && is_whitespace {
                whitespace_start = char_index;
            }

            if !is_whitespace && word_count > 1 && x + width > max_width {
                line += 1;
                let mappings = text.char_mappings();
                if whitespace_start < word_start {
                    for gap in &mappings[whitespace_start..word_start] {
                        hidden[gap.first_glyph..gap.first_glyph + gap.glyph_count].fill(true);
                    }
                }
                for moved in &mappings[word_start..char_index] {
                    line_of[moved.first_glyph..moved.first_glyph + moved.glyph_count].fill(line);
                }
                x -= word_x;
                word_x = 0.0;
                word_count = 1;
            }

            line_of[glyph_range].fill(line);
            x += advance;
            last_is_whitespace = is_whitespace;
        }

        (line_of, hidden)
    }

    /// Third pass: pen positions, backward runs, justification and bounds
    fn place(
        &self,
        glyphs: &mut [GlyphLayout],
        line_of: &[u32],
        hidden: &[bool],
        justification: Justification,
        line_scale: f32,
    ) -> (Vec<TextLine>, AlignedBox) {
        let text = self.text.as_ref();
        let mut order: Vec<usize> = (0..glyphs.len()).collect();
        order.sort_by_key(|&index| (hidden[index], line_of[index]));

        for (index, glyph) in glyphs.iter_mut().enumerate() {
            if hidden[index] {
                glyph.position = Vec2::new(f32::MAX, f32::MAX);
                glyph.geometry = AlignedBox::zero();
            }
        }
        let visible = order.iter().take_while(|&&index| !hidden[index]).count();
        let order = &order[..visible];

        let backward = |index: usize| {
            text.range_of_glyph(index)
                .is_some_and(|range| text.ranges()[range].backward)
        };

        let mut lines = Vec::new();
        let mut bounds = AlignedBox::invalid();
        let mut line_bounds = AlignedBox::invalid();
        let mut blank_bounds = AlignedBox::invalid();
        let mut current_line: Option<u32> = None;
        let mut line_y = 0.0f32;
        let mut max_scale = 0.0f32;
        let mut last_scale = 1.0f32;
        let mut section_start = 0usize;
        let mut offset = 0.0f32;
        let mut run_end = 0usize;
        let mut run_pen = 0.0f32;

        for (slot, &index) in order.iter().enumerate() {
            let line = line_of[index];
            if current_line != Some(line) {
                if let Some(previous) = current_line {
                    self.finish_line(
                        glyphs,
                        &order[section_start..slot],
                        [&mut line_bounds, &mut blank_bounds],
                        line_y,
                        justification,
                        &mut lines,
                        &mut bounds,
                    );
                    if max_scale > 0.0 {
                        last_scale = max_scale;
                    }
                    line_y += last_scale * line_scale * (line - previous) as f32;
                }
                current_line = Some(line);
                section_start = slot;
                offset = 0.0;
                max_scale = 0.0;
                run_end = slot;
            }

            let shaped = &text.glyphs()[index];
            let scale = self.styles[glyphs[index].style_index].scale;
            max_scale = max_scale.max(scale);
            let advance = shaped.advance.abs() * scale;

            let pen = if backward(index) {
                if slot >= run_end {
                    // Measure the whole backward run, then fill it from its far end
                    let mut width = 0.0;
                    run_end = slot;
                    while run_end < order.len()
                        && line_of[order[run_end]] == line
                        && backward(order[run_end])
                    {
                        let other = order[run_end];
                        let other_scale = self.styles[glyphs[other].style_index].scale;
                        width += text.glyphs()[other].advance.abs() * other_scale;
                        run_end += 1;
                    }
                    run_pen = offset + width;
                    offset += width;
                }
                run_pen -= advance;
                run_pen
            } else {
                let pen = offset;
                offset += advance;
                pen
            };

            let glyph = &mut glyphs[index];
            glyph.position = Vec2::new(
                pen + shaped.offset.x * scale,
                line_y + shaped.offset.y * scale,
            );

            // Only inked glyphs set the extent that justification aligns
            if !glyph.geometry.is_degenerate() {
                line_bounds.add_box(&glyph.geometry.translated(Vec2::new(
                    glyph.position.x,
                    glyph.position.y - line_y,
                )));
            } else if !is_line_separator(text.characters()[shaped.char_index]) {
                blank_bounds.add_point(Vec2::new(pen, 0.0));
                blank_bounds.add_point(Vec2::new(pen + advance, 0.0));
            }
        }

        if current_line.is_some() {
            self.finish_line(
                glyphs,
                &order[section_start..],
                [&mut line_bounds, &mut blank_bounds],
                line_y,
                justification,
                &mut lines,
                &mut bounds,
            );
        }

        (lines, bounds)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_line(
        &self,
        glyphs: &mut [GlyphLayout],
        section: &[usize],
        [line_bounds, blank_bounds]: [&mut AlignedBox; 2],
        line_y: f32,
        justification: Justification,
        lines: &mut Vec<TextLine>,
        bounds: &mut AlignedBox,
    ) {
        // Lines holding only whitespace keep their extent but have nothing to align
        let (extent, shift) = if line_bounds.is_valid() {
            let shift = match justification {
                Justification::Right => line_bounds.max.x,
                Justification::Center => line_bounds.max.x / 2.0,
                _ => 0.0,
            };
            (*line_bounds, shift)
        } else if blank_bounds.is_valid() {
            (*blank_bounds, 0.0)
        } else {
            return;
        };
        *line_bounds = AlignedBox::invalid();
        *blank_bounds = AlignedBox::invalid();

        let mut first_char = usize::MAX;
        let mut last_char = 0;
        for &index in section {
            glyphs[index].position.x -= shift;
            let char_index = self.text.glyphs()[index].char_index;
            first_char = first_char.min(char_index);
            last_char = last_char.max(char_index);
        }

        let placed = extent.translated(Vec2::new(-shift, line_y));
        bounds.add_box(&placed);
        lines.push(TextLine {
            start: first_char,
            count: last_char + 1 - first_char,
            bounds: placed,
        });
    }
}

/// Atlas constants the passes share
struct Metrics {
    glyph_size: f32,
    window: f32,
}

impl Metrics {
    /// Distance field margin in em units
    fn base_padding(&self) -> f32 {
        self.window / self.glyph_size
    }

    /// Extent the glyph reaches right of its pen, for wrapping decisions
    fn glyph_width(
        &self,
        glyph: &GlyphLayout,
        slot: AtlasSlot,
        offset: Vec2,
        style: &TextStyle,
    ) -> f32 {
        let image_width = (slot.tex_size.0 as f32 + self.window * 2.0).max(self.glyph_size);
        let glyph_scale = self.glyph_size / image_width;
        let padding = glyph_scale * self.base_padding() * style.embolden * style.scale;
        let offset = Vec2::new(offset.x * style.scale, offset.y * style.scale);

        let mut width = offset.x + glyph.geometry.max.x + padding;
        // y points down, so a positive slant pushes the top of the glyph right
        if style.slant > 0.0 {
            width -= (offset.y + glyph.geometry.min.y) * style.slant;
        } else {
            width -= (offset.y + glyph.geometry.max.y) * style.slant;
        }
        width
    }

    /// Geometry padding that exposes the distance field margin
    fn padding(&self, tex_size: (u32, u32), scale: f32) -> Vec2 {
        let padded = self.glyph_size + self.window * 2.0;
        let width = (tex_size.0 as f32 + self.window * 2.0).max(padded);
        let height = (tex_size.1 as f32 + self.window * 2.0).max(padded);
        let base = self.base_padding() * scale;
        Vec2::new(base * padded / width, base * padded / height)
    }
}

fn validate_styles(styles: &[TextStyle], char_count: usize) -> Result<()> {
    let mut end = 0usize;
    let mut valid = !styles.is_empty();
    for style in styles {
        if !valid || style.start != end {
            valid = false;
            break;
        }
        end += style.count;
    }

    if !valid || end < char_count {
        log::error!(
            "Text style ranges must start at 0, follow each other without overlap \
             and cover all {} characters",
            char_count
        );
        return Err(TextError::InvalidArgument(
            "style ranges must be contiguous and cover the text".to_string(),
        ));
    }
    Ok(())
}
