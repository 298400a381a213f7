// this_file: crates/sdftext/src/render_buffer.rs

//! Batches laid out glyphs into vertex and index data
//!
//! A [`TextRenderBuffer`] has room for a fixed number of glyphs. Each
//! visible glyph becomes either four vertices plus six indices (an indexed
//! quad) or a single vertex for pipelines that expand points on the GPU.
//! What goes into a vertex is up to the caller's glyph data function;
//! [`quad_vertices`] covers the common case.

use sdftext_core::error::{Result, TextError};

use crate::layout::TextLayout;

/// Index storage, sized by how many vertices the buffer can address
#[derive(Debug, Clone, PartialEq)]
pub enum IndexData {
    /// Point pipelines have no indices
    None,
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn len(&self) -> usize {
        match self {
            IndexData::None => 0,
            IndexData::U16(indices) => indices.len(),
            IndexData::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self) {
        match self {
            IndexData::None => {}
            IndexData::U16(indices) => indices.clear(),
            IndexData::U32(indices) => indices.clear(),
        }
    }

    fn push_quad(&mut self, base: u32) {
        const QUAD: [u32; 6] = [0, 1, 2, 2, 3, 0];
        match self {
            IndexData::None => {}
            IndexData::U16(indices) => {
                indices.extend(QUAD.iter().map(|&corner| (base + corner) as u16));
            }
            IndexData::U32(indices) => indices.extend(QUAD.iter().map(|&corner| base + corner)),
        }
    }
}

/// Queued data ready for upload
#[derive(Debug)]
pub struct TextBatch<'a, V> {
    pub vertices: &'a [V],
    pub indices: &'a IndexData,
    pub glyph_count: usize,
}

pub struct TextRenderBuffer<V, F>
where
    F: FnMut(&TextLayout, usize, &mut [V]),
{
    max_glyphs: usize,
    vertices_per_glyph: usize,
    vertices: Vec<V>,
    indices: IndexData,
    queued: usize,
    glyph_data: F,
}

impl<V, F> TextRenderBuffer<V, F>
where
    V: Clone + Default,
    F: FnMut(&TextLayout, usize, &mut [V]),
{
    /// Create a buffer holding up to `max_glyphs` glyphs
    ///
    /// `vertices_per_glyph` is 4 for indexed quads or 1 for point
    /// expansion. `glyph_data` fills the vertices of one glyph given the
    /// layout and the glyph index.
    pub fn new(max_glyphs: usize, vertices_per_glyph: usize, glyph_data: F) -> Result<Self> {
        if max_glyphs == 0 {
            return Err(TextError::InvalidArgument(
                "render buffer needs room for at least one glyph".to_string(),
            ));
        }
        if vertices_per_glyph != 1 && vertices_per_glyph != 4 {
            return Err(TextError::InvalidArgument(format!(
                "glyphs use 1 or 4 vertices, not {vertices_per_glyph}"
            )));
        }

        let mut vertices = Vec::new();
        vertices
            .try_reserve_exact(max_glyphs * vertices_per_glyph)
            .map_err(|_| TextError::out_of_memory("render buffer vertices"))?;

        let indices = if vertices_per_glyph == 1 {
            IndexData::None
        } else if max_glyphs * 4 < 1 << 16 {
            IndexData::U16(Vec::with_capacity(max_glyphs * 6))
        } else {
            IndexData::U32(Vec::with_capacity(max_glyphs * 6))
        };

        Ok(Self {
            max_glyphs,
            vertices_per_glyph,
            vertices,
            indices,
            queued: 0,
            glyph_data,
        })
    }

    pub fn max_glyphs(&self) -> usize {
        self.max_glyphs
    }

    pub fn queued_glyphs(&self) -> usize {
        self.queued
    }

    pub fn remaining_glyphs(&self) -> usize {
        self.max_glyphs - self.queued
    }

    /// Queue every visible glyph of a layout
    pub fn add_text(&mut self, layout: &TextLayout) -> Result<()> {
        self.add_text_range(layout, 0, layout.text().char_count())
    }

    /// Queue the visible glyphs of `count` characters from `first_char`
    ///
    /// Nothing is queued when the range is invalid or would overflow.
    pub fn add_text_range(
        &mut self,
        layout: &TextLayout,
        first_char: usize,
        count: usize,
    ) -> Result<()> {
        let mappings = layout.text().char_mappings();
        let end = first_char
            .checked_add(count)
            .filter(|&end| end <= mappings.len())
            .ok_or_else(|| {
                TextError::InvalidArgument(format!(
                    "characters {}+{} out of range for {}",
                    first_char,
                    count,
                    mappings.len()
                ))
            })?;

        let glyph_indices = || {
            mappings[first_char..end].iter().flat_map(|mapping| {
                (mapping.first_glyph..mapping.first_glyph + mapping.glyph_count)
                    .filter(|&index| is_drawable(layout, index))
            })
        };

        let needed = glyph_indices().count();
        if needed > self.remaining_glyphs() {
            return Err(TextError::InvalidArgument(format!(
                "{} glyphs do not fit, {} of {} slots left",
                needed,
                self.remaining_glyphs(),
                self.max_glyphs
            )));
        }

        for index in glyph_indices() {
            let start = self.vertices.len();
            self.vertices
                .resize(start + self.vertices_per_glyph, V::default());
            (self.glyph_data)(layout, index, &mut self.vertices[start..]);
            self.indices.push_quad((self.queued * 4) as u32);
            self.queued += 1;
        }

        Ok(())
    }

    /// Drop everything queued
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.queued = 0;
    }

    pub fn batch(&self) -> TextBatch<'_, V> {
        TextBatch {
            vertices: &self.vertices,
            indices: &self.indices,
            glyph_count: self.queued,
        }
    }
}

fn is_drawable(layout: &TextLayout, index: usize) -> bool {
    layout
        .glyphs()
        .get(index)
        .is_some_and(|glyph| !glyph.is_empty() && !glyph.is_hidden())
}

/// Vertex layout produced by [`quad_vertices`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphVertex {
    pub position: [f32; 2],
    /// Atlas u, v and mip level
    pub tex_coords: [f32; 3],
    pub color: [u8; 4],
    pub style_index: u32,
}

/// Fill four corners of a glyph quad, counter-clockwise from the top left
///
/// Slant shears the quad so the top moves right for positive slant.
pub fn quad_vertices(layout: &TextLayout, index: usize, out: &mut [GlyphVertex]) {
    let Some(glyph) = layout.glyphs().get(index) else {
        return;
    };
    let style = layout
        .styles()
        .get(glyph.style_index)
        .copied()
        .unwrap_or_default();

    let geometry = glyph.geometry;
    let tex = glyph.tex_coords;
    let mip = glyph.mip_level as f32;
    let corners = [
        (geometry.min.x, geometry.min.y, tex.min.x, tex.min.y),
        (geometry.min.x, geometry.max.y, tex.min.x, tex.max.y),
        (geometry.max.x, geometry.max.y, tex.max.x, tex.max.y),
        (geometry.max.x, geometry.min.y, tex.max.x, tex.min.y),
    ];

    for (vertex, &(x, y, u, v)) in out.iter_mut().zip(corners.iter()) {
        *vertex = GlyphVertex {
            position: [
                glyph.position.x + x - y * style.slant,
                glyph.position.y + y,
            ],
            tex_coords: [u, v, mip],
            color: style.color,
            style_index: glyph.style_index as u32,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_width_follows_capacity() {
        let small = TextRenderBuffer::new(100, 4, quad_vertices).unwrap();
        assert!(matches!(small.batch().indices, IndexData::U16(_)));

        let large = TextRenderBuffer::new(1 << 14, 4, quad_vertices).unwrap();
        assert!(matches!(large.batch().indices, IndexData::U32(_)));

        let points = TextRenderBuffer::new(100, 1, quad_vertices).unwrap();
        assert_eq!(*points.batch().indices, IndexData::None);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(TextRenderBuffer::new(0, 4, quad_vertices).is_err());
        assert!(TextRenderBuffer::new(10, 3, quad_vertices).is_err());
    }

    #[test]
    fn quads_index_their_own_vertices() {
        let mut indices = IndexData::U16(Vec::new());
        indices.push_quad(0);
        indices.push_quad(4);
        assert_eq!(
            indices,
            IndexData::U16(vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4])
        );
    }
}
