// this_file: crates/sdftext/src/atlas.rs

//! Atlas addressing
//!
//! The atlas is one square texture. Level 0 holds `multiplier²` cells of
//! `glyph_size` pixels, and every mip level below it holds a quarter as many
//! cells of the same pixel size (so each one covers four times the area when
//! sampled). A flat slot index walks level 0 first, then level 1, and so on.

use sdftext_core::types::{
    AlignedBox, AtlasDescriptor, CacheSize, PixelFormat, TextQuality, TextureRegion, Vec2,
};

/// Where a slot lives inside the atlas, in texels of its mip level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TexturePosition {
    pub mip_level: u32,
    pub x: u32,
    pub y: u32,
}

/// Pure mapping between slot indices and atlas texels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasLayout {
    glyph_size: u32,
    window_size: u32,
    cache_size: CacheSize,
}

impl AtlasLayout {
    pub fn new(quality: TextQuality, cache_size: CacheSize) -> Self {
        Self {
            glyph_size: quality.glyph_size(),
            window_size: quality.window_size(),
            cache_size,
        }
    }

    pub fn glyph_size(&self) -> u32 {
        self.glyph_size
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    pub fn cache_size(&self) -> CacheSize {
        self.cache_size
    }

    /// Edge length of mip level 0 in texels
    pub fn texture_size(&self) -> u32 {
        self.glyph_size * self.cache_size.multiplier()
    }

    /// Total number of cells across every mip level
    pub fn slot_count(&self) -> usize {
        let multiplier = self.cache_size.multiplier();
        (0..self.cache_size.mip_levels())
            .map(|level| {
                let cells = (multiplier >> level) as usize;
                cells * cells
            })
            .sum()
    }

    /// Map a flat slot index to its cell
    ///
    /// Indices past [`slot_count`](Self::slot_count) clamp to the last cell.
    pub fn slot_position(&self, index: usize) -> TexturePosition {
        let multiplier = self.cache_size.multiplier();
        let mut first = 0usize;
        for level in 0..self.cache_size.mip_levels() {
            let per_row = (multiplier >> level) as usize;
            let limit = first + per_row * per_row;
            if index < limit {
                let local = index - first;
                return TexturePosition {
                    mip_level: level,
                    x: (local % per_row) as u32 * self.glyph_size,
                    y: (local / per_row) as u32 * self.glyph_size,
                };
            }
            first = limit;
        }

        TexturePosition {
            mip_level: self.cache_size.mip_levels().saturating_sub(1),
            x: 0,
            y: 0,
        }
    }

    /// Destination rectangle for uploading a slot's cell
    pub fn region(&self, position: TexturePosition) -> TextureRegion {
        TextureRegion {
            mip_level: position.mip_level,
            x: position.x,
            y: position.y,
            width: self.glyph_size,
            height: self.glyph_size,
        }
    }

    /// Normalised texture coordinates covering a glyph's distance field
    ///
    /// `tex_size` is the rasterized bitmap footprint in pixels; the padded
    /// field is clamped to the cell. Both corners shift by half a texel so
    /// bilinear sampling never reads the neighbouring cell.
    pub fn texture_bounds(&self, position: TexturePosition, tex_size: (u32, u32)) -> AlignedBox {
        let level_edge = self.texture_size() >> position.mip_level;
        let texel = 1.0 / level_edge.max(1) as f32;

        let min = Vec2::new(position.x as f32 * texel, position.y as f32 * texel);
        let extent_x = (tex_size.0 + self.window_size * 2).min(self.glyph_size) as f32;
        let extent_y = (tex_size.1 + self.window_size * 2).min(self.glyph_size) as f32;
        let max = Vec2::new(min.x + extent_x * texel, min.y + extent_y * texel);

        let half = 0.5 * texel;
        AlignedBox::new(
            Vec2::new(min.x + half, min.y + half),
            Vec2::new(max.x + half, max.y + half),
        )
    }

    /// Texture a font needs from the rendering layer
    pub fn descriptor(&self) -> AtlasDescriptor {
        AtlasDescriptor {
            format: PixelFormat::R8Unorm,
            width: self.texture_size(),
            height: self.texture_size(),
            mip_levels: self.cache_size.mip_levels(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_counts_match_cache_sizes() {
        let large = AtlasLayout::new(TextQuality::Medium, CacheSize::Large);
        assert_eq!(large.slot_count(), 1365);
        let small = AtlasLayout::new(TextQuality::Medium, CacheSize::Small);
        assert_eq!(small.slot_count(), 341);
    }

    #[test]
    fn slot_positions_walk_levels() {
        let atlas = AtlasLayout::new(TextQuality::Low, CacheSize::Large);
        assert_eq!(
            atlas.slot_position(0),
            TexturePosition { mip_level: 0, x: 0, y: 0 }
        );
        assert_eq!(
            atlas.slot_position(33),
            TexturePosition { mip_level: 0, x: 24, y: 24 }
        );
        // First cell of level 1
        assert_eq!(
            atlas.slot_position(1024),
            TexturePosition { mip_level: 1, x: 0, y: 0 }
        );
        assert_eq!(
            atlas.slot_position(1024 + 17),
            TexturePosition { mip_level: 1, x: 24, y: 24 }
        );
        // The single cell of the last level
        assert_eq!(
            atlas.slot_position(1364),
            TexturePosition { mip_level: 5, x: 0, y: 0 }
        );
    }

    #[test]
    fn every_cell_fits_inside_its_level() {
        let atlas = AtlasLayout::new(TextQuality::High, CacheSize::Small);
        for index in 0..atlas.slot_count() {
            let pos = atlas.slot_position(index);
            let edge = atlas.texture_size() >> pos.mip_level;
            assert!(pos.x + atlas.glyph_size() <= edge);
            assert!(pos.y + atlas.glyph_size() <= edge);
        }
    }

    #[test]
    fn texture_bounds_clamp_to_cell() {
        let atlas = AtlasLayout::new(TextQuality::Low, CacheSize::Small);
        let texel = 1.0 / 384.0;

        let small = atlas.texture_bounds(TexturePosition::default(), (4, 6));
        assert!((small.min.x - 0.5 * texel).abs() < 1e-6);
        assert!((small.max.x - 12.5 * texel).abs() < 1e-6);
        assert!((small.max.y - 14.5 * texel).abs() < 1e-6);

        let big = atlas.texture_bounds(TexturePosition::default(), (40, 40));
        assert!((big.max.x - 24.5 * texel).abs() < 1e-6);
    }

    #[test]
    fn descriptor_describes_r8_texture() {
        let atlas = AtlasLayout::new(TextQuality::VeryHigh, CacheSize::Large);
        let desc = atlas.descriptor();
        assert_eq!(desc.format, PixelFormat::R8Unorm);
        assert_eq!((desc.width, desc.height, desc.mip_levels), (2048, 2048, 6));
    }
}
