// this_file: crates/sdftext-core/src/traits.rs

//! The contracts that bind every backend together
//!
//! Four traits, one per external collaborator. The glyph atlas and layout
//! engine only ever talk to these, so a test can swap in a mock and a
//! renderer can swap in its own GPU texture without touching the core.
//!
//! - [`FontRef`] - Your window into font data and metrics
//! - [`Shaper`] - Where code points become glyphs
//! - [`Rasterizer`] - Where one glyph becomes a coverage bitmap
//! - [`GlyphTexture`] - Where finished atlas cells get uploaded

use crate::error::Result;
use crate::types::{
    FontBox, GlyphBitmap, GlyphId, ShapedRun, ShapingParams, TextureRegion,
};

/// Your key to unlocking font secrets
///
/// ```ignore
/// struct MyFont {
///     data: Vec<u8>,
/// }
///
/// impl FontRef for MyFont {
///     fn data(&self) -> &[u8] {
///         &self.data
///     }
///
///     fn units_per_em(&self) -> u16 {
///         1000
///     }
///
///     fn glyph_id(&self, ch: char) -> Option<GlyphId> {
///         Some(42)
///     }
///
///     fn advance_width(&self, glyph_id: GlyphId) -> f32 {
///         500.0
///     }
/// }
/// ```
pub trait FontRef: Send + Sync {
    /// Raw font bytes as they live in the file
    fn data(&self) -> &[u8];

    /// The font's internal coordinate system scale
    fn units_per_em(&self) -> u16;

    /// Find the glyph that represents this character
    ///
    /// Returns None when the font doesn't contain this character.
    fn glyph_id(&self, ch: char) -> Option<GlyphId>;

    /// How wide this glyph stands in font units
    fn advance_width(&self, glyph_id: GlyphId) -> f32;

    /// Whether the face has a glyph for this character
    fn has_glyph(&self, ch: char) -> bool {
        self.glyph_id(ch).is_some_and(|id| id != 0)
    }

    /// Vector outlines are required for distance field generation
    fn is_scalable(&self) -> bool {
        true
    }

    /// Union of all glyph boxes, in font units
    fn bounding_box(&self) -> Option<FontBox> {
        None
    }

    /// How many glyphs this font contains
    fn glyph_count(&self) -> Option<u32> {
        None
    }
}

/// Where code points learn their positions
///
/// Implementations receive one run that shares a script, a direction and a
/// face, and return glyphs in visual order with metrics in font units.
/// Clusters are indices into the `text` slice.
pub trait Shaper: Send + Sync {
    /// Identify yourself in logs and error messages
    fn name(&self) -> &'static str;

    /// Transform code points into positioned glyphs
    fn shape(&self, text: &[char], font: &dyn FontRef, params: &ShapingParams)
        -> Result<ShapedRun>;

    /// Flush any cached shaping data
    fn clear_cache(&self) {}
}

/// Where single glyphs become coverage masks
///
/// The atlas only needs inside/outside information, so any anti-aliased
/// coverage is fine as long as empty pixels are zero.
pub trait Rasterizer: Send + Sync {
    /// Your rasterizer's signature
    fn name(&self) -> &'static str;

    /// Render one glyph at `pixel_size` pixels per em
    ///
    /// Glyphs without ink return an empty bitmap rather than an error.
    fn render_glyph(
        &self,
        font: &dyn FontRef,
        glyph_id: GlyphId,
        pixel_size: u32,
    ) -> Result<GlyphBitmap>;
}

/// Receives atlas cell uploads
///
/// `Commands` is whatever the rendering layer records copies into, such as
/// a command buffer. Uploads are fire-and-forget from the caller's side.
pub trait GlyphTexture {
    type Commands;

    /// Copy `data` (tightly packed, one byte per pixel) into `region`
    fn copy_region(
        &mut self,
        commands: &mut Self::Commands,
        region: &TextureRegion,
        data: &[u8],
    ) -> Result<()>;
}
