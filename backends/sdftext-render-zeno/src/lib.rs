// this_file: backends/sdftext-render-zeno/src/lib.rs

//! Zeno rasterizer: glyph outlines in, coverage masks out
//!
//! Each glyph is drawn once at the atlas cell size, so speed matters less
//! than getting the footprint right. Outlines come from skrifa and feed two
//! paths at once:
//!
//! 1. **SVG strings** for Zeno's rasterizer (that's what it eats)
//! 2. **kurbo paths** for exact bounding boxes without parsing anything
//!
//! The mask is thresholded to hard inside/outside values because the
//! distance field downstream only cares about which side of the outline a
//! pixel is on.

use kurbo::Shape;
use skrifa::MetadataProvider;

use sdftext_core::{
    error::{RasterError, Result},
    traits::{FontRef, Rasterizer},
    types::{GlyphBitmap, GlyphId},
};

/// Largest bitmap edge we are willing to allocate
const MAX_EDGE: u32 = 4096;

/// Pure Rust rasterizer built on zeno
pub struct ZenoRasterizer {
    /// Coverage at or above this counts as inside
    threshold: u8,
}

impl ZenoRasterizer {
    pub fn new() -> Self {
        Self { threshold: 128 }
    }

    /// Change the coverage level that separates inside from outside
    pub fn with_threshold(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Rasterize an SVG path whose bounds are already known
    ///
    /// Coordinates are y-up; rows of the result run top to bottom.
    fn rasterize(&self, path_data: &str, bbox: kurbo::Rect) -> Result<GlyphBitmap> {
        use zeno::Mask;

        let finite = bbox.x0.is_finite() && bbox.y0.is_finite();
        if !finite || bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return Ok(GlyphBitmap::empty());
        }

        let origin_x = bbox.x0.floor();
        let origin_y = bbox.y0.floor();
        let width = (bbox.x1.ceil() - origin_x) as u32;
        let height = (bbox.y1.ceil() - origin_y) as u32;
        if width == 0 || height == 0 || width > MAX_EDGE || height > MAX_EDGE {
            return Err(RasterError::InvalidDimensions { width, height }.into());
        }

        let mut mask = Vec::new();
        mask.try_reserve_exact(width as usize * height as usize)
            .map_err(|_| RasterError::OutOfMemory)?;
        mask.resize(width as usize * height as usize, 0u8);

        Mask::new(path_data)
            .size(width, height)
            .offset((-origin_x as i32, -origin_y as i32))
            .render_into(&mut mask, None);

        // Font space is y-up, bitmaps are y-down
        let row = width as usize;
        for y in 0..(height as usize / 2) {
            let bottom = height as usize - 1 - y;
            for x in 0..row {
                mask.swap(y * row + x, bottom * row + x);
            }
        }

        for value in mask.iter_mut() {
            *value = if *value >= self.threshold { 255 } else { 0 };
        }

        Ok(GlyphBitmap {
            width,
            height,
            left: origin_x as i32,
            top: origin_y as i32 + height as i32,
            data: mask,
        })
    }
}

impl Default for ZenoRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for ZenoRasterizer {
    fn name(&self) -> &'static str {
        "zeno"
    }

    fn render_glyph(
        &self,
        font: &dyn FontRef,
        glyph_id: GlyphId,
        pixel_size: u32,
    ) -> Result<GlyphBitmap> {
        let font_data = font.data();
        if font_data.is_empty() {
            return Err(RasterError::InvalidFont.into());
        }
        let font_ref = skrifa::FontRef::new(font_data).map_err(|_| RasterError::InvalidFont)?;

        let outlines = font_ref.outline_glyphs();
        let glyph = outlines
            .get(skrifa::GlyphId::new(glyph_id))
            .ok_or(RasterError::GlyphNotFound(glyph_id))?;

        let mut builder = ZenoPathBuilder::new(1.0);
        let size = skrifa::instance::Size::new(pixel_size as f32);
        let location = skrifa::instance::LocationRef::default();
        let settings = skrifa::outline::DrawSettings::unhinted(size, location);
        glyph
            .draw(settings, &mut builder)
            .map_err(|_| RasterError::OutlineExtractionFailed)?;

        let (path_data, kurbo_path) = builder.finish();
        if kurbo_path.elements().is_empty() {
            return Ok(GlyphBitmap::empty());
        }

        let bitmap = self.rasterize(&path_data, kurbo_path.bounding_box())?;
        log::trace!(
            "Rasterized glyph {} at {}px: {}x{}",
            glyph_id,
            pixel_size,
            bitmap.width,
            bitmap.height
        );
        Ok(bitmap)
    }
}

/// Collects outline commands as SVG text and as a kurbo path
struct ZenoPathBuilder {
    commands: Vec<String>,
    kurbo_path: kurbo::BezPath,
    scale: f32,
}

impl ZenoPathBuilder {
    fn new(scale: f32) -> Self {
        Self {
            commands: Vec::new(),
            kurbo_path: kurbo::BezPath::new(),
            scale,
        }
    }

    fn finish(self) -> (String, kurbo::BezPath) {
        (self.commands.join(" "), self.kurbo_path)
    }
}

impl skrifa::outline::OutlinePen for ZenoPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (x * self.scale, y * self.scale);
        self.commands.push(format!("M {:.2},{:.2}", x, y));
        self.kurbo_path.move_to((x as f64, y as f64));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (x * self.scale, y * self.scale);
        self.commands.push(format!("L {:.2},{:.2}", x, y));
        self.kurbo_path.line_to((x as f64, y as f64));
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        let (cx, cy) = (cx * self.scale, cy * self.scale);
        let (x, y) = (x * self.scale, y * self.scale);
        self.commands
            .push(format!("Q {:.2},{:.2} {:.2},{:.2}", cx, cy, x, y));
        self.kurbo_path
            .quad_to((cx as f64, cy as f64), (x as f64, y as f64));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (cx0, cy0) = (cx0 * self.scale, cy0 * self.scale);
        let (cx1, cy1) = (cx1 * self.scale, cy1 * self.scale);
        let (x, y) = (x * self.scale, y * self.scale);
        self.commands.push(format!(
            "C {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
            cx0, cy0, cx1, cy1, x, y
        ));
        self.kurbo_path.curve_to(
            (cx0 as f64, cy0 as f64),
            (cx1 as f64, cy1 as f64),
            (x as f64, y as f64),
        );
    }

    fn close(&mut self) {
        self.commands.push("Z".to_string());
        self.kurbo_path.close_path();
    }
}
