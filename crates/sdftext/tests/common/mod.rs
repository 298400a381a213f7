// this_file: crates/sdftext/tests/common/mod.rs

//! Deterministic backends for the integration tests
//!
//! Every character maps to a glyph with the same id, advances are half an
//! em and glyphs render as a solid box, so positions can be checked with
//! exact arithmetic.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sdftext::error::{RasterError, TextureError};
use sdftext::prelude::*;
use sdftext::types::{GlyphBitmap, GlyphId, ShapedGlyph, ShapedRun, ShapingParams, TextureRegion};

pub const UNITS_PER_EM: u16 = 1000;
pub const ADVANCE: f32 = 500.0;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Face covering every character except `missing`
pub struct MockFont {
    missing: HashSet<char>,
}

impl MockFont {
    pub fn full() -> Self {
        Self {
            missing: HashSet::new(),
        }
    }

    pub fn without(chars: &str) -> Self {
        Self {
            missing: chars.chars().collect(),
        }
    }
}

impl FontRef for MockFont {
    fn data(&self) -> &[u8] {
        &[]
    }

    fn units_per_em(&self) -> u16 {
        UNITS_PER_EM
    }

    fn glyph_id(&self, ch: char) -> Option<GlyphId> {
        (!self.missing.contains(&ch)).then_some(ch as u32)
    }

    fn advance_width(&self, _glyph_id: GlyphId) -> f32 {
        ADVANCE
    }
}

/// One glyph per character, reported in visual order
pub struct MockShaper;

impl Shaper for MockShaper {
    fn name(&self) -> &'static str {
        "mock-shaper"
    }

    fn shape(&self, text: &[char], font: &dyn FontRef, params: &ShapingParams) -> Result<ShapedRun> {
        let mut glyphs: Vec<ShapedGlyph> = text
            .iter()
            .enumerate()
            .map(|(index, &ch)| {
                let glyph_id = font.glyph_id(ch).unwrap_or(0);
                ShapedGlyph {
                    glyph_id,
                    cluster: index as u32,
                    unsafe_to_break: false,
                    x_offset: 0,
                    y_offset: 0,
                    x_advance: font.advance_width(glyph_id) as i32,
                    y_advance: 0,
                }
            })
            .collect();
        if params.direction.is_backward() {
            glyphs.reverse();
        }
        Ok(ShapedRun {
            glyphs,
            direction: params.direction,
        })
    }
}

/// Renders a solid box half a cell wide and three quarters tall
#[derive(Default)]
pub struct MockRasterizer {
    pub calls: Arc<AtomicUsize>,
    pub failing: HashSet<GlyphId>,
}

impl MockRasterizer {
    pub fn failing_on(glyphs: &[GlyphId]) -> Self {
        Self {
            failing: glyphs.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl Rasterizer for MockRasterizer {
    fn name(&self) -> &'static str {
        "mock-rasterizer"
    }

    fn render_glyph(&self, _font: &dyn FontRef, glyph_id: GlyphId, pixel_size: u32) -> Result<GlyphBitmap> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&glyph_id) {
            return Err(RasterError::GlyphNotFound(glyph_id).into());
        }

        let width = pixel_size / 2;
        let height = pixel_size * 3 / 4;
        Ok(GlyphBitmap {
            width,
            height,
            left: 1,
            top: height as i32,
            data: vec![255; (width * height) as usize],
        })
    }
}

/// Memory texture that can be told to reject uploads
pub struct FlakyTexture {
    pub inner: MemoryTexture,
    pub fail_uploads: bool,
}

impl GlyphTexture for FlakyTexture {
    type Commands = ();

    fn copy_region(&mut self, commands: &mut (), region: &TextureRegion, data: &[u8]) -> Result<()> {
        if self.fail_uploads {
            return Err(TextureError::BackendError("device lost".to_string()).into());
        }
        self.inner.copy_region(commands, region, data)
    }
}

pub fn registry_with(max_faces: usize, rasterizer: MockRasterizer) -> Arc<FaceRegistry> {
    init_logging();
    Arc::new(FaceRegistry::with_backends(
        RegistryConfig::new(max_faces, TextQuality::Low),
        Arc::new(MockShaper),
        Arc::new(rasterizer),
    ))
}

/// Registry with a single full face called "mock"
pub fn registry() -> Arc<FaceRegistry> {
    let registry = registry_with(4, MockRasterizer::default());
    registry
        .add_face("mock", Arc::new(MockFont::full()))
        .expect("face loads");
    registry
}

pub fn font(registry: &Arc<FaceRegistry>, faces: &[&str]) -> Font<MemoryTexture> {
    Font::create(Arc::clone(registry), faces, CacheSize::Small, |desc| {
        MemoryTexture::new(*desc)
    })
    .expect("font builds")
}

pub fn flaky_font(registry: &Arc<FaceRegistry>) -> Font<FlakyTexture> {
    Font::create(Arc::clone(registry), &["mock"], CacheSize::Small, |desc| {
        Ok(FlakyTexture {
            inner: MemoryTexture::new(*desc)?,
            fail_uploads: false,
        })
    })
    .expect("font builds")
}

/// Shape and lay out `text` with one style of scale 1
pub fn lay_out(
    font: &mut Font<MemoryTexture>,
    text: &str,
    justification: Justification,
    max_width: f32,
) -> TextLayout {
    let text = Arc::new(Text::create(font, text, Segmentation::Script).expect("text shapes"));
    let count = text.char_count();
    let mut layout = TextLayout::new(text, &[TextStyle::new(0, count, 1.0)]).expect("styles cover");
    layout
        .layout(font, &mut (), justification, max_width, 1.0)
        .expect("layout succeeds");
    layout
}
