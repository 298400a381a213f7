// this_file: backends/sdftext-shape-hr/src/lib.rs

//! Pure Rust text shaping backend using harfrust
//!
//! Harfrust is a pure Rust port of HarfBuzz, so shaping needs no C
//! toolchain. The shaper receives one run at a time (one script, one
//! direction, one face) and reports glyphs in visual order with metrics
//! left in font units; the atlas side does its own scaling.

mod cache;

use std::num::NonZeroUsize;
use std::str::FromStr;

use harfrust::{
    Direction as HrDirection, FontRef as HrFontRef, GlyphBuffer, Language, Script, ShaperData,
    Tag, UnicodeBuffer,
};
use parking_lot::Mutex;

use sdftext_core::{
    error::{Result, ShapingError},
    traits::{FontRef, Shaper},
    types::{Direction, ShapedGlyph, ShapedRun, ShapingParams},
};

pub use cache::{CacheStats, ShapingCache, ShapingCacheKey, DEFAULT_CAPACITY};

/// Text shaping powered by harfrust
///
/// Optionally caches shaping results so repeated runs skip the shaper.
pub struct HarfrustShaper {
    cache: Option<Mutex<ShapingCache>>,
}

impl HarfrustShaper {
    /// Creates a shaper without a cache
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// Creates a shaper that remembers the last [`DEFAULT_CAPACITY`] runs
    pub fn with_cache() -> Self {
        Self {
            cache: Some(Mutex::new(ShapingCache::default())),
        }
    }

    /// Creates a shaper with a cache of the given size
    pub fn with_cache_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Some(Mutex::new(ShapingCache::new(capacity))),
        }
    }

    /// Cache counters, if caching is enabled
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.lock().stats())
    }

    fn to_hr_direction(dir: Direction) -> HrDirection {
        match dir {
            Direction::LeftToRight => HrDirection::LeftToRight,
            Direction::RightToLeft => HrDirection::RightToLeft,
        }
    }

    /// One glyph per character straight from cmap and hmtx
    ///
    /// Used when there are no font bytes to hand to harfrust, which is the
    /// case for synthetic faces.
    fn fallback_shape(text: &[char], font: &dyn FontRef, params: &ShapingParams) -> ShapedRun {
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
                    x_advance: font.advance_width(glyph_id).round() as i32,
                    y_advance: 0,
                }
            })
            .collect();

        if params.direction.is_backward() {
            glyphs.reverse();
        }

        ShapedRun {
            glyphs,
            direction: params.direction,
        }
    }

    fn extract_glyphs(buffer: &GlyphBuffer) -> Vec<ShapedGlyph> {
        buffer
            .glyph_infos()
            .iter()
            .zip(buffer.glyph_positions())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id,
                cluster: info.cluster,
                unsafe_to_break: info.unsafe_to_break(),
                x_offset: pos.x_offset,
                y_offset: pos.y_offset,
                x_advance: pos.x_advance,
                y_advance: pos.y_advance,
            })
            .collect()
    }

    fn shape_uncached(
        text: &[char],
        font: &dyn FontRef,
        params: &ShapingParams,
    ) -> Result<ShapedRun> {
        let font_data = font.data();
        if font_data.is_empty() {
            return Ok(Self::fallback_shape(text, font, params));
        }

        let hr_font = HrFontRef::new(font_data)
            .map_err(|err| ShapingError::BackendError(format!("harfrust font: {err}")))?;

        // ShaperData caches font tables and is the expensive part
        let shaper_data = ShaperData::new(&hr_font);
        let shaper = shaper_data.shaper(&hr_font).build();

        let mut buffer = UnicodeBuffer::new();
        for (index, &ch) in text.iter().enumerate() {
            buffer.add(ch, index as u32);
        }
        buffer.set_direction(Self::to_hr_direction(params.direction));

        if let Some(ref lang) = params.language {
            if let Ok(language) = Language::from_str(lang) {
                buffer.set_language(language);
            }
        }

        if let Some(tag) = params.script {
            if let Some(script) = Script::from_iso15924_tag(Tag::new(&tag)) {
                buffer.set_script(script);
            }
        }

        let output = shaper.shape(buffer, &[]);
        Ok(ShapedRun {
            glyphs: Self::extract_glyphs(&output),
            direction: params.direction,
        })
    }
}

impl Default for HarfrustShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl Shaper for HarfrustShaper {
    fn name(&self) -> &'static str {
        "Harfrust"
    }

    fn shape(&self, text: &[char], font: &dyn FontRef, params: &ShapingParams) -> Result<ShapedRun> {
        if text.is_empty() {
            return Ok(ShapedRun {
                glyphs: Vec::new(),
                direction: params.direction,
            });
        }

        let Some(cache) = self.cache.as_ref() else {
            return Self::shape_uncached(text, font, params);
        };

        let key = ShapingCacheKey::new(text, font.data(), params);
        if let Some(run) = cache.lock().get(&key) {
            log::trace!("Shaping cache hit for {} chars", text.len());
            return Ok(run);
        }

        let run = Self::shape_uncached(text, font, params)?;
        cache.lock().insert(key, run.clone());
        Ok(run)
    }

    fn clear_cache(&self) {
        if let Some(cache) = self.cache.as_ref() {
            cache.lock().clear();
        }
    }
}
