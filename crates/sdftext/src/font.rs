// this_file: crates/sdftext/src/font.rs

//! Fonts: an ordered list of faces sharing one glyph cache and one atlas
//!
//! The first face is the primary one; the others are fallbacks tried in
//! order when a run starts with a character the primary face lacks.
//!
//! A font's rasterization buffers and texture are single-writer: only one
//! command context may be filling its cache at a time. `&mut self` on every
//! cache-touching method enforces that at compile time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sdftext_core::{
    error::{Result, TextError},
    traits::GlyphTexture,
    types::{AlignedBox, AtlasDescriptor, CacheSize, GlyphBitmap, GlyphId, Vec2},
};

use crate::atlas::{AtlasLayout, TexturePosition};
use crate::glyph_cache::{CachedGlyph, GlyphCache, GlyphKey};
use crate::registry::{Face, FaceRegistry};
use crate::sdf;

static NEXT_FONT_ID: AtomicU64 = AtomicU64::new(1);

/// A glyph ready to be drawn from the atlas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphInfo {
    /// Bounds in glyph cell units, y up, relative to the pen
    pub bounds: AlignedBox,
    /// Bitmap footprint in pixels
    pub tex_size: (u32, u32),
    pub position: TexturePosition,
}

pub struct Font<T: GlyphTexture> {
    id: u64,
    registry: Arc<FaceRegistry>,
    faces: Vec<Arc<Face>>,
    atlas: AtlasLayout,
    cache: GlyphCache,
    texture: T,
    /// Distance field scratch, sized for the largest glyph seen so far
    field: Vec<f32>,
    /// One resampled atlas cell
    cell: Vec<u8>,
    max_width: u32,
    max_height: u32,
}

impl<T: GlyphTexture> Font<T> {
    /// Build a font from faces already loaded into `registry`
    ///
    /// `create_texture` receives the atlas shape and returns whatever the
    /// rendering layer uses to hold it.
    pub fn create(
        registry: Arc<FaceRegistry>,
        face_names: &[&str],
        cache_size: CacheSize,
        create_texture: impl FnOnce(&AtlasDescriptor) -> Result<T>,
    ) -> Result<Self> {
        if face_names.is_empty() {
            return Err(TextError::InvalidArgument(
                "a font needs at least one face".to_string(),
            ));
        }

        let faces = registry.with_lock(|state| {
            face_names
                .iter()
                .map(|&name| {
                    state.find(name).ok_or_else(|| {
                        log::error!("Face '{}' not found in registry", name);
                        TextError::NotFound(format!("face '{name}'"))
                    })
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let atlas = AtlasLayout::new(registry.quality(), cache_size);
        let texture = create_texture(&atlas.descriptor())?;

        let glyph_size = atlas.glyph_size() as usize;
        let mut cell = Vec::new();
        cell.try_reserve_exact(glyph_size * glyph_size)
            .map_err(|_| TextError::out_of_memory("atlas cell"))?;
        cell.resize(glyph_size * glyph_size, 0u8);

        let mut font = Self {
            id: NEXT_FONT_ID.fetch_add(1, Ordering::Relaxed),
            registry,
            faces,
            atlas,
            cache: GlyphCache::new(atlas.slot_count()),
            texture,
            field: Vec::new(),
            cell,
            max_width: 0,
            max_height: 0,
        };

        let (width, height) = font
            .faces
            .iter()
            .map(|face| face.max_size())
            .fold((0, 0), |(w, h), (fw, fh)| (w.max(fw), h.max(fh)));
        font.reserve_for(width, height)?;

        log::debug!(
            "Created font {} with {} faces, {} atlas slots, {}px cells",
            font.id,
            font.faces.len(),
            font.cache.capacity(),
            font.atlas.glyph_size()
        );
        Ok(font)
    }

    /// Process-unique id, used to match texts to the font that shaped them
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn registry(&self) -> &Arc<FaceRegistry> {
        &self.registry
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index).map(Arc::as_ref)
    }

    pub fn face_name(&self, index: usize) -> Option<&str> {
        self.face(index).map(Face::name)
    }

    pub fn faces(&self) -> &[Arc<Face>] {
        &self.faces
    }

    pub fn atlas(&self) -> &AtlasLayout {
        &self.atlas
    }

    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }

    pub fn texture(&self) -> &T {
        &self.texture
    }

    pub fn texture_mut(&mut self) -> &mut T {
        &mut self.texture
    }

    /// Fetch a glyph from the cache, rendering it into the atlas on a miss
    ///
    /// Takes the registry lock for the duration of the call.
    pub fn get_or_render(
        &mut self,
        commands: &mut T::Commands,
        face: u32,
        glyph: GlyphId,
    ) -> Result<GlyphInfo> {
        let registry = Arc::clone(&self.registry);
        registry.with_lock(|_| self.glyph_info(commands, face, glyph))
    }

    /// Cache lookup and render without taking the registry lock
    ///
    /// Layout calls this while it already holds the lock.
    pub(crate) fn glyph_info(
        &mut self,
        commands: &mut T::Commands,
        face: u32,
        glyph: GlyphId,
    ) -> Result<GlyphInfo> {
        let key = GlyphKey::new(face, glyph);
        if let Some(cached) = self.cache.lookup(key) {
            log::trace!("Glyph cache hit for {:?}", key);
            return Ok(self.info(cached));
        }
        log::trace!("Glyph cache miss for {:?}", key);

        let face_ref = self.faces.get(face as usize).ok_or_else(|| {
            TextError::InvalidArgument(format!(
                "face index {} out of range for {} faces",
                face,
                self.faces.len()
            ))
        })?;

        let glyph_size = self.atlas.glyph_size();
        let bitmap = match self
            .registry
            .rasterizer()
            .render_glyph(face_ref.font(), glyph, glyph_size)
        {
            Ok(bitmap) => bitmap,
            Err(err) => {
                log::warn!(
                    "Rasterizing glyph {} of face '{}' failed, using a blank glyph: {}",
                    glyph,
                    face_ref.name(),
                    err
                );
                GlyphBitmap::empty()
            }
        };

        // Everything that can fail runs before a slot is claimed, so an
        // error leaves the cache as it was.
        self.reserve_for(bitmap.width, bitmap.height)?;
        let (width, height) = sdf::compute_sdf(&bitmap, self.atlas.window_size(), &mut self.field)?;
        sdf::resample(&self.field, width, height, glyph_size, &mut self.cell)?;

        let claim = self
            .cache
            .claim(key)
            .ok_or_else(|| TextError::ResourceExhausted("glyph cache has no slots".to_string()))?;
        let position = self.atlas.slot_position(claim.slot);
        if let Err(err) = self
            .texture
            .copy_region(commands, &self.atlas.region(position), &self.cell)
        {
            self.cache.forget(claim.slot);
            return Err(err);
        }

        let bounds = glyph_bounds(&bitmap, glyph_size);
        let tex_size = (bitmap.width, bitmap.height);
        self.cache.store(claim.slot, bounds, tex_size);

        Ok(GlyphInfo {
            bounds,
            tex_size,
            position,
        })
    }

    /// Normalised texture coordinates for a cached glyph
    pub fn texture_bounds(&self, info: &GlyphInfo) -> AlignedBox {
        self.atlas.texture_bounds(info.position, info.tex_size)
    }

    fn info(&self, cached: CachedGlyph) -> GlyphInfo {
        GlyphInfo {
            bounds: cached.bounds,
            tex_size: cached.tex_size,
            position: self.atlas.slot_position(cached.slot),
        }
    }

    /// Grow the distance field buffer to fit a `width`×`height` bitmap
    fn reserve_for(&mut self, width: u32, height: u32) -> Result<()> {
        if width <= self.max_width && height <= self.max_height && !self.field.is_empty() {
            return Ok(());
        }

        let width = width.max(self.max_width);
        let height = height.max(self.max_height);
        let (padded_w, padded_h) = sdf::working_size(width, height, self.atlas.window_size());
        let needed = padded_w as usize * padded_h as usize;
        if needed > self.field.len() {
            self.field
                .try_reserve_exact(needed - self.field.len())
                .map_err(|_| TextError::out_of_memory("distance field buffer"))?;
            self.field.resize(needed, 0.0);
        }

        self.max_width = width;
        self.max_height = height;
        Ok(())
    }
}

/// Bitmap placement in glyph cell units, y up
fn glyph_bounds(bitmap: &GlyphBitmap, glyph_size: u32) -> AlignedBox {
    if bitmap.is_empty() {
        return AlignedBox::zero();
    }

    let size = glyph_size as f32;
    let min = Vec2::new(
        bitmap.left as f32 / size,
        (bitmap.top - bitmap.height as i32) as f32 / size,
    );
    AlignedBox::new(
        min,
        Vec2::new(
            min.x + bitmap.width as f32 / size,
            min.y + bitmap.height as f32 / size,
        ),
    )
}
