// this_file: crates/sdftext/src/registry.rs

//! The face registry: every loaded face, plus the state shaping shares
//!
//! Fonts borrow faces from a registry by name. The registry also owns the
//! script classifier, the shaping and rasterizing backends and a scratch
//! arena, all behind one lock. Composite work (shaping a string, filling
//! the glyph cache for a layout) takes the lock once through
//! [`FaceRegistry::with_lock`] and keeps it for the whole operation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use sdftext_core::{
    config::RegistryConfig,
    error::{FaceLoadError, Result},
    traits::{FontRef, Rasterizer, Shaper},
    types::TextQuality,
    MAX_FACE_NAME_LENGTH,
};
use sdftext_fontdb::FontFace;
use sdftext_unicode::ScriptClassifier;

use crate::scratch::ScratchArena;

/// One loaded, scalable face
pub struct Face {
    name: String,
    font: Arc<dyn FontRef>,
    /// Largest glyph box in pixels at the registry's glyph size
    max_width: u32,
    max_height: u32,
}

impl Face {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn font(&self) -> &dyn FontRef {
        self.font.as_ref()
    }

    /// Upper bound on any glyph bitmap this face renders, in pixels
    pub fn max_size(&self) -> (u32, u32) {
        (self.max_width, self.max_height)
    }
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Face")
            .field("name", &self.name)
            .field("max_width", &self.max_width)
            .field("max_height", &self.max_height)
            .finish()
    }
}

/// Everything guarded by the registry lock
#[derive(Default)]
pub struct RegistryState {
    faces: Vec<Arc<Face>>,
    by_name: HashMap<String, usize>,
    pub scratch: ScratchArena,
}

impl RegistryState {
    pub fn find(&self, name: &str) -> Option<Arc<Face>> {
        self.by_name.get(name).map(|&index| Arc::clone(&self.faces[index]))
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn faces(&self) -> &[Arc<Face>] {
        &self.faces
    }
}

pub struct FaceRegistry {
    config: RegistryConfig,
    classifier: ScriptClassifier,
    shaper: Arc<dyn Shaper>,
    rasterizer: Arc<dyn Rasterizer>,
    state: Mutex<RegistryState>,
}

impl FaceRegistry {
    /// Registry using the harfrust shaper and the zeno rasterizer
    #[cfg(all(feature = "shaping-hr", feature = "render-zeno"))]
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_backends(
            config,
            Arc::new(sdftext_shape_hr::HarfrustShaper::with_cache()),
            Arc::new(sdftext_render_zeno::ZenoRasterizer::new()),
        )
    }

    /// Registry with caller-supplied backends
    pub fn with_backends(
        config: RegistryConfig,
        shaper: Arc<dyn Shaper>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        log::debug!(
            "Creating face registry: {} faces max, {:?} quality, shaper {}, rasterizer {}",
            config.max_faces,
            config.quality,
            shaper.name(),
            rasterizer.name()
        );

        Self {
            config,
            classifier: ScriptClassifier::new(),
            shaper,
            rasterizer,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Parse font bytes and register the face under `name`
    pub fn load_face(&self, name: &str, data: Vec<u8>) -> Result<Arc<Face>> {
        self.with_lock(|state| self.check_insert(state, name))?;
        let face = FontFace::from_data(data)?;
        self.add_face(name, Arc::new(face))
    }

    /// Read a font file and register the face under `name`
    pub fn load_face_file(&self, name: &str, path: impl AsRef<Path>) -> Result<Arc<Face>> {
        self.with_lock(|state| self.check_insert(state, name))?;
        let face = FontFace::from_file(path)?;
        self.add_face(name, Arc::new(face))
    }

    /// Register an already parsed face
    pub fn add_face(&self, name: &str, font: Arc<dyn FontRef>) -> Result<Arc<Face>> {
        self.with_lock(|state| {
            self.check_insert(state, name)?;
            if !font.is_scalable() {
                return Err(FaceLoadError::NotScalable(name.to_string()).into());
            }

            let (max_width, max_height) = self.max_glyph_size(font.as_ref());
            let face = Arc::new(Face {
                name: name.to_string(),
                font,
                max_width,
                max_height,
            });

            state.by_name.insert(face.name.clone(), state.faces.len());
            state.faces.push(Arc::clone(&face));
            log::debug!(
                "Loaded face '{}' ({}x{} px max), {} of {}",
                name,
                max_width,
                max_height,
                state.faces.len(),
                self.config.max_faces
            );
            Ok(face)
        })
    }

    pub fn find(&self, name: &str) -> Option<Arc<Face>> {
        self.state.lock().find(name)
    }

    pub fn has_face(&self, name: &str) -> bool {
        self.state.lock().by_name.contains_key(name)
    }

    pub fn face_count(&self) -> usize {
        self.state.lock().faces.len()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.config.max_faces.saturating_sub(self.face_count())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn quality(&self) -> TextQuality {
        self.config.quality
    }

    /// Atlas cell edge in pixels for fonts built from this registry
    pub fn glyph_size(&self) -> u32 {
        self.config.quality.glyph_size()
    }

    pub fn classifier(&self) -> &ScriptClassifier {
        &self.classifier
    }

    pub fn shaper(&self) -> &dyn Shaper {
        self.shaper.as_ref()
    }

    pub fn rasterizer(&self) -> &dyn Rasterizer {
        self.rasterizer.as_ref()
    }

    /// Run `f` with the registry locked
    ///
    /// The lock is not reentrant: calling back into a locking registry
    /// method from inside `f` deadlocks.
    pub fn with_lock<T>(&self, f: impl FnOnce(&mut RegistryState) -> T) -> T {
        let mut state = self.state.lock();
        f(&mut state)
    }

    fn check_insert(&self, state: &RegistryState, name: &str) -> Result<()> {
        if state.faces.len() >= self.config.max_faces {
            return Err(FaceLoadError::CapacityExceeded(self.config.max_faces).into());
        }
        if name.is_empty() {
            return Err(FaceLoadError::EmptyName.into());
        }
        if name.len() >= MAX_FACE_NAME_LENGTH {
            return Err(FaceLoadError::NameTooLong {
                name: name.to_string(),
                max: MAX_FACE_NAME_LENGTH,
            }
            .into());
        }
        if state.by_name.contains_key(name) {
            return Err(FaceLoadError::DuplicateName(name.to_string()).into());
        }
        Ok(())
    }

    /// Font bounding box scaled to the glyph cell, or the cell itself
    fn max_glyph_size(&self, font: &dyn FontRef) -> (u32, u32) {
        let glyph_size = self.glyph_size();
        let Some(bbox) = font.bounding_box() else {
            return (glyph_size, glyph_size);
        };

        let upem = f32::from(font.units_per_em().max(1));
        let to_pixels = |extent: i32| (extent.max(0) as f32 * glyph_size as f32 / upem).ceil();
        let width = to_pixels(i32::from(bbox.x_max) - i32::from(bbox.x_min));
        let height = to_pixels(i32::from(bbox.y_max) - i32::from(bbox.y_min));
        (width as u32, height as u32)
    }
}
