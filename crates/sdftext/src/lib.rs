// this_file: crates/sdftext/src/lib.rs

//! sdftext - signed distance field text for GPU renderers
//!
//! Strings go in, positioned glyph quads sampling a shared atlas come out:
//! 1. Faces are loaded once into a [`FaceRegistry`]
//! 2. A [`Font`] groups faces in fallback order around one glyph atlas
//! 3. [`Text::create`] cuts a string into runs and shapes them
//! 4. [`TextLayout::layout`] breaks lines, justifies them and renders any
//!    missing glyphs into the atlas as distance fields
//! 5. [`TextRenderBuffer`] batches the result into vertices and indices
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sdftext::prelude::*;
//!
//! let registry = Arc::new(FaceRegistry::new(RegistryConfig::from_env()));
//! registry.load_face_file("sans", "fonts/NotoSans-Regular.ttf")?;
//!
//! let mut font = Font::create(Arc::clone(&registry), &["sans"], CacheSize::Large, |desc| {
//!     MemoryTexture::new(*desc)
//! })?;
//! let text = Arc::new(Text::create(&font, "Hello, world", Segmentation::Script)?);
//! let mut layout = TextLayout::new(text, &[TextStyle::new(0, 12, 16.0)])?;
//! layout.layout(&mut font, &mut (), Justification::Left, 320.0, 1.2)?;
//! ```
//!
//! # Capacity contract
//!
//! The atlas recycles its least recently used slot whenever it is full,
//! without checking whether a queued draw still samples it. Never draw more
//! distinct glyphs in one batch than [`AtlasLayout::slot_count`].
//!
//! # Feature Flags
//!
//! - `shaping-hr`: harfrust shaping backend (default)
//! - `render-zeno`: zeno rasterizing backend (default)
//!
//! [`FaceRegistry::new`] needs both; [`FaceRegistry::with_backends`] takes
//! any [`Shaper`](traits::Shaper) and [`Rasterizer`](traits::Rasterizer).

pub mod atlas;
pub mod font;
pub mod glyph_cache;
pub mod layout;
pub mod registry;
pub mod render_buffer;
pub mod scratch;
pub mod sdf;
pub mod text;
pub mod texture;

pub use sdftext_core::{config, error, traits, types, ErrorKind, RegistryConfig, Result, TextError};
pub use sdftext_unicode::TextInput;

#[cfg(feature = "shaping-hr")]
pub use sdftext_shape_hr as shape_hr;

#[cfg(feature = "render-zeno")]
pub use sdftext_render_zeno as render_zeno;

pub use atlas::{AtlasLayout, TexturePosition};
pub use font::{Font, GlyphInfo};
pub use glyph_cache::{CachedGlyph, GlyphCache, GlyphKey};
pub use layout::{GlyphLayout, Justification, TextLayout, TextLine, TextStyle};
pub use registry::{Face, FaceRegistry, RegistryState};
pub use render_buffer::{quad_vertices, GlyphVertex, IndexData, TextBatch, TextRenderBuffer};
pub use scratch::ScratchArena;
pub use text::{CharMapping, Segmentation, Text, TextGlyph, TextRange};
pub use texture::MemoryTexture;

/// Common imports for typical usage
pub mod prelude {
    pub use crate::{
        Face, FaceRegistry, Font, GlyphLayout, Justification, MemoryTexture, Segmentation, Text,
        TextInput, TextLayout, TextRenderBuffer, TextStyle,
    };
    pub use sdftext_core::{
        error::{Result, TextError},
        traits::{FontRef, GlyphTexture, Rasterizer, Shaper},
        types::{CacheSize, Direction, TextQuality},
        ErrorKind, RegistryConfig,
    };
}
