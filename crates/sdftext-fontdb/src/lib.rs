// this_file: crates/sdftext-fontdb/src/lib.rs

//! Where font bytes become faces
//!
//! A [`FontFace`] keeps the raw file data and parses tables on demand, so
//! it is cheap to share behind an `Arc` and works for TTC collections too.
//! Only the handful of tables the atlas needs are read: `head` for the
//! em size and global bounding box, `cmap` for character lookup, `hmtx`
//! for advances and the outline tables to decide whether the face scales.

use std::fs;
use std::path::Path;

use read_fonts::types::{GlyphId, Tag};
use read_fonts::{FontRef as ReadFontRef, TableProvider};

use sdftext_core::{
    error::{FaceLoadError, Result},
    traits::FontRef,
    types::FontBox,
};

const OUTLINE_TABLES: [Tag; 3] = [Tag::new(b"glyf"), Tag::new(b"CFF "), Tag::new(b"CFF2")];

/// One face of a font file, held in memory
pub struct FontFace {
    data: Vec<u8>,
    face_index: u32,
    units_per_em: u16,
    bounding_box: Option<FontBox>,
    scalable: bool,
}

impl FontFace {
    /// Opens a font file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_index(path, 0)
    }

    /// Opens one face of a collection file
    pub fn from_file_index(path: impl AsRef<Path>, face_index: u32) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)
            .map_err(|_| FaceLoadError::FileNotFound(path.display().to_string()))?;

        Self::from_data_index(data, face_index)
    }

    /// Parses raw font bytes
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        Self::from_data_index(data, 0)
    }

    /// Parses one face out of raw font bytes
    pub fn from_data_index(data: Vec<u8>, face_index: u32) -> Result<Self> {
        let font =
            ReadFontRef::from_index(&data, face_index).map_err(|_| FaceLoadError::InvalidData)?;

        let head = font.head().ok();
        let units_per_em = head
            .as_ref()
            .map(|head| head.units_per_em())
            .filter(|&upem| upem > 0)
            .unwrap_or(1000);
        let bounding_box = head.as_ref().map(|head| FontBox {
            x_min: head.x_min(),
            y_min: head.y_min(),
            x_max: head.x_max(),
            y_max: head.y_max(),
        });
        let scalable = OUTLINE_TABLES
            .iter()
            .any(|&tag| font.table_data(tag).is_some());

        log::debug!(
            "Parsed face {} ({} bytes): upem {}, scalable {}",
            face_index,
            data.len(),
            units_per_em,
            scalable
        );

        Ok(FontFace {
            data,
            face_index,
            units_per_em,
            bounding_box,
            scalable,
        })
    }

    /// Index of this face inside its file (0 for single fonts)
    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    fn font_ref(&self) -> Option<ReadFontRef<'_>> {
        ReadFontRef::from_index(&self.data, self.face_index).ok()
    }
}

impl FontRef for FontFace {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn glyph_id(&self, ch: char) -> Option<u32> {
        self.font_ref()
            .and_then(|font| font.cmap().ok()?.map_codepoint(ch).map(|gid| gid.to_u32()))
    }

    fn advance_width(&self, glyph_id: u32) -> f32 {
        self.font_ref()
            .and_then(|font| font.hmtx().ok()?.advance(GlyphId::new(glyph_id)))
            .map(f32::from)
            .unwrap_or(0.0)
    }

    fn is_scalable(&self) -> bool {
        self.scalable
    }

    fn bounding_box(&self) -> Option<FontBox> {
        self.bounding_box
    }

    fn glyph_count(&self) -> Option<u32> {
        self.font_ref()
            .and_then(|font| font.maxp().ok().map(|maxp| u32::from(maxp.num_glyphs())))
    }
}
