// this_file: crates/sdftext-core/src/lib.rs

//! sdftext core: shared vocabulary for the glyph atlas and text layout crates
//!
//! Everything that more than one crate needs to agree on lives here: the
//! error taxonomy, plain data types, the traits that backends implement,
//! and the small amount of configuration the registry reads at startup.
//!
//! ## The Seams
//!
//! - [`traits::FontRef`] - a parsed font face the rest of the system can query
//! - [`traits::Shaper`] - turns a code point run into positioned glyphs
//! - [`traits::Rasterizer`] - turns one glyph into a coverage bitmap
//! - [`traits::GlyphTexture`] - receives atlas uploads on behalf of a GPU layer

pub mod config;
pub mod error;
pub mod traits;

pub use config::RegistryConfig;
pub use error::{ErrorKind, Result, TextError};

/// Base window size in pixels at the lowest quality tier
pub const BASE_WINDOW_SIZE: u32 = 4;

/// Maximum length in bytes of a face name, exclusive
pub const MAX_FACE_NAME_LENGTH: usize = 100;

/// Plain data types shared across crates
pub mod types {
    /// Glyph index inside a single face
    pub type GlyphId = u32;

    /// Horizontal writing direction of a run
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum Direction {
        #[default]
        LeftToRight,
        RightToLeft,
    }

    impl Direction {
        /// True when glyphs advance against the reading order
        pub fn is_backward(self) -> bool {
            matches!(self, Direction::RightToLeft)
        }
    }

    /// Glyph cell size tiers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum TextQuality {
        Low,
        #[default]
        Medium,
        High,
        VeryHigh,
    }

    impl TextQuality {
        /// Edge length in pixels of one atlas cell
        pub fn glyph_size(self) -> u32 {
            match self {
                TextQuality::Low => 24,
                TextQuality::Medium => 32,
                TextQuality::High => 48,
                TextQuality::VeryHigh => 64,
            }
        }

        /// Half-width of the signed distance search window for this tier
        pub fn window_size(self) -> u32 {
            self.glyph_size() * crate::BASE_WINDOW_SIZE / TextQuality::Low.glyph_size()
        }
    }

    impl std::str::FromStr for TextQuality {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().as_str() {
                "low" => Ok(TextQuality::Low),
                "medium" => Ok(TextQuality::Medium),
                "high" => Ok(TextQuality::High),
                "very-high" | "veryhigh" | "very_high" => Ok(TextQuality::VeryHigh),
                other => Err(format!("unknown text quality '{other}'")),
            }
        }
    }

    /// Atlas capacity presets
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum CacheSize {
        Small,
        #[default]
        Large,
    }

    impl CacheSize {
        /// Number of cells along one edge of mip level 0
        pub fn multiplier(self) -> u32 {
            match self {
                CacheSize::Small => 16,
                CacheSize::Large => 32,
            }
        }

        /// Mip levels used to hold glyphs
        pub fn mip_levels(self) -> u32 {
            match self {
                CacheSize::Small => 5,
                CacheSize::Large => 6,
            }
        }
    }

    /// 2D vector in layout units
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Vec2 {
        pub x: f32,
        pub y: f32,
    }

    impl Vec2 {
        pub const fn new(x: f32, y: f32) -> Self {
            Self { x, y }
        }
    }

    /// Axis-aligned box; `min > max` marks an empty box
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct AlignedBox {
        pub min: Vec2,
        pub max: Vec2,
    }

    impl AlignedBox {
        pub const fn new(min: Vec2, max: Vec2) -> Self {
            Self { min, max }
        }

        /// A box that contains nothing and absorbs the first box added to it
        pub const fn invalid() -> Self {
            Self {
                min: Vec2::new(f32::MAX, f32::MAX),
                max: Vec2::new(-f32::MAX, -f32::MAX),
            }
        }

        /// Zero-sized box at the origin
        pub const fn zero() -> Self {
            Self {
                min: Vec2::new(0.0, 0.0),
                max: Vec2::new(0.0, 0.0),
            }
        }

        pub fn is_valid(&self) -> bool {
            self.min.x <= self.max.x && self.min.y <= self.max.y
        }

        /// True when the box covers no area
        pub fn is_degenerate(&self) -> bool {
            !(self.min.x < self.max.x && self.min.y < self.max.y)
        }

        pub fn add_point(&mut self, point: Vec2) {
            self.min.x = self.min.x.min(point.x);
            self.min.y = self.min.y.min(point.y);
            self.max.x = self.max.x.max(point.x);
            self.max.y = self.max.y.max(point.y);
        }

        pub fn add_box(&mut self, other: &AlignedBox) {
            if !other.is_valid() {
                return;
            }
            self.add_point(other.min);
            self.add_point(other.max);
        }

        pub fn width(&self) -> f32 {
            self.max.x - self.min.x
        }

        pub fn height(&self) -> f32 {
            self.max.y - self.min.y
        }

        pub fn translated(&self, offset: Vec2) -> Self {
            Self {
                min: Vec2::new(self.min.x + offset.x, self.min.y + offset.y),
                max: Vec2::new(self.max.x + offset.x, self.max.y + offset.y),
            }
        }
    }

    impl Default for AlignedBox {
        fn default() -> Self {
            Self::invalid()
        }
    }

    /// Font-unit bounding box from the `head` table
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FontBox {
        pub x_min: i16,
        pub y_min: i16,
        pub x_max: i16,
        pub y_max: i16,
    }

    /// Coverage bitmap for one glyph, rows top to bottom
    ///
    /// Any non-zero byte counts as inside the outline.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GlyphBitmap {
        pub width: u32,
        pub height: u32,
        /// Distance from the pen origin to the left edge, in pixels
        pub left: i32,
        /// Distance from the baseline up to the top edge, in pixels
        pub top: i32,
        pub data: Vec<u8>,
    }

    impl GlyphBitmap {
        /// Blank result for glyphs without ink
        pub fn empty() -> Self {
            Self::default()
        }

        pub fn is_empty(&self) -> bool {
            self.width == 0 || self.height == 0
        }
    }

    /// One glyph as produced by a shaping backend, in font units
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ShapedGlyph {
        pub glyph_id: GlyphId,
        /// Index of the source code point relative to the shaped run
        pub cluster: u32,
        pub unsafe_to_break: bool,
        pub x_offset: i32,
        pub y_offset: i32,
        pub x_advance: i32,
        pub y_advance: i32,
    }

    /// Output of one shaping call, glyphs in visual order
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ShapedRun {
        pub glyphs: Vec<ShapedGlyph>,
        pub direction: Direction,
    }

    /// Parameters that describe the run being shaped
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ShapingParams {
        pub direction: Direction,
        /// ISO 15924 tag, e.g. `*b"Latn"`
        pub script: Option<[u8; 4]>,
        /// BCP 47 language tag
        pub language: Option<String>,
    }

    /// Pixel layouts understood by [`crate::traits::GlyphTexture`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum PixelFormat {
        /// One normalised byte per pixel
        R8Unorm,
    }

    /// Shape of the atlas texture a font asks its texture layer to create
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AtlasDescriptor {
        pub format: PixelFormat,
        pub width: u32,
        pub height: u32,
        pub mip_levels: u32,
    }

    /// Destination of one texture copy
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureRegion {
        pub mip_level: u32,
        pub x: u32,
        pub y: u32,
        pub width: u32,
        pub height: u32,
    }
}
