// this_file: crates/sdftext-core/src/error.rs

//! Error types for sdftext

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TextError>;

/// Main error type for sdftext
#[derive(Debug, Error)]
pub enum TextError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Face loading failed: {0}")]
    FaceLoad(#[from] FaceLoadError),

    #[error("Shaping failed: {0}")]
    ShapingFailed(#[from] ShapingError),

    #[error("Rasterization failed: {0}")]
    RasterFailed(#[from] RasterError),

    #[error("Texture upload failed: {0}")]
    Texture(#[from] TextureError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification shared by every error the crates report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Format,
    ResourceExhausted,
    NotFound,
    Io,
    Backend,
}

impl TextError {
    /// Fold layer-specific errors into the shared taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            TextError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            TextError::Format(_) => ErrorKind::Format,
            TextError::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            TextError::NotFound(_) => ErrorKind::NotFound,
            TextError::FaceLoad(err) => err.kind(),
            TextError::ShapingFailed(err) => err.kind(),
            TextError::RasterFailed(err) => err.kind(),
            TextError::Texture(err) => err.kind(),
            TextError::Io(err) if err.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            TextError::Io(_) => ErrorKind::Io,
        }
    }

    /// Shorthand for reporting a failed `try_reserve`
    pub fn out_of_memory(what: &str) -> Self {
        TextError::ResourceExhausted(format!("allocation failed for {what}"))
    }
}

/// Face loading errors
#[derive(Debug, Error)]
pub enum FaceLoadError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid font data")]
    InvalidData,

    #[error("Font is not scalable: {0}")]
    NotScalable(String),

    #[error("Face name is empty")]
    EmptyName,

    #[error("Face name exceeds {max} bytes: {name}")]
    NameTooLong { name: String, max: usize },

    #[error("Face already loaded: {0}")]
    DuplicateName(String),

    #[error("Face registry is full ({0} faces)")]
    CapacityExceeded(usize),
}

impl FaceLoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FaceLoadError::FileNotFound(_) => ErrorKind::NotFound,
            FaceLoadError::InvalidData | FaceLoadError::NotScalable(_) => ErrorKind::Format,
            FaceLoadError::EmptyName
            | FaceLoadError::NameTooLong { .. }
            | FaceLoadError::DuplicateName(_) => ErrorKind::InvalidArgument,
            FaceLoadError::CapacityExceeded(_) => ErrorKind::ResourceExhausted,
        }
    }
}

/// Shaping errors
#[derive(Debug, Error)]
pub enum ShapingError {
    #[error("Invalid text input: {0}")]
    InvalidText(String),

    #[error("Shaping buffer exhausted")]
    BufferExhausted,

    #[error("Shaped ranges do not partition the text: {0}")]
    InconsistentRanges(String),

    #[error("Backend error: {0}")]
    BackendError(String),
}

impl ShapingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShapingError::InvalidText(_) => ErrorKind::Format,
            ShapingError::BufferExhausted => ErrorKind::ResourceExhausted,
            ShapingError::InconsistentRanges(_) | ShapingError::BackendError(_) => {
                ErrorKind::Backend
            }
        }
    }
}

/// Rasterization errors
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Invalid font data")]
    InvalidFont,

    #[error("Glyph not found: {0}")]
    GlyphNotFound(u32),

    #[error("Outline extraction failed")]
    OutlineExtractionFailed,

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Out of memory")]
    OutOfMemory,
}

impl RasterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RasterError::InvalidFont => ErrorKind::Format,
            RasterError::GlyphNotFound(_) => ErrorKind::NotFound,
            RasterError::OutlineExtractionFailed | RasterError::InvalidDimensions { .. } => {
                ErrorKind::Backend
            }
            RasterError::OutOfMemory => ErrorKind::ResourceExhausted,
        }
    }
}

/// Errors reported by the texture upload seam
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Region {x},{y} {width}x{height} outside mip level {mip_level}")]
    RegionOutOfBounds {
        mip_level: u32,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Backend error: {0}")]
    BackendError(String),
}

impl TextureError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TextureError::RegionOutOfBounds { .. } | TextureError::SizeMismatch { .. } => {
                ErrorKind::InvalidArgument
            }
            TextureError::BackendError(_) => ErrorKind::Backend,
        }
    }
}
