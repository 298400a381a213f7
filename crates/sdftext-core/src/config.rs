// this_file: crates/sdftext-core/src/config.rs

//! Registry configuration
//!
//! Defaults suit a UI with a handful of faces. Two environment variables
//! override them at startup:
//!
//! ```bash
//! SDFTEXT_MAX_FACES=4 SDFTEXT_QUALITY=high ./my_app
//! ```

use crate::types::TextQuality;

/// Env var holding the maximum number of faces
pub const MAX_FACES_ENV: &str = "SDFTEXT_MAX_FACES";

/// Env var holding the quality tier name
pub const QUALITY_ENV: &str = "SDFTEXT_QUALITY";

/// How a face registry is sized and which glyph cell it targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Hard limit on loaded faces
    pub max_faces: usize,
    /// Glyph cell tier used by every font built from the registry
    pub quality: TextQuality,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_faces: 16,
            quality: TextQuality::Medium,
        }
    }
}

impl RegistryConfig {
    pub fn new(max_faces: usize, quality: TextQuality) -> Self {
        Self { max_faces, quality }
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            std::env::var(MAX_FACES_ENV).ok().as_deref(),
            std::env::var(QUALITY_ENV).ok().as_deref(),
        )
    }

    /// Apply raw override strings; unparsable values are logged and ignored
    pub fn with_overrides(mut self, max_faces: Option<&str>, quality: Option<&str>) -> Self {
        if let Some(value) = max_faces {
            match value.trim().parse::<usize>() {
                Ok(parsed) if parsed > 0 => {
                    log::info!("sdftext max faces set to {} via {}", parsed, MAX_FACES_ENV);
                    self.max_faces = parsed;
                }
                _ => log::warn!("Ignoring invalid {}='{}'", MAX_FACES_ENV, value),
            }
        }

        if let Some(value) = quality {
            match value.parse::<TextQuality>() {
                Ok(parsed) => {
                    log::info!("sdftext quality set to {:?} via {}", parsed, QUALITY_ENV);
                    self.quality = parsed;
                }
                Err(err) => log::warn!("Ignoring {}: {}", QUALITY_ENV, err),
            }
        }

        self
    }
}
