// this_file: crates/sdftext/src/texture.rs

//! CPU-side atlas texture
//!
//! Headless tools and tests need somewhere to put distance fields without a
//! GPU. [`MemoryTexture`] keeps one byte buffer per mip level and checks
//! every copy against the level bounds the way a graphics API would.

use sdftext_core::{
    error::{Result, TextError, TextureError},
    traits::GlyphTexture,
    types::{AtlasDescriptor, TextureRegion},
};

/// R8 texture with every mip level held in memory
#[derive(Debug, Clone)]
pub struct MemoryTexture {
    descriptor: AtlasDescriptor,
    levels: Vec<Vec<u8>>,
    uploads: usize,
}

impl MemoryTexture {
    /// Allocate zeroed storage for every level of `descriptor`
    pub fn new(descriptor: AtlasDescriptor) -> Result<Self> {
        let mut levels = Vec::new();
        levels
            .try_reserve_exact(descriptor.mip_levels as usize)
            .map_err(|_| TextError::out_of_memory("texture levels"))?;

        for level in 0..descriptor.mip_levels {
            let (width, height) = level_extent(&descriptor, level);
            let mut pixels = Vec::new();
            pixels
                .try_reserve_exact(width as usize * height as usize)
                .map_err(|_| TextError::out_of_memory("texture level"))?;
            pixels.resize(width as usize * height as usize, 0u8);
            levels.push(pixels);
        }

        Ok(Self {
            descriptor,
            levels,
            uploads: 0,
        })
    }

    pub fn descriptor(&self) -> &AtlasDescriptor {
        &self.descriptor
    }

    /// Pixels of one mip level, rows top to bottom
    pub fn level(&self, mip_level: u32) -> Option<&[u8]> {
        self.levels.get(mip_level as usize).map(Vec::as_slice)
    }

    /// Width and height of one mip level
    pub fn level_size(&self, mip_level: u32) -> (u32, u32) {
        level_extent(&self.descriptor, mip_level)
    }

    /// Read back a region as tightly packed rows
    pub fn read_region(&self, region: &TextureRegion) -> Option<Vec<u8>> {
        let pixels = self.level(region.mip_level)?;
        let (width, height) = self.level_size(region.mip_level);
        if region.x + region.width > width || region.y + region.height > height {
            return None;
        }

        let mut out = Vec::with_capacity(region.width as usize * region.height as usize);
        for row in region.y..region.y + region.height {
            let start = (row * width + region.x) as usize;
            out.extend_from_slice(&pixels[start..start + region.width as usize]);
        }
        Some(out)
    }

    /// Number of copies accepted so far
    pub fn upload_count(&self) -> usize {
        self.uploads
    }
}

fn level_extent(descriptor: &AtlasDescriptor, level: u32) -> (u32, u32) {
    (
        (descriptor.width >> level).max(1),
        (descriptor.height >> level).max(1),
    )
}

impl GlyphTexture for MemoryTexture {
    /// Nothing to record into; copies land immediately
    type Commands = ();

    fn copy_region(
        &mut self,
        _commands: &mut Self::Commands,
        region: &TextureRegion,
        data: &[u8],
    ) -> Result<()> {
        let (width, height) = self.level_size(region.mip_level);
        let out_of_bounds = region.mip_level >= self.descriptor.mip_levels
            || region.x.saturating_add(region.width) > width
            || region.y.saturating_add(region.height) > height;
        if out_of_bounds {
            return Err(TextureError::RegionOutOfBounds {
                mip_level: region.mip_level,
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
            }
            .into());
        }

        let expected = region.width as usize * region.height as usize;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: data.len(),
            }
            .into());
        }

        let pixels = &mut self.levels[region.mip_level as usize];
        let row_len = region.width as usize;
        for (row, src) in data.chunks_exact(row_len.max(1)).enumerate() {
            let start = (region.y as usize + row) * width as usize + region.x as usize;
            pixels[start..start + row_len].copy_from_slice(src);
        }

        self.uploads += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdftext_core::types::PixelFormat;
    use sdftext_core::ErrorKind;

    fn texture() -> MemoryTexture {
        MemoryTexture::new(AtlasDescriptor {
            format: PixelFormat::R8Unorm,
            width: 8,
            height: 8,
            mip_levels: 2,
        })
        .unwrap()
    }

    #[test]
    fn levels_halve() {
        let tex = texture();
        assert_eq!(tex.level_size(0), (8, 8));
        assert_eq!(tex.level_size(1), (4, 4));
        assert_eq!(tex.level(1).unwrap().len(), 16);
        assert!(tex.level(2).is_none());
    }

    #[test]
    fn copy_lands_in_region() {
        let mut tex = texture();
        let region = TextureRegion {
            mip_level: 1,
            x: 2,
            y: 1,
            width: 2,
            height: 2,
        };
        tex.copy_region(&mut (), &region, &[1, 2, 3, 4]).unwrap();

        assert_eq!(tex.read_region(&region).unwrap(), vec![1, 2, 3, 4]);
        let level = tex.level(1).unwrap();
        assert_eq!(&level[4..8], &[0, 0, 1, 2]);
        assert_eq!(tex.upload_count(), 1);
    }

    #[test]
    fn rejects_bad_copies() {
        let mut tex = texture();
        let outside = TextureRegion {
            mip_level: 1,
            x: 3,
            y: 0,
            width: 2,
            height: 1,
        };
        let err = tex.copy_region(&mut (), &outside, &[0, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let short = TextureRegion {
            mip_level: 0,
            x: 0,
            y: 0,
            width: 2,
            height: 2,
        };
        let err = tex.copy_region(&mut (), &short, &[0; 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(tex.upload_count(), 0);
    }
}
