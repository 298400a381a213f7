// this_file: crates/sdftext/src/sdf.rs

//! Signed distance fields from coverage bitmaps
//!
//! A glyph bitmap is padded by the search window on every side, turned into
//! a field of normalised distances, then squeezed into one atlas cell.
//! Values above 0.5 are inside the outline, values below are outside.

use sdftext_core::{
    error::{Result, TextError},
    types::GlyphBitmap,
};

/// Size of the padded working image for a bitmap
pub fn working_size(width: u32, height: u32, window: u32) -> (u32, u32) {
    (width + window * 2, height + window * 2)
}

/// Fill `out` with the signed distance field of `bitmap`
///
/// `out` must hold at least the [`working_size`] of the bitmap. Working
/// pixel `(x, y)` corresponds to bitmap pixel `(x - window, y - window)`;
/// everything outside the bitmap counts as empty.
pub fn compute_sdf(bitmap: &GlyphBitmap, window: u32, out: &mut [f32]) -> Result<(u32, u32)> {
    let (width, height) = working_size(bitmap.width, bitmap.height, window);
    let needed = width as usize * height as usize;
    if out.len() < needed {
        return Err(TextError::InvalidArgument(format!(
            "distance buffer holds {} values, need {}",
            out.len(),
            needed
        )));
    }
    if bitmap.data.len() < bitmap.width as usize * bitmap.height as usize {
        return Err(TextError::InvalidArgument(format!(
            "bitmap data too short for {}x{}",
            bitmap.width, bitmap.height
        )));
    }

    let ws = window as i32;
    let max_distance = ((2 * ws * ws) as f32).sqrt().max(1.0);
    let inside = |x: i32, y: i32| -> bool {
        let (bx, by) = (x - ws, y - ws);
        if bx < 0 || by < 0 || bx >= bitmap.width as i32 || by >= bitmap.height as i32 {
            return false;
        }
        bitmap.data[by as usize * bitmap.width as usize + bx as usize] != 0
    };

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let center = inside(x, y);
            let mut nearest = max_distance;
            for dy in -ws..=ws {
                for dx in -ws..=ws {
                    if inside(x + dx, y + dy) != center {
                        let distance = ((dx * dx + dy * dy) as f32).sqrt();
                        nearest = nearest.min(distance);
                    }
                }
            }

            let normalized = (nearest / max_distance).min(1.0);
            let signed = if center { normalized } else { -normalized };
            out[y as usize * width as usize + x as usize] = signed * 0.5 + 0.5;
        }
    }

    Ok((width, height))
}

/// Resample a `width`×`height` field into a `cell`×`cell` byte image
///
/// Axes larger than the cell are shrunk with a tent filter; smaller axes
/// are copied one to one and the rest of the cell is left at zero.
pub fn resample(sdf: &[f32], width: u32, height: u32, cell: u32, out: &mut [u8]) -> Result<()> {
    let needed = cell as usize * cell as usize;
    if out.len() < needed || sdf.len() < width as usize * height as usize {
        return Err(TextError::InvalidArgument(format!(
            "resample buffers too small for {}x{} into {}",
            width, height, cell
        )));
    }

    let scale_x = axis_scale(width, cell);
    let scale_y = axis_scale(height, cell);

    for y in 0..cell {
        let (y0, y1, center_y) = footprint(y, scale_y, height);
        for x in 0..cell {
            let (x0, x1, center_x) = footprint(x, scale_x, width);

            let mut total = 0.0f32;
            let mut total_weight = 0.0f32;
            for sy in y0..y1 {
                let wy = tent(sy, center_y, scale_y);
                if wy <= 0.0 {
                    continue;
                }
                for sx in x0..x1 {
                    let weight = wy * tent(sx, center_x, scale_x);
                    if weight <= 0.0 {
                        continue;
                    }
                    total += sdf[(sy * width + sx) as usize] * weight;
                    total_weight += weight;
                }
            }

            let value = if total_weight > 0.0 {
                total / total_weight
            } else {
                0.0
            };
            out[(y * cell + x) as usize] = (value * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }

    Ok(())
}

fn axis_scale(extent: u32, cell: u32) -> f32 {
    if extent > cell {
        cell as f32 / extent as f32
    } else {
        1.0
    }
}

/// Source range `[start, end)` and centre feeding one destination pixel
fn footprint(dest: u32, scale: f32, extent: u32) -> (u32, u32, f32) {
    let center = (dest as f32 + 0.5) / scale;
    let radius = 1.0 / scale;
    let start = (center - radius).floor().max(0.0) as u32;
    let end = ((center + radius).ceil().max(0.0) as u32).min(extent);
    (start.min(end), end, center)
}

fn tent(source: u32, center: f32, scale: f32) -> f32 {
    (1.0 - (source as f32 + 0.5 - center).abs() * scale).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bitmap(width: u32, height: u32, fill: u8) -> GlyphBitmap {
        GlyphBitmap {
            width,
            height,
            left: 0,
            top: height as i32,
            data: vec![fill; (width * height) as usize],
        }
    }

    fn field(bitmap: &GlyphBitmap, window: u32) -> (Vec<f32>, u32, u32) {
        let (w, h) = working_size(bitmap.width, bitmap.height, window);
        let mut out = vec![0.0; (w * h) as usize];
        compute_sdf(bitmap, window, &mut out).unwrap();
        (out, w, h)
    }

    #[test]
    fn empty_bitmap_is_all_outside() {
        let (sdf, w, h) = field(&bitmap(6, 5, 0), 4);
        assert!(sdf.iter().all(|&v| v == 0.0));

        let mut cell = vec![9u8; 24 * 24];
        resample(&sdf, w, h, 24, &mut cell).unwrap();
        assert!(cell.iter().all(|&v| v == 0));
    }

    #[test]
    fn solid_core_is_brightest() {
        let (sdf, w, h) = field(&bitmap(12, 12, 255), 4);
        assert_eq!((w, h), (20, 20));

        let mut cell = vec![0u8; 24 * 24];
        resample(&sdf, w, h, 24, &mut cell).unwrap();
        for y in 0..24 {
            for x in 0..24 {
                let value = cell[y * 24 + x];
                let in_field = x < 20 && y < 20;
                let in_glyph = (4..16).contains(&x) && (4..16).contains(&y);
                let deep = (8..12).contains(&x) && (8..12).contains(&y);
                if deep {
                    assert_eq!(value, 255, "({x},{y})");
                } else if in_glyph {
                    assert!(value >= 128, "({x},{y}) = {value}");
                } else if in_field {
                    assert!(value < 128, "({x},{y}) = {value}");
                } else {
                    assert_eq!(value, 0);
                }
            }
        }
    }

    #[test]
    fn edge_pixels_straddle_half() {
        // Single column: inside pixel next to outside is just above half
        let (sdf, w, _) = field(&bitmap(1, 1, 255), 4);
        let center = sdf[(4 * w + 4) as usize];
        let neighbour = sdf[(4 * w + 5) as usize];
        assert!(center > 0.5);
        assert!(neighbour < 0.5);
    }

    #[test]
    fn short_buffers_are_rejected() {
        let mut out = vec![0.0; 3];
        assert!(compute_sdf(&bitmap(2, 2, 255), 4, &mut out).is_err());
        let mut cell = vec![0u8; 3];
        assert!(resample(&[0.0; 4], 2, 2, 24, &mut cell).is_err());
    }

    #[test]
    fn large_fields_shrink_into_cell() {
        let sdf = vec![1.0f32; 48 * 30];
        let mut cell = vec![0u8; 24 * 24];
        resample(&sdf, 48, 30, 24, &mut cell).unwrap();
        assert!(cell.iter().all(|&v| v == 255));
    }

    proptest! {
        #[test]
        fn field_values_stay_normalised(
            width in 1u32..10,
            height in 1u32..10,
            seed in proptest::collection::vec(any::<bool>(), 100),
        ) {
            let data = (0..width * height)
                .map(|i| if seed[i as usize % seed.len()] { 255 } else { 0 })
                .collect();
            let bitmap = GlyphBitmap { width, height, left: 0, top: 0, data };
            let (sdf, _, _) = field(&bitmap, 4);
            for value in sdf {
                prop_assert!((0.0..=1.0).contains(&value));
            }
        }
    }
}
