//! Height banding and atlas texture coordinates.
//!
//! Each voxel's world height selects one tile of a horizontal atlas so the
//! renderer can color terrain by elevation with a single texture.
//!
//! The atlas itself is a hue ramp: tile `i` is `hsl(i / 32 * 240, 70%, 50%)`,
//! running from red at the lowest band through green to blue at the top.
//! Sample it with nearest filtering so neighboring tiles never blend.

use crate::config::AtlasLayout;
use crate::core::ATLAS_TILES;

/// Lowest and highest scaled height before clamping.
pub const MIN_BAND_HEIGHT: f64 = -10.0;
pub const MAX_BAND_HEIGHT: f64 = 20.0;

/// Offset that maps the clamped height range onto tile indices `0..=30`.
pub const BAND_OFFSET: f64 = 10.0;

/// Hue span of the palette in degrees.
pub const PALETTE_HUE_SPAN: f64 = 240.0;
const PALETTE_SATURATION: f64 = 0.7;
const PALETTE_LIGHTNESS: f64 = 0.5;

/// Atlas tile for a voxel in layer `z`.
///
/// The world height `z * resolution + origin_z` is scaled by
/// `round(1 / resolution)`, clamped to `[-10, 20]` and shifted by 10.
/// A NaN height (degenerate resolution) lands on the zero-height band.
///
/// # Example
/// ```
/// use voxel_stream::palette::height_band;
///
/// assert_eq!(height_band(5, 0.1, 0.0), 15);
/// assert_eq!(height_band(0, 0.1, -5.0), 0);
/// ```
pub fn height_band(z: usize, resolution: f64, origin_z: f64) -> u32 {
    let scale = (1.0 / resolution).round();
    let height = (z as f64 * resolution + origin_z) * scale;
    let clamped = if height.is_nan() {
        0.0
    } else {
        height.clamp(MIN_BAND_HEIGHT, MAX_BAND_HEIGHT)
    };
    (clamped + BAND_OFFSET).floor() as u32
}

/// Convert an HSL color (hue in degrees, saturation and lightness in `0..=1`)
/// to 8-bit RGB, rounding like a canvas fill.
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    [r, g, b].map(|c| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// RGB color of every atlas tile, lowest band first.
pub fn tile_colors() -> [[u8; 3]; ATLAS_TILES as usize] {
    let mut colors = [[0u8; 3]; ATLAS_TILES as usize];
    for (tile, color) in colors.iter_mut().enumerate() {
        let hue = tile as f64 / ATLAS_TILES as f64 * PALETTE_HUE_SPAN;
        *color = hsl_to_rgb(hue, PALETTE_SATURATION, PALETTE_LIGHTNESS);
    }
    colors
}

impl AtlasLayout {
    /// RGBA pixels of the palette atlas, row-major, `texture_width x texture_height`.
    ///
    /// Ready to upload as an 8-bit RGBA texture.
    pub fn atlas_pixels(&self) -> Vec<u8> {
        let colors = tile_colors();
        let last_tile = colors.len() - 1;
        let tile_size = self.tile_size.max(1) as usize;

        let row: Vec<u8> = (0..self.texture_width as usize)
            .flat_map(|px| {
                let [r, g, b] = colors[(px / tile_size).min(last_tile)];
                [r, g, b, u8::MAX]
            })
            .collect();
        row.repeat(self.texture_height as usize)
    }

    /// Texture coordinate of `corner` (each component 0 or 1) within `tile`.
    pub fn uv(&self, tile: u32, corner: [u8; 2]) -> [f32; 2] {
        let tile_size = self.tile_size as f64;
        let u = (tile as f64 + corner[0] as f64) * tile_size / self.texture_width as f64;
        let v = 1.0 - (1.0 - corner[1] as f64) * tile_size / self.texture_height as f64;
        [u as f32, v as f32]
    }
}
