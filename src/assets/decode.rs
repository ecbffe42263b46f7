use std::{path::Path, sync::Arc};

use anyhow::Context;
use image::{DynamicImage, imageops::FilterType};

use crate::foundation::error::{ShortsError, ShortsResult};

#[derive(Clone, Debug)]
/// Raster image scaled to its on-canvas size, in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> ShortsResult<DynamicImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        ShortsError::media(format!("failed to read image '{}': {e}", path.display()))
    })?;
    let img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(img)
}

/// Scale `img` to exactly `width`x`height` (aspect ratio is not preserved), then crop
/// `crop_height` rows around the vertical center when it is smaller than `height`.
pub fn prepare_scaled(
    img: &DynamicImage,
    width: u32,
    height: u32,
    crop_height: Option<u32>,
) -> ShortsResult<PreparedImage> {
    if width == 0 || height == 0 {
        return Err(ShortsError::validation(
            "image target width/height must be non-zero",
        ));
    }
    let mut scaled = img.resize_exact(width, height, FilterType::Lanczos3);
    if let Some(ch) = crop_height.filter(|&ch| ch > 0 && ch < height) {
        let y = (height - ch) / 2;
        scaled = scaled.crop_imm(0, y, width, ch);
    }

    let rgba = scaled.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
