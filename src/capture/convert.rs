//! Server pixel data to packed RGB.

use super::error::CaptureError;
use super::server::{PixelLayout, ServerImage, WindowHandle};

/// Converts a 32 bpp server image into a freshly allocated RGB buffer of
/// exactly `width * height * 3` bytes, row-major with no padding.
///
/// The fourth (alpha/padding) channel is dropped. For `Bgrx` images server
/// channel 2 becomes R, 1 becomes G and 0 becomes B.
pub fn image_to_rgb(image: &ServerImage, window: WindowHandle) -> Result<Vec<u8>, CaptureError> {
    let width = image.width as usize;
    let height = image.height as usize;
    let row_bytes = width * 4;

    let required = match height {
        0 => 0,
        h => image.stride * (h - 1) + row_bytes,
    };
    if image.stride < row_bytes || image.data.len() < required {
        return Err(CaptureError::ServerImageUnavailable {
            window,
            reason: format!(
                "image data too short: {} bytes for {}x{} at stride {}",
                image.data.len(),
                image.width,
                image.height,
                image.stride
            ),
        });
    }

    let len = width * height * 3;
    let mut rgb = Vec::new();
    rgb.try_reserve_exact(len)
        .map_err(|_| CaptureError::AllocationFailure { bytes: len })?;

    for y in 0..height {
        let row = &image.data[y * image.stride..y * image.stride + row_bytes];
        for px in row.chunks_exact(4) {
            match image.layout {
                // BGRX -> RGB
                PixelLayout::Bgrx => rgb.extend_from_slice(&[px[2], px[1], px[0]]),
                // XRGB -> RGB
                PixelLayout::Xrgb => rgb.extend_from_slice(&[px[1], px[2], px[3]]),
            }
        }
    }

    Ok(rgb)
}
