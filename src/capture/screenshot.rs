//! Frame capture for the bound window.

use anyhow::{Context, Result};
use chrono::Local;
use image::{ExtendedColorType, RgbImage};
use std::path::{Path, PathBuf};

use super::convert::image_to_rgb;
use super::error::CaptureError;
use super::region::CaptureRegion;
use super::server::WindowServer;
use super::window::CaptureSession;

/// One captured frame: `width * height` RGB pixels, row-major, top to bottom,
/// 3 bytes per pixel, no row padding.
///
/// The frame owns its buffer. Moving it (or the buffer out of it via
/// [`CapturedFrame::into_parts`]) moves the release obligation with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl CapturedFrame {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consumes the frame and hands its buffer to the caller.
    pub fn into_parts(self) -> (u32, u32, Vec<u8>) {
        (self.width, self.height, self.pixels)
    }

    /// Wraps the frame as an `image` buffer without copying.
    pub fn into_image(self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.pixels)
    }

    /// Saves the frame as `<prefix>_<timestamp>.png` inside `dir`.
    ///
    /// Returns the path to the saved file.
    pub fn save_png(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let filename = format!("{}_{}.png", prefix, timestamp);
        let path = dir.join(&filename);

        image::save_buffer(
            &path,
            &self.pixels,
            self.width,
            self.height,
            ExtendedColorType::Rgb8,
        )
            .with_context(|| format!("Failed to save capture to {}", path.display()))?;
        crate::log(&format!("Saved to {}", path.display()));

        Ok(path)
    }
}

impl<S: WindowServer> CaptureSession<S> {
    /// Captures the current pixels of the bound window.
    ///
    /// This function:
    /// 1. Checks that a window is bound
    /// 2. Resolves `region` against the size cached at bind time
    /// 3. Reads a 32 bpp image of that rectangle from the server
    /// 4. Converts it to packed RGB in a freshly allocated buffer
    ///
    /// The reported size is the requested rectangle's size. A failure does
    /// not touch the binding, so the caller may simply call again.
    pub fn capture(&self, region: &CaptureRegion) -> Result<CapturedFrame, CaptureError> {
        let (server, binding) = self.bound()?;
        let rect = region.resolve(&binding.attributes, self.region_policy())?;

        // Dropped on every return path below, releasing the server data
        let image = server.get_image(binding.window, rect)?;
        if image.width != rect.width || image.height != rect.height {
            return Err(CaptureError::ServerImageUnavailable {
                window: binding.window,
                reason: format!(
                    "server returned {}x{} for a {}x{} request",
                    image.width, image.height, rect.width, rect.height
                ),
            });
        }

        let pixels = image_to_rgb(&image, binding.window)?;

        Ok(CapturedFrame {
            width: rect.width,
            height: rect.height,
            pixels,
        })
    }
}
