//! Capture rectangles and their validation against the bound window.

use serde::{Deserialize, Serialize};

use super::error::CaptureError;
use super::server::WindowAttributes;

/// A rectangle in window-local pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Size of this rectangle as tightly packed RGB.
    pub fn rgb_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Which part of the bound window to capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureRegion {
    /// The whole window, using the size cached at bind time.
    #[default]
    FullWindow,
    Rect(Rect),
}

/// How regions that fall outside the cached window size are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionPolicy {
    /// Fail with `InvalidRegion` before contacting the server.
    #[default]
    Reject,
    /// Forward the rectangle verbatim; the server decides what happens.
    /// Out-of-range reads are the caller's responsibility.
    PassThrough,
}

impl CaptureRegion {
    /// Value marking a field as unset in sentinel-encoded regions.
    pub const UNSET: i32 = -1;

    /// Decodes an `(x, y, w, h)` tuple where any field equal to [`Self::UNSET`]
    /// selects the whole window.
    pub fn from_sentinel(x: i32, y: i32, width: i32, height: i32) -> Result<Self, CaptureError> {
        if [x, y, width, height].contains(&Self::UNSET) {
            return Ok(CaptureRegion::FullWindow);
        }

        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(width), Ok(height)) => Ok(CaptureRegion::Rect(Rect::new(x, y, width, height))),
            _ => Err(CaptureError::InvalidRegion {
                rect: Rect::new(x, y, 0, 0),
                window_size: (0, 0),
                reason: "width and height must not be negative",
            }),
        }
    }

    /// Resolves this region to the rectangle that will be requested from the
    /// server, applying `policy` against the cached window size.
    pub fn resolve(
        &self,
        attributes: &WindowAttributes,
        policy: RegionPolicy,
    ) -> Result<Rect, CaptureError> {
        let rect = match *self {
            CaptureRegion::FullWindow => {
                Rect::new(0, 0, attributes.width, attributes.height)
            }
            CaptureRegion::Rect(rect) => rect,
        };

        let invalid = |reason| CaptureError::InvalidRegion {
            rect,
            window_size: (attributes.width, attributes.height),
            reason,
        };

        if rect.width == 0 || rect.height == 0 {
            return Err(invalid("width and height must be non-zero"));
        }

        // X11 GetImage carries the origin as i16 and the size as u16.
        if i16::try_from(rect.x).is_err()
            || i16::try_from(rect.y).is_err()
            || u16::try_from(rect.width).is_err()
            || u16::try_from(rect.height).is_err()
        {
            return Err(invalid("does not fit the server's coordinate range"));
        }

        if policy == RegionPolicy::Reject {
            if rect.x < 0 || rect.y < 0 {
                return Err(invalid("origin lies outside the window"));
            }
            let right = rect.x as u64 + rect.width as u64;
            let bottom = rect.y as u64 + rect.height as u64;
            if right > attributes.width as u64 || bottom > attributes.height as u64 {
                return Err(invalid("extends past the window"));
            }
        }

        Ok(rect)
    }
}

impl From<Rect> for CaptureRegion {
    fn from(rect: Rect) -> Self {
        CaptureRegion::Rect(rect)
    }
}
