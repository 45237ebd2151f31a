//! The boundary between the capture pipeline and the windowing server.

use super::error::CaptureError;
use super::region::Rect;

/// Opaque server-assigned window identifier. Zero never names a window.
pub type WindowHandle = u32;

/// Snapshot of a window's attributes, taken when the window is bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowAttributes {
    pub width: u32,
    pub height: u32,
    pub depth: u8,
    /// Whether the window was viewable at query time. Recorded, not enforced.
    pub mapped: bool,
}

/// Byte layout of one 32-bit pixel in a server image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// Bytes B, G, R, X (little-endian servers).
    Bgrx,
    /// Bytes X, R, G, B (big-endian servers).
    Xrgb,
}

/// Raw image data handed back by the server for one capture request.
///
/// Owns its buffer; dropping it releases the server-provided resource.
#[derive(Debug)]
pub struct ServerImage {
    pub width: u32,
    pub height: u32,
    /// Bytes per row, including any scanline padding.
    pub stride: usize,
    pub layout: PixelLayout,
    pub data: Vec<u8>,
}

/// A connection to a windowing server able to enumerate, describe and read
/// windows. All calls block on server round-trips.
pub trait WindowServer: Sized {
    /// Opens a connection. `None` means the default display.
    fn open(display: Option<&str>) -> Result<Self, CaptureError>;

    /// Top-level application windows managed by the server, in server order.
    fn client_list(&self) -> Result<Vec<WindowHandle>, CaptureError>;

    /// The window's title, or `None` if it has none.
    fn window_title(&self, window: WindowHandle) -> Result<Option<String>, CaptureError>;

    /// Current attributes of the window. Fails if the handle is invalid.
    fn window_attributes(&self, window: WindowHandle) -> Result<WindowAttributes, CaptureError>;

    /// Reads the pixels of `rect` (window-local) as a 32 bpp image.
    fn get_image(&self, window: WindowHandle, rect: Rect) -> Result<ServerImage, CaptureError>;
}
