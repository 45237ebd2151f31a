//! Capture of a single X11 window.
//!
//! This module provides:
//! - The windowing server seam (`WindowServer`) and its X11 implementation
//! - Window discovery and binding (`CaptureSession::locate_by_id`,
//!   `CaptureSession::locate_by_title_prefix`)
//! - Frame capture (`CaptureSession::capture`)

pub mod convert;
pub mod error;
pub mod region;
pub mod screenshot;
pub mod server;
pub mod window;
pub mod x11;

#[cfg(test)]
pub(crate) mod testing;

pub use error::CaptureError;
pub use region::{CaptureRegion, Rect, RegionPolicy};
pub use screenshot::CapturedFrame;
pub use server::{WindowAttributes, WindowHandle, WindowServer};
pub use window::{CaptureSession, TargetBinding, find_window_by_title_prefix};
pub use x11::X11Server;
