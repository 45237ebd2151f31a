//! Entry points for an embedding host.
//!
//! Selection calls report an integer status (0 = success, otherwise
//! [`CaptureError::status_code`]). Capture returns the frame as an owned
//! `(width, height, pixels)` tuple or an error, never partial data.

use crate::capture::{CaptureError, CaptureRegion, CaptureSession, RegionPolicy, WindowServer, X11Server};
use crate::config::CaptureConfig;

/// A capture session driven through the host boundary.
pub struct WindowCapture<S: WindowServer = X11Server> {
    session: CaptureSession<S>,
}

impl WindowCapture<X11Server> {
    /// Creates an unbound X11 capture using the display and region policy
    /// from `config`.
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(CaptureSession::new(config.display.clone(), config.region_policy))
    }
}

impl<S: WindowServer> WindowCapture<S> {
    pub fn new(session: CaptureSession<S>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &CaptureSession<S> {
        &self.session
    }

    pub fn set_region_policy(&mut self, policy: RegionPolicy) {
        self.session.set_region_policy(policy);
    }

    /// Binds the window with server handle `id`.
    pub fn select_window(&mut self, id: u32) -> i32 {
        status(self.session.locate_by_id(id))
    }

    /// Binds the first window whose title starts with `name`.
    pub fn select_window_by_title(&mut self, name: &str) -> i32 {
        status(self.session.locate_by_title_prefix(name).map(|_| ()))
    }

    /// Captures the bound window. `None`, or a tuple with any field equal to
    /// -1, captures the whole window.
    pub fn capture_frame(
        &self,
        region: Option<(i32, i32, i32, i32)>,
    ) -> Result<(u32, u32, Vec<u8>), CaptureError> {
        let region = match region {
            Some((x, y, w, h)) => CaptureRegion::from_sentinel(x, y, w, h)?,
            None => CaptureRegion::FullWindow,
        };
        Ok(self.session.capture(&region)?.into_parts())
    }
}

fn status(result: Result<(), CaptureError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            crate::log(&format!("Window selection failed: {}", e));
            e.status_code()
        }
    }
}
