//! Window discovery and the session that owns the bound target.

use super::error::CaptureError;
use super::region::RegionPolicy;
use super::server::{WindowAttributes, WindowHandle, WindowServer};
use super::x11::X11Server;

/// The currently selected window and the attributes cached when it was bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetBinding {
    pub window: WindowHandle,
    pub attributes: WindowAttributes,
}

/// Owns the windowing-server connection and at most one bound window.
///
/// The connection is opened lazily by the first locate call and then reused
/// by every later locate and capture. Calls take `&mut self` or `&self` and
/// block on server round-trips; a session is not meant to be shared across
/// threads.
pub struct CaptureSession<S: WindowServer = X11Server> {
    display: Option<String>,
    server: Option<S>,
    binding: Option<TargetBinding>,
    policy: RegionPolicy,
}

impl<S: WindowServer> CaptureSession<S> {
    /// Creates an unbound session that will connect to `display` on first use.
    pub fn new(display: Option<String>, policy: RegionPolicy) -> Self {
        Self {
            display,
            server: None,
            binding: None,
            policy,
        }
    }

    /// Creates an unbound session over an already open connection.
    pub fn with_server(server: S, policy: RegionPolicy) -> Self {
        Self {
            display: None,
            server: Some(server),
            binding: None,
            policy,
        }
    }

    /// The current binding, if a window has been selected.
    pub fn binding(&self) -> Option<&TargetBinding> {
        self.binding.as_ref()
    }

    pub fn region_policy(&self) -> RegionPolicy {
        self.policy
    }

    pub fn set_region_policy(&mut self, policy: RegionPolicy) {
        self.policy = policy;
    }

    /// The open connection and binding, or `Unbound` if capture is not legal yet.
    pub(super) fn bound(&self) -> Result<(&S, &TargetBinding), CaptureError> {
        match (&self.server, &self.binding) {
            (Some(server), Some(binding)) if binding.window != 0 => Ok((server, binding)),
            _ => Err(CaptureError::Unbound),
        }
    }

    fn connect(&mut self) -> Result<&S, CaptureError> {
        if self.server.is_none() {
            crate::log(&format!(
                "Opening display {}...",
                self.display.as_deref().unwrap_or("$DISPLAY")
            ));
            self.server = Some(S::open(self.display.as_deref())?);
        }
        self.server
            .as_ref()
            .ok_or_else(|| CaptureError::Connection("connection unavailable".to_string()))
    }

    /// Forgets the connection after a connection-level failure so the next
    /// locate opens a fresh one.
    fn drop_broken_connection<T>(&mut self, result: Result<T, CaptureError>) -> Result<T, CaptureError> {
        if let Err(CaptureError::Connection(reason)) = &result {
            crate::log(&format!("Connection lost ({}); reconnecting on next locate", reason));
            self.server = None;
        }
        result
    }

    /// Binds the window with server-assigned handle `window`, replacing any
    /// previous binding.
    ///
    /// On failure the binding is cleared, so a following capture reports
    /// `Unbound` rather than reading the previous window. The window does not
    /// have to be mapped.
    pub fn locate_by_id(&mut self, window: WindowHandle) -> Result<(), CaptureError> {
        self.binding = None;

        if window == 0 {
            return Err(CaptureError::NotFound("window handle 0 is never valid".to_string()));
        }

        let result = self.bind(window);
        self.drop_broken_connection(result)
    }

    /// Finds the first managed window whose title starts with `prefix`
    /// (case-sensitive) and binds it.
    pub fn locate_by_title_prefix(&mut self, prefix: &str) -> Result<WindowHandle, CaptureError> {
        self.binding = None;

        let result = self.search(prefix);
        let window = self.drop_broken_connection(result)?;
        self.locate_by_id(window)?;
        Ok(window)
    }

    fn bind(&mut self, window: WindowHandle) -> Result<(), CaptureError> {
        let server = self.connect()?;
        let attributes = server.window_attributes(window)?;

        crate::log(&format!(
            "Bound window {:#x}: {}x{} depth {}{}",
            window,
            attributes.width,
            attributes.height,
            attributes.depth,
            if attributes.mapped { "" } else { " (unmapped)" }
        ));
        self.binding = Some(TargetBinding { window, attributes });
        Ok(())
    }

    fn search(&mut self, prefix: &str) -> Result<WindowHandle, CaptureError> {
        let server = self.connect()?;
        crate::log(&format!("Searching for window titled \"{}*\"...", prefix));
        find_window_by_title_prefix(server, prefix)?
            .ok_or_else(|| CaptureError::NotFound(format!("no window title starts with \"{}\"", prefix)))
    }
}

/// Walks the server's client list in server order and returns the first
/// window whose title starts with `prefix`.
///
/// Windows without a readable title are skipped. Titles are fetched lazily and
/// the walk stops at the first match.
pub fn find_window_by_title_prefix<S: WindowServer>(
    server: &S,
    prefix: &str,
) -> Result<Option<WindowHandle>, CaptureError> {
    let clients = server.client_list()?;
    crate::log(&format!("Client list has {} windows", clients.len()));

    Ok(clients.into_iter().find(|&window| {
        match server.window_title(window) {
            Ok(Some(title)) => title.starts_with(prefix),
            _ => false,
        }
    }))
}
