//! In-memory windowing server for tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::error::CaptureError;
use super::region::Rect;
use super::server::{PixelLayout, ServerImage, WindowAttributes, WindowHandle, WindowServer};

/// Extra bytes appended to every image row, so stride handling is exercised.
const ROW_PADDING: usize = 8;

thread_local! {
    /// Connections opened through `WindowServer::open` by the current test.
    static OPENED: Cell<usize> = const { Cell::new(0) };
}

#[derive(Clone, Debug)]
struct FakeWindow {
    id: WindowHandle,
    title: Option<String>,
    width: u32,
    height: u32,
    mapped: bool,
    /// Title reads fail with a protocol error.
    title_fails: bool,
    /// Every pixel of the window, as server bytes B, G, R, A.
    pixel: [u8; 4],
}

#[derive(Default)]
struct FakeState {
    windows: Vec<FakeWindow>,
    attribute_queries: usize,
    title_queries: usize,
    image_requests: Vec<Rect>,
    /// Every request fails as if the connection had dropped.
    broken: bool,
}

/// A windowing server whose windows live in memory. Clones share state, so a
/// test can keep a handle while a session owns another.
#[derive(Clone, Default)]
pub struct FakeServer {
    state: Rc<RefCell<FakeState>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_window(&self, id: WindowHandle, title: Option<&str>, width: u32, height: u32) {
        self.state.borrow_mut().windows.push(FakeWindow {
            id,
            title: title.map(str::to_string),
            width,
            height,
            mapped: true,
            title_fails: false,
            pixel: [0, 0, 0, 255],
        });
    }

    pub fn remove_window(&self, id: WindowHandle) {
        self.state.borrow_mut().windows.retain(|w| w.id != id);
    }

    pub fn set_mapped(&self, id: WindowHandle, mapped: bool) {
        self.with_window(id, |w| w.mapped = mapped);
    }

    pub fn set_pixel(&self, id: WindowHandle, bgra: [u8; 4]) {
        self.with_window(id, |w| w.pixel = bgra);
    }

    pub fn resize(&self, id: WindowHandle, width: u32, height: u32) {
        self.with_window(id, |w| {
            w.width = width;
            w.height = height;
        });
    }

    pub fn fail_title(&self, id: WindowHandle) {
        self.with_window(id, |w| w.title_fails = true);
    }

    pub fn break_connection(&self) {
        self.state.borrow_mut().broken = true;
    }

    pub fn opened_on_this_thread() -> usize {
        OPENED.with(Cell::get)
    }

    pub fn attribute_queries(&self) -> usize {
        self.state.borrow().attribute_queries
    }

    pub fn title_queries(&self) -> usize {
        self.state.borrow().title_queries
    }

    pub fn image_requests(&self) -> Vec<Rect> {
        self.state.borrow().image_requests.clone()
    }

    fn with_window(&self, id: WindowHandle, f: impl FnOnce(&mut FakeWindow)) {
        if let Some(window) = self.state.borrow_mut().windows.iter_mut().find(|w| w.id == id) {
            f(window);
        }
    }

    fn check_connection(&self) -> Result<(), CaptureError> {
        if self.state.borrow().broken {
            return Err(CaptureError::Connection("broken pipe".to_string()));
        }
        Ok(())
    }

    fn window(&self, id: WindowHandle) -> Option<FakeWindow> {
        self.state.borrow().windows.iter().find(|w| w.id == id).cloned()
    }
}

impl WindowServer for FakeServer {
    fn open(_display: Option<&str>) -> Result<Self, CaptureError> {
        OPENED.with(|opened| opened.set(opened.get() + 1));
        Ok(Self::new())
    }

    fn client_list(&self) -> Result<Vec<WindowHandle>, CaptureError> {
        self.check_connection()?;
        Ok(self.state.borrow().windows.iter().map(|w| w.id).collect())
    }

    fn window_title(&self, window: WindowHandle) -> Result<Option<String>, CaptureError> {
        self.check_connection()?;
        self.state.borrow_mut().title_queries += 1;
        match self.window(window) {
            Some(w) if w.title_fails => Err(CaptureError::NotFound(format!("window {:#x}: Atom", window))),
            Some(w) => Ok(w.title),
            None => Err(CaptureError::NotFound(format!("window {:#x}: Window", window))),
        }
    }

    fn window_attributes(&self, window: WindowHandle) -> Result<WindowAttributes, CaptureError> {
        self.check_connection()?;
        self.state.borrow_mut().attribute_queries += 1;
        self.window(window)
            .map(|w| WindowAttributes {
                width: w.width,
                height: w.height,
                depth: 24,
                mapped: w.mapped,
            })
            .ok_or_else(|| CaptureError::NotFound(format!("window {:#x}: Window", window)))
    }

    fn get_image(&self, window: WindowHandle, rect: Rect) -> Result<ServerImage, CaptureError> {
        self.check_connection()?;
        self.state.borrow_mut().image_requests.push(rect);
        let w = self.window(window).ok_or_else(|| CaptureError::ServerImageUnavailable {
            window,
            reason: "Drawable".to_string(),
        })?;

        let stride = rect.width as usize * 4 + ROW_PADDING;
        let mut data = Vec::with_capacity(stride * rect.height as usize);
        for _ in 0..rect.height {
            for _ in 0..rect.width {
                data.extend_from_slice(&w.pixel);
            }
            data.extend_from_slice(&[0xAB; ROW_PADDING]);
        }

        Ok(ServerImage {
            width: rect.width,
            height: rect.height,
            stride,
            layout: PixelLayout::Bgrx,
            data,
        })
    }
}
