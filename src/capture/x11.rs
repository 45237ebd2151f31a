//! X11 windowing server access via `x11rb`.
//!
//! Protocol errors (`BadWindow`, `BadDrawable`, `BadMatch`) come back as
//! recoverable replies, so an invalid handle never takes the process down.

use x11rb::connection::Connection;
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ConnectionExt, Format, ImageFormat, ImageOrder, MapState, Window,
};
use x11rb::rust_connection::RustConnection;

use super::error::CaptureError;
use super::region::Rect;
use super::server::{PixelLayout, ServerImage, WindowAttributes, WindowHandle, WindowServer};

/// An open connection to an X server plus the atoms the locator needs.
pub struct X11Server {
    conn: RustConnection,
    root: Window,
    net_client_list: Atom,
    net_wm_name: Atom,
    utf8_string: Atom,
}

fn connection_error(err: ConnectionError) -> CaptureError {
    CaptureError::Connection(err.to_string())
}

/// Splits a reply error into protocol errors (handed to `on_x11`) and
/// connection failures.
fn reply_error(err: ReplyError, on_x11: impl FnOnce(String) -> CaptureError) -> CaptureError {
    match err {
        ReplyError::X11Error(e) => on_x11(format!("{:?}", e.error_kind)),
        ReplyError::ConnectionError(e) => connection_error(e),
    }
}

/// Row stride and byte layout of a `ZPixmap` image of `depth` and `width`
/// pixels, from the server's pixmap formats. Only 32 bpp is supported.
fn image_layout(
    pixmap_formats: &[Format],
    byte_order: ImageOrder,
    depth: u8,
    width: u32,
) -> Result<(usize, PixelLayout), String> {
    let format = pixmap_formats
        .iter()
        .find(|f| f.depth == depth)
        .ok_or_else(|| format!("no pixmap format for depth {}", depth))?;
    if format.bits_per_pixel != 32 {
        return Err(format!(
            "unsupported pixel format: {} bits per pixel at depth {}",
            format.bits_per_pixel, depth
        ));
    }

    let pad = format.scanline_pad.max(8) as usize;
    let row_bits = width as usize * 32;
    let stride = row_bits.div_ceil(pad) * pad / 8;

    let layout = if byte_order == ImageOrder::LSB_FIRST {
        PixelLayout::Bgrx
    } else {
        PixelLayout::Xrgb
    };

    Ok((stride, layout))
}

impl X11Server {
    fn intern(conn: &RustConnection, name: &str) -> Result<Atom, CaptureError> {
        let reply = conn
            .intern_atom(false, name.as_bytes())
            .map_err(connection_error)?
            .reply()
            .map_err(|e| reply_error(e, |kind| CaptureError::Connection(format!("InternAtom {}: {}", name, kind))))?;
        Ok(reply.atom)
    }

    /// Reads a whole property, returning `None` when the window lacks it.
    fn read_property(
        &self,
        window: Window,
        property: impl Into<Atom>,
        type_: impl Into<Atom>,
    ) -> Result<Option<(Atom, Vec<u8>)>, CaptureError> {
        let reply = self
            .conn
            .get_property(false, window, property, type_, 0, u32::MAX)
            .map_err(connection_error)?
            .reply()
            .map_err(|e| reply_error(e, |kind| CaptureError::NotFound(format!("window {:#x}: {}", window, kind))))?;

        if reply.type_ == u32::from(AtomEnum::NONE) {
            return Ok(None);
        }
        Ok(Some((reply.type_, reply.value)))
    }
}

impl WindowServer for X11Server {
    fn open(display: Option<&str>) -> Result<Self, CaptureError> {
        let (conn, screen_num) =
            x11rb::connect(display).map_err(|e| CaptureError::Connection(e.to_string()))?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| CaptureError::Connection(format!("screen {} does not exist", screen_num)))?;

        let net_client_list = Self::intern(&conn, "_NET_CLIENT_LIST")?;
        let net_wm_name = Self::intern(&conn, "_NET_WM_NAME")?;
        let utf8_string = Self::intern(&conn, "UTF8_STRING")?;

        Ok(Self {
            conn,
            root,
            net_client_list,
            net_wm_name,
            utf8_string,
        })
    }

    fn client_list(&self) -> Result<Vec<WindowHandle>, CaptureError> {
        let reply = self
            .conn
            .get_property(false, self.root, self.net_client_list, AtomEnum::WINDOW, 0, u32::MAX)
            .map_err(connection_error)?
            .reply()
            .map_err(|e| reply_error(e, |kind| CaptureError::NotFound(format!("_NET_CLIENT_LIST: {}", kind))))?;

        // No window manager, or one that does not publish the list
        Ok(reply.value32().map(|windows| windows.collect()).unwrap_or_default())
    }

    fn window_title(&self, window: WindowHandle) -> Result<Option<String>, CaptureError> {
        if let Some((_, value)) = self.read_property(window, self.net_wm_name, self.utf8_string)? {
            if !value.is_empty() {
                return Ok(Some(String::from_utf8_lossy(&value).into_owned()));
            }
        }

        match self.read_property(window, AtomEnum::WM_NAME, AtomEnum::ANY)? {
            Some((_, value)) if value.is_empty() => Ok(None),
            // STRING is Latin-1
            Some((type_, value)) if type_ == u32::from(AtomEnum::STRING) => {
                Ok(Some(value.iter().map(|&b| b as char).collect()))
            }
            Some((_, value)) => Ok(Some(String::from_utf8_lossy(&value).into_owned())),
            None => Ok(None),
        }
    }

    fn window_attributes(&self, window: WindowHandle) -> Result<WindowAttributes, CaptureError> {
        let not_found = |kind: String| CaptureError::NotFound(format!("window {:#x}: {}", window, kind));

        let geometry = self
            .conn
            .get_geometry(window)
            .map_err(connection_error)?
            .reply()
            .map_err(|e| reply_error(e, not_found))?;
        let attributes = self
            .conn
            .get_window_attributes(window)
            .map_err(connection_error)?
            .reply()
            .map_err(|e| reply_error(e, not_found))?;

        Ok(WindowAttributes {
            width: geometry.width as u32,
            height: geometry.height as u32,
            depth: geometry.depth,
            mapped: attributes.map_state == MapState::VIEWABLE,
        })
    }

    fn get_image(&self, window: WindowHandle, rect: Rect) -> Result<ServerImage, CaptureError> {
        let unavailable = |reason: String| CaptureError::ServerImageUnavailable { window, reason };

        let (Ok(x), Ok(y), Ok(width), Ok(height)) = (
            i16::try_from(rect.x),
            i16::try_from(rect.y),
            u16::try_from(rect.width),
            u16::try_from(rect.height),
        ) else {
            return Err(unavailable(format!("rectangle {:?} exceeds the X11 coordinate range", rect)));
        };

        let reply = self
            .conn
            .get_image(ImageFormat::Z_PIXMAP, window, x, y, width, height, u32::MAX)
            .map_err(connection_error)?
            .reply()
            .map_err(|e| reply_error(e, unavailable))?;

        let setup = self.conn.setup();
        let (stride, layout) = image_layout(
            &setup.pixmap_formats,
            setup.image_byte_order,
            reply.depth,
            rect.width,
        )
        .map_err(unavailable)?;

        Ok(ServerImage {
            width: rect.width,
            height: rect.height,
            stride,
            layout,
            data: reply.data,
        })
    }
}
