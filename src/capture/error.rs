use super::region::Rect;
use super::server::WindowHandle;

/// Everything that can go wrong while locating or capturing a window.
///
/// Every error is terminal for the call that produced it; nothing is retried.
/// A capture failure leaves the session's binding intact.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Window not found: {0}")]
    NotFound(String),

    #[error("No window is bound. Select a window before capturing.")]
    Unbound,

    #[error("Server could not provide an image for window {window:#x}: {reason}")]
    ServerImageUnavailable {
        window: WindowHandle,
        reason: String,
    },

    #[error("Failed to allocate {bytes} bytes for the captured frame")]
    AllocationFailure { bytes: usize },

    #[error(
        "Capture region ({},{},{},{}) is invalid for a {}x{} window: {reason}",
        rect.x, rect.y, rect.width, rect.height, window_size.0, window_size.1
    )]
    InvalidRegion {
        rect: Rect,
        window_size: (u32, u32),
        reason: &'static str,
    },

    #[error("Windowing server connection failed: {0}")]
    Connection(String),
}

impl CaptureError {
    /// Status code reported across the host boundary. 0 is reserved for success.
    pub fn status_code(&self) -> i32 {
        match self {
            CaptureError::NotFound(_) => 1,
            CaptureError::Unbound => 2,
            CaptureError::ServerImageUnavailable { .. } => 3,
            CaptureError::AllocationFailure { .. } => 4,
            CaptureError::InvalidRegion { .. } => 5,
            CaptureError::Connection(_) => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_distinct_and_nonzero() {
        let errors = [
            CaptureError::NotFound("x".to_string()),
            CaptureError::Unbound,
            CaptureError::ServerImageUnavailable { window: 1, reason: "gone".to_string() },
            CaptureError::AllocationFailure { bytes: 12 },
            CaptureError::InvalidRegion {
                rect: Rect::new(0, 0, 0, 0),
                window_size: (1, 1),
                reason: "empty",
            },
            CaptureError::Connection("refused".to_string()),
        ];

        let mut codes: Vec<i32> = errors.iter().map(|e| e.status_code()).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_includes_context() {
        let err = CaptureError::ServerImageUnavailable { window: 0x2a, reason: "BadDrawable".to_string() };
        assert_eq!(
            err.to_string(),
            "Server could not provide an image for window 0x2a: BadDrawable"
        );

        let err = CaptureError::InvalidRegion {
            rect: Rect::new(90, 0, 20, 10),
            window_size: (100, 50),
            reason: "extends past the window",
        };
        assert!(err.to_string().contains("(90,0,20,10)"));
        assert!(err.to_string().contains("100x50"));
    }
}
