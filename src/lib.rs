//! Window capture for X11.
//!
//! Binds one target window (by handle or title prefix) through a
//! [`capture::CaptureSession`], then pulls its pixels as tightly packed RGB
//! as often as the host asks, reusing the open connection and the cached
//! window geometry.

pub mod capture;
pub mod config;
pub mod host;
pub mod paths;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

pub use capture::{CaptureError, CaptureRegion, CaptureSession, CapturedFrame, Rect};
pub use host::WindowCapture;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("windowcap.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
