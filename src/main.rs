//! Window Capture Tool
//!
//! Binds one X11 window by id or title prefix and saves its contents as PNG
//! files, reusing the same connection and window lookup for every frame.

use anyhow::{Context, Result, anyhow};
use std::time::Duration;

use windowcap::capture::{CaptureSession, X11Server};
use windowcap::config::{self, CaptureConfig};
use windowcap::{log, paths};

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    // Ensure output directories exist
    paths::ensure_directories().context("Failed to create output directories")?;

    config::init_config();
    let config = config::get_config();

    // Optional title prefix on the command line overrides the config target
    let title_arg = std::env::args().nth(1);

    let mut session: CaptureSession<X11Server> =
        CaptureSession::new(config.display.clone(), config.region_policy);
    bind_target(&mut session, config, title_arg.as_deref())?;

    run_captures(&session, config)
}

/// Binds the window named on the command line, else the configured one.
fn bind_target(
    session: &mut CaptureSession<X11Server>,
    config: &CaptureConfig,
    title_arg: Option<&str>,
) -> Result<()> {
    if let Some(prefix) = title_arg {
        session.locate_by_title_prefix(prefix)?;
    } else if let Some(id) = config.window_id {
        session.locate_by_id(id)?;
    } else if let Some(prefix) = &config.title_prefix {
        session.locate_by_title_prefix(prefix)?;
    } else {
        return Err(anyhow!(
            "No target window. Pass a title prefix or set window_id/title_prefix in config.json."
        ));
    }
    Ok(())
}

/// Captures the configured number of frames, saving each one if enabled.
fn run_captures(session: &CaptureSession<X11Server>, config: &CaptureConfig) -> Result<()> {
    let region = config.capture_region()?;
    let captures_dir = paths::get_captures_dir();

    for i in 0..config.capture_count {
        if i > 0 && config.interval_ms > 0 {
            std::thread::sleep(Duration::from_millis(config.interval_ms));
        }

        let frame = session.capture(&region)?;
        log(&format!(
            "Frame {}/{}: {}x{}",
            i + 1,
            config.capture_count,
            frame.width(),
            frame.height()
        ));

        if config.save_png {
            frame.save_png(&captures_dir, "window")?;
        }
    }

    Ok(())
}
