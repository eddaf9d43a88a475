// ABOUTME: Browser rendering module for the carousel-slides application
// ABOUTME: Captures each 1080x1350 frame as a PNG using a headless browser

use crate::errors::{CarouselError, Result};
use crate::types::{FRAME_HEIGHT, FRAME_WIDTH};
use crate::utils;
use anyhow::anyhow;
use headless_chrome::protocol::cdp::Page::{CaptureScreenshotFormatOption, Viewport};
use headless_chrome::{Browser, LaunchOptionsBuilder};
use log::{info, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Configuration for browser rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Device pixel multiplier applied to every capture
    pub pixel_ratio: f64,
    pub timeout_ms: u64,
    pub browser_path: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            pixel_ratio: 2.0,
            timeout_ms: 30000, // 30 seconds
            browser_path: None,
        }
    }
}

/// Script that shows only the frame with the given id, pinned to the top-left
/// corner. Evaluates to `false` when no such element exists.
fn isolate_frame_script(id: &str) -> String {
    let id_literal = Value::String(id.to_string()).to_string();
    format!(
        r#"
        (function() {{
            var target = document.getElementById({id_literal});
            if (!target) {{
                return false;
            }}
            var frames = document.querySelectorAll('.frame');
            for (var i = 0; i < frames.length; i++) {{
                frames[i].style.display = 'none';
            }}
            target.style.display = 'block';
            target.style.margin = '0';
            window.scrollTo(0, 0);
            return true;
        }})()
    "#
    )
}

/// Rasterize the frames of an HTML document, one PNG per id, in order.
///
/// A missing element aborts the whole capture.
pub fn capture_frames(html: &str, ids: &[String], config: &RenderConfig) -> Result<Vec<Vec<u8>>> {
    let html_path = utils::unique_temp_path("carousel", "html");
    fs::write(&html_path, html)?;

    let result = capture_frames_from_file(&html_path, ids, config);

    if let Err(e) = fs::remove_file(&html_path) {
        warn!("Failed to clean up temp file {:?}: {}", html_path, e);
    }
    result
}

fn capture_frames_from_file(
    html_path: &Path,
    ids: &[String],
    config: &RenderConfig,
) -> Result<Vec<Vec<u8>>> {
    info!("Rendering {} frames from {:?}", ids.len(), html_path);

    let mut launch_options_builder = LaunchOptionsBuilder::default();
    launch_options_builder.window_size(Some((config.width, config.height)));
    launch_options_builder.headless(true);

    if let Some(browser_path) = &config.browser_path {
        launch_options_builder.path(Some(browser_path.into()));
    }

    let launch_options = launch_options_builder
        .build()
        .map_err(|e| CarouselError::browser("Failed to build browser options", anyhow!("{}", e)))?;

    info!("Launching headless browser");
    let browser = Browser::new(launch_options)
        .map_err(|e| CarouselError::browser("Failed to launch browser", e))?;

    let html_path_abs = fs::canonicalize(html_path)?;
    let url = format!("file://{}", html_path_abs.to_string_lossy());

    let tab = browser
        .new_tab()
        .map_err(|e| CarouselError::browser("Failed to create new tab", e))?;

    tab.navigate_to(&url)
        .map_err(|e| CarouselError::browser("Failed to navigate to HTML", e))?;
    tab.wait_until_navigated()
        .map_err(|e| CarouselError::browser("Navigation failed", e))?;
    tab.wait_for_element_with_custom_timeout("body", Duration::from_millis(config.timeout_ms))
        .map_err(|e| CarouselError::browser("Failed to wait for body element", e))?;

    // Give embedded data: images time to decode before the first capture
    std::thread::sleep(Duration::from_millis(500));

    let clip = Viewport {
        x: 0.0,
        y: 0.0,
        width: config.width as f64,
        height: config.height as f64,
        scale: config.pixel_ratio,
    };

    let start_time = Instant::now();
    let mut frames = Vec::with_capacity(ids.len());

    for (i, id) in ids.iter().enumerate() {
        info!("Rendering frame {} of {}: #{}", i + 1, ids.len(), id);

        let shown = tab
            .evaluate(&isolate_frame_script(id), false)
            .map_err(|e| CarouselError::browser(&format!("Failed to show #{}", id), e))?;
        if !matches!(shown.value, Some(Value::Bool(true))) {
            return Err(CarouselError::ElementNotFound(id.clone()));
        }

        std::thread::sleep(Duration::from_millis(150));

        let png = tab
            .capture_screenshot(
                CaptureScreenshotFormatOption::Png,
                None,
                Some(clip.clone()),
                true,
            )
            .map_err(|e| CarouselError::ScreenshotError(format!("#{}: {}", id, e)))?;
        frames.push(png);
    }

    info!(
        "Rendering complete. Captured {} frames in {:.2} seconds",
        frames.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(frames)
}
