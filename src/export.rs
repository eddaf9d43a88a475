// ABOUTME: Export module for the carousel-slides application
// ABOUTME: Validates rendered PNG frames and bundles them into a ZIP archive

use crate::deck::Deck;
use crate::errors::{CarouselError, Result};
use crate::html;
use crate::render::{self, RenderConfig};
use crate::types::{FRAME_HEIGHT, FRAME_WIDTH};
use crate::utils;
use image::ImageFormat;
use log::info;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

/// Configuration for archive export
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub file_prefix: String,
    pub zip_name: String,
    pub include_cover: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: "slide".to_string(),
            zip_name: "carousel_1080x1350.zip".to_string(),
            include_cover: true,
        }
    }
}

/// Archive entry name for the 1-based position `n`: `slide-01.png`, ...
pub fn entry_name(prefix: &str, n: usize) -> String {
    format!("{}-{:02}.png", prefix, n)
}

/// Check that a frame decodes as PNG and keeps the 1080:1350 aspect ratio.
pub fn validate_frame(png: &[u8]) -> Result<(u32, u32)> {
    let frame = image::load_from_memory_with_format(png, ImageFormat::Png)?;
    let (width, height) = (frame.width(), frame.height());

    if width == 0 || width as u64 * FRAME_HEIGHT as u64 != height as u64 * FRAME_WIDTH as u64 {
        return Err(CarouselError::ExportError(format!(
            "frame is {}x{}, expected a multiple of {}x{}",
            width, height, FRAME_WIDTH, FRAME_HEIGHT
        )));
    }
    Ok((width, height))
}

/// Build the archive in memory. Any invalid frame fails the whole build.
pub fn build_zip(frames: &[Vec<u8>], config: &ExportConfig) -> Result<Vec<u8>> {
    if frames.is_empty() {
        return Err(CarouselError::ExportError("no frames to export".to_string()));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    // PNG data is already compressed
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    for (i, png) in frames.iter().enumerate() {
        let name = entry_name(&config.file_prefix, i + 1);
        let (width, height) = validate_frame(png)
            .map_err(|e| CarouselError::ExportError(format!("{}: {}", name, e)))?;

        info!("Adding {} ({}x{})", name, width, height);
        zip.start_file(name, options)?;
        zip.write_all(png)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Write the archive to `output_file` only once every frame has been packed.
pub fn write_zip(frames: &[Vec<u8>], output_file: &Path, config: &ExportConfig) -> Result<()> {
    let archive = build_zip(frames, config)?;
    utils::ensure_parent_directory_exists(output_file)?;
    fs::write(output_file, archive)?;
    info!("Archive with {} slides written to {:?}", frames.len(), output_file);
    Ok(())
}

/// Render every frame of the deck and bundle the PNGs into `output_file`.
pub fn export_carousel(
    deck: &Deck,
    output_file: &Path,
    render_config: &RenderConfig,
    export_config: &ExportConfig,
) -> Result<()> {
    info!("Exporting carousel to {:?}", output_file);

    let html_content = html::generate_carousel_html(deck, export_config.include_cover);
    let ids = html::frame_ids(deck, export_config.include_cover);
    let frames = render::capture_frames(&html_content, &ids, render_config)?;

    write_zip(&frames, output_file, export_config)
}
