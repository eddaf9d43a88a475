use carousel::export::{entry_name, validate_frame};
use carousel::{build_zip, write_zip, CarouselError, Config, Deck, ExportConfig};
use image::{ImageOutputFormat, Rgb, RgbImage};
use std::io::Cursor;
use tempfile::TempDir;
use zip::{CompressionMethod, ZipArchive};

fn png_frame(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([10, 10, 10]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .expect("encode png");
    bytes
}

fn entry_names(archive: &[u8]) -> Vec<String> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).expect("open archive");
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn test_entry_names_are_zero_padded() {
    assert_eq!(entry_name("slide", 1), "slide-01.png");
    assert_eq!(entry_name("post", 10), "post-10.png");
}

#[test]
fn test_validate_frame_accepts_scaled_frames() {
    assert_eq!(validate_frame(&png_frame(108, 135)).unwrap(), (108, 135));
    assert_eq!(validate_frame(&png_frame(216, 270)).unwrap(), (216, 270));
}

#[test]
fn test_validate_frame_rejects_wrong_aspect() {
    let err = validate_frame(&png_frame(100, 100)).unwrap_err();
    assert!(matches!(err, CarouselError::ExportError(_)));
}

#[test]
fn test_validate_frame_rejects_non_png() {
    assert!(validate_frame(b"definitely not a png").is_err());
}

#[test]
fn test_build_zip_orders_entries_and_stores_png_bytes() {
    let frames = vec![png_frame(108, 135), png_frame(108, 135), png_frame(108, 135)];

    let archive = build_zip(&frames, &ExportConfig::default()).unwrap();

    assert_eq!(
        entry_names(&archive),
        vec!["slide-01.png", "slide-02.png", "slide-03.png"]
    );
    let mut zip = ZipArchive::new(Cursor::new(&archive[..])).unwrap();
    let entry = zip.by_index(1).unwrap();
    assert_eq!(entry.compression(), CompressionMethod::Stored);
    assert_eq!(entry.size(), frames[1].len() as u64);
}

#[test]
fn test_build_zip_uses_prefix() {
    let config = Config::new().get_export_config(Some("launch".to_string()), false);

    let archive = build_zip(&[png_frame(108, 135)], &config).unwrap();

    assert_eq!(entry_names(&archive), vec!["launch-01.png"]);
}

#[test]
fn test_build_zip_rejects_empty_input() {
    let err = build_zip(&[], &ExportConfig::default()).unwrap_err();
    assert!(matches!(err, CarouselError::ExportError(_)));
}

#[test]
fn test_build_zip_names_the_bad_frame() {
    let frames = vec![png_frame(108, 135), png_frame(50, 50)];

    let err = build_zip(&frames, &ExportConfig::default()).unwrap_err();

    assert!(err.to_string().contains("slide-02.png"), "got {}", err);
}

#[test]
fn test_write_zip_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("nested").join("out.zip");

    write_zip(&[png_frame(108, 135)], &output, &ExportConfig::default()).unwrap();

    let archive = std::fs::read(&output).unwrap();
    assert_eq!(entry_names(&archive), vec!["slide-01.png"]);
}

#[test]
fn test_write_zip_leaves_nothing_behind_on_failure() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.zip");
    let frames = vec![png_frame(108, 135), b"broken".to_vec()];

    assert!(write_zip(&frames, &output, &ExportConfig::default()).is_err());
    assert!(!output.exists());
}

#[test]
#[ignore] // Requires a local Chrome or Chromium
fn test_export_carousel_with_browser() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("carousel.zip");
    let config = Config::new();
    let deck = Deck::default();

    carousel::export_carousel(
        &deck,
        &output,
        &config.get_render_config(Some(1.0), None),
        &config.get_export_config(None, true),
    )
    .unwrap();

    let archive = std::fs::read(&output).unwrap();
    let names = entry_names(&archive);
    assert_eq!(names.len(), deck.slides.len() + 1);
    assert_eq!(names[0], "slide-01.png");

    let mut zip = ZipArchive::new(Cursor::new(&archive[..])).unwrap();
    let mut first = Vec::new();
    std::io::Read::read_to_end(&mut zip.by_index(0).unwrap(), &mut first).unwrap();
    assert_eq!(validate_frame(&first).unwrap(), (1080, 1350));
}
