use super::*;
use crate::html::{frame_ids, render_cover_html, render_slide_html, slide_id};
use crate::llm::{completion_content, extract_json_object, parse_slides_payload};
use crate::resources::to_data_url;
use crate::server::{validate_generate_body, validate_split_body};
use serde_json::json;
use std::io::{Cursor, Write};
use tempfile::{NamedTempFile, TempDir};

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 5, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .expect("Failed to encode PNG");
    buf
}

fn slide_with_image(index: usize, url: &str) -> SlideContent {
    SlideContent {
        image_data_url: Some(url.to_string()),
        ..SlideContent::placeholder(index)
    }
}

#[test]
fn test_layout_cycles_every_four_slides() {
    let layouts: Vec<SlideLayout> = (1..=6).map(SlideLayout::for_index).collect();
    assert_eq!(
        layouts,
        vec![
            SlideLayout::ImageLeft,
            SlideLayout::ImageRight,
            SlideLayout::ImageTop,
            SlideLayout::ImageBottom,
            SlideLayout::ImageLeft,
            SlideLayout::ImageRight,
        ]
    );
}

#[test]
fn test_layout_parses_from_cli_spellings() {
    assert_eq!("imageTop".parse::<SlideLayout>().unwrap(), SlideLayout::ImageTop);
    assert_eq!("image-bottom".parse::<SlideLayout>().unwrap(), SlideLayout::ImageBottom);
    assert_eq!("left".parse::<SlideLayout>().unwrap(), SlideLayout::ImageLeft);
    assert!("diagonal".parse::<SlideLayout>().is_err());
}

#[test]
fn test_slide_content_serializes_camel_case() {
    let slide = slide_with_image(2, "data:image/png;base64,AAAA");
    let value = serde_json::to_value(&slide).unwrap();

    assert_eq!(value["index"], 2);
    assert_eq!(value["title"], "Part 2");
    assert_eq!(value["layout"], "imageRight");
    assert_eq!(value["imageDataUrl"], "data:image/png;base64,AAAA");
    assert_eq!(value["style"]["titleSize"], 98);
}

#[test]
fn test_slide_content_deserializes_with_missing_optional_fields() {
    let slide: SlideContent =
        serde_json::from_value(json!({ "index": 1, "title": "Hello", "layout": "imageTop" }))
            .unwrap();

    assert_eq!(slide.subtitle, "");
    assert!(slide.bullets.is_empty());
    assert!(slide.image_data_url.is_none());
    assert_eq!(slide.style, SlideStyle::default());
}

#[test]
fn test_render_slide_escapes_user_text() {
    let mut slide = SlideContent::placeholder(1);
    slide.title = "<script>alert(1)</script>".to_string();
    slide.body = "Tom & Jerry".to_string();

    let html = render_slide_html(&slide, &CarouselTheme::default(), "slide-01");

    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(html.contains("Tom &amp; Jerry"));
}

#[test]
fn test_render_slide_prefers_bullets_over_body() {
    let mut slide = SlideContent::placeholder(3);
    slide.body = "first\nsecond".to_string();
    slide.bullets = vec!["first".to_string(), "second".to_string()];

    let html = render_slide_html(&slide, &CarouselTheme::default(), "slide-03");

    assert!(html.contains("<li>first</li><li>second</li>"));
    assert!(html.contains("layout-imageTop"));
    assert!(html.contains(r#"id="slide-03""#));
}

#[test]
fn test_render_slide_uses_image_and_focal_point() {
    let mut slide = slide_with_image(1, "data:image/png;base64,AAAA");
    slide.style.image_pos_x = 20;
    slide.style.image_pos_y = 80;

    let html = render_slide_html(&slide, &CarouselTheme::default(), "slide-01");

    assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
    assert!(html.contains("object-position: 20% 80%"));
    assert!(!html.contains(">image</div>"));
}

#[test]
fn test_render_slide_hides_title_and_empty_subtitle() {
    let mut slide = SlideContent::placeholder(1);
    slide.style.show_title = false;
    slide.style.show_subtitle = true;

    let html = render_slide_html(&slide, &CarouselTheme::default(), "slide-01");

    assert!(!html.contains("Part 1"));
    assert!(!html.contains("max-height: 180px"));
}

#[test]
fn test_render_cover_uses_configured_colors_and_background() {
    let cover = CoverConfig {
        background_image: Some("data:image/jpeg;base64,BBBB".to_string()),
        title_color: "#ff0000".to_string(),
        ..CoverConfig::default()
    };

    let html = render_cover_html(&cover, "cover");

    assert!(html.contains(r#"id="cover""#));
    assert!(html.contains("background-image: url('data:image/jpeg;base64,BBBB')"));
    assert!(html.contains("color: #ff0000"));
    assert!(html.contains("@yourprofile"));
    assert!(html.contains("bottom: 220px"));
}

#[test]
fn test_css_values_cannot_break_out_of_style() {
    let theme = CarouselTheme {
        bg_color: "red; } body { display: none".to_string(),
        ..CarouselTheme::default()
    };

    let html = render_slide_html(&SlideContent::placeholder(1), &theme, "slide-01");

    assert!(!html.contains("red;"));
    assert!(!html.contains("body { display: none"));
}

#[test]
fn test_carousel_html_contains_every_frame_in_order() {
    let deck = Deck::default();
    let html = generate_carousel_html(&deck, true);

    let cover_pos = html.find(r#"id="cover""#).expect("cover frame");
    let first_pos = html.find(r#"id="slide-01""#).expect("first frame");
    let last_pos = html.find(r#"id="slide-03""#).expect("last frame");
    assert!(cover_pos < first_pos && first_pos < last_pos);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("width: 1080px; height: 1350px"));

    let without_cover = generate_carousel_html(&deck, false);
    assert!(!without_cover.contains(r#"id="cover""#));
}

#[test]
fn test_frame_ids() {
    let deck = Deck::default();
    assert_eq!(frame_ids(&deck, true), vec!["cover", "slide-01", "slide-02", "slide-03"]);
    assert_eq!(frame_ids(&deck, false), vec!["slide-01", "slide-02", "slide-03"]);
    assert_eq!(slide_id(9), "slide-09");
}

#[test]
fn test_write_html_to_file_creates_parent_dirs() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("preview.html");

    write_html_to_file("<html></html>", &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
}

#[test]
fn test_replace_slides_carries_images_by_index() {
    let mut deck = Deck::default();
    deck.slides = vec![
        slide_with_image(1, "data:one"),
        SlideContent::placeholder(2),
        slide_with_image(3, "data:three"),
    ];

    let regenerated = segment("First paragraph.\n\nSecond paragraph.", 5);
    deck.replace_slides(regenerated);

    assert_eq!(deck.slides.len(), 5);
    assert_eq!(deck.slides[0].image_data_url.as_deref(), Some("data:one"));
    assert_eq!(deck.slides[1].image_data_url, None);
    assert_eq!(deck.slides[2].image_data_url.as_deref(), Some("data:three"));
    assert_eq!(deck.slides[3].image_data_url, None);
}

#[test]
fn test_replace_slides_drops_images_past_new_length() {
    let mut deck = Deck::default();
    deck.slides = (1..=5).map(|i| slide_with_image(i, "data:x")).collect();

    deck.replace_slides(segment("", 3));

    assert_eq!(deck.slides.len(), 3);
    assert!(deck.slides.iter().all(|s| s.image_data_url.is_some()));
}

#[test]
fn test_attach_image_to_missing_slide_fails() {
    let mut deck = Deck::default();
    let err = deck.attach_image(7, Some("data:x".to_string())).unwrap_err();
    assert!(matches!(err, CarouselError::NotFound(_)));

    deck.attach_image(2, Some("data:x".to_string())).unwrap();
    assert_eq!(deck.slides[1].image_data_url.as_deref(), Some("data:x"));
}

#[test]
fn test_deck_save_and_load() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("deck.json");

    let mut deck = Deck::default();
    deck.theme = CarouselTheme::for_variant(CarouselVariant::Yellow);
    deck.set_cover_background(Some("data:cover".to_string()));
    deck.save(&path).unwrap();

    let loaded = Deck::load(&path).unwrap();
    assert_eq!(loaded, deck);
}

#[test]
fn test_deck_load_or_default_for_missing_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let deck = Deck::load_or_default(&dir.path().join("absent.json")).unwrap();
    assert_eq!(deck.slides.len(), 3);
}

#[test]
fn test_image_source_detects_remote_urls() {
    assert!(ImageSource::new("https://example.com/a.png").is_remote);
    assert!(ImageSource::new("http://example.com/a.png").is_remote);
    assert!(!ImageSource::new("./photos/a.png").is_remote);
    assert!(!ImageSource::new("ftp://example.com/a.png").is_remote);
}

#[test]
fn test_local_image_becomes_png_data_url() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(&tiny_png()).expect("Failed to write to temp file");

    let data_url = ImageSource::new(file.path().to_str().unwrap())
        .data_url()
        .unwrap();

    assert!(data_url.starts_with("data:image/png;base64,iVBORw0KGgo"));
}

#[test]
fn test_non_image_bytes_are_rejected() {
    let err = to_data_url(b"just some text").unwrap_err();
    assert!(matches!(err, CarouselError::InvalidResource(_)));
}

#[test]
fn test_missing_local_image_is_path_error() {
    let err = ImageSource::new("/definitely/not/here.png").data_url().unwrap_err();
    assert!(matches!(err, CarouselError::PathNotFoundError(_)));
}

#[test]
fn test_extract_json_object_skips_surrounding_prose() {
    let text = r#"Sure! Here it is: {"slides": [{"title": "a {tricky} \"one\""}]} Hope it helps {"#;
    assert_eq!(
        extract_json_object(text),
        Some(r#"{"slides": [{"title": "a {tricky} \"one\""}]}"#)
    );
    assert_eq!(extract_json_object("no braces here"), None);
    assert_eq!(extract_json_object("{ never closed"), None);
}

#[test]
fn test_parse_slides_payload_accepts_wrapped_json() {
    let content = "```json\n{\"slides\": [{\"title\": \"One\", \"bullets\": [\"a\", \"b\"]}]}\n```";
    let slides = parse_slides_payload(content).unwrap();

    assert_eq!(slides.len(), 1);
    assert_eq!(slides[0].title, "One");
    assert_eq!(slides[0].bullets, vec!["a", "b"]);
    assert!(slides[0].subtitle.is_none());
}

#[test]
fn test_parse_slides_payload_error_kinds() {
    assert!(matches!(
        parse_slides_payload("not json at all"),
        Err(CarouselError::InvalidJson(_))
    ));
    assert!(matches!(
        parse_slides_payload(r#"{"items": []}"#),
        Err(CarouselError::InvalidShape(_))
    ));
    assert!(matches!(
        parse_slides_payload(r#"{"slides": "nope"}"#),
        Err(CarouselError::InvalidShape(_))
    ));
    assert!(matches!(
        parse_slides_payload(r#"{"slides": [{"bullets": []}]}"#),
        Err(CarouselError::InvalidShape(_))
    ));
}

#[test]
fn test_completion_content_requires_text() {
    let ok = json!({ "choices": [{ "message": { "content": "  hi  " } }] }).to_string();
    assert_eq!(completion_content(&ok).unwrap(), "hi");

    let empty = json!({ "choices": [{ "message": { "content": "" } }] }).to_string();
    assert!(matches!(completion_content(&empty), Err(CarouselError::EmptyResponse)));

    let missing = json!({ "choices": [] }).to_string();
    assert!(matches!(completion_content(&missing), Err(CarouselError::EmptyResponse)));
}

#[test]
fn test_validate_generate_body_applies_defaults() {
    let request =
        validate_generate_body(&json!({ "topic": "The history of coffee", "slideCount": 5 }))
            .unwrap();

    assert_eq!(request.topic, "The history of coffee");
    assert_eq!(request.slide_count, 5);
    assert_eq!(request.profile_niche, "geral");
    assert_eq!(request.tone, "informativo e direto");
}

#[test]
fn test_validate_generate_body_reports_each_field() {
    let errors = validate_generate_body(&json!({
        "topic": "short",
        "slideCount": 12,
        "tone": 3
    }))
    .unwrap_err();

    assert!(errors.form_errors.is_empty());
    assert_eq!(
        errors.field_errors["topic"],
        vec!["String must contain at least 8 character(s)"]
    );
    assert_eq!(
        errors.field_errors["slideCount"],
        vec!["Number must be less than or equal to 9"]
    );
    assert_eq!(errors.field_errors["tone"], vec!["Expected string, received number"]);
}

#[test]
fn test_validate_generate_body_rejects_non_objects_and_fractions() {
    let errors = validate_generate_body(&json!([1, 2])).unwrap_err();
    assert_eq!(errors.form_errors, vec!["Expected object, received array"]);

    let errors =
        validate_generate_body(&json!({ "topic": "long enough topic", "slideCount": 4.5 }))
            .unwrap_err();
    assert_eq!(errors.field_errors["slideCount"], vec!["Expected integer, received float"]);

    let errors = validate_generate_body(&json!({})).unwrap_err();
    assert_eq!(errors.field_errors["topic"], vec!["Required"]);
    assert_eq!(errors.field_errors["slideCount"], vec!["Required"]);
}

#[test]
fn test_validate_split_body_clamps_count() {
    let (text, count) = validate_split_body(&json!({ "text": "abc", "slideCount": 42 })).unwrap();
    assert_eq!(text, "abc");
    assert_eq!(count, 9);

    let (_, count) = validate_split_body(&json!({ "text": "abc", "slideCount": -1 })).unwrap();
    assert_eq!(count, 3);

    let (_, count) = validate_split_body(&json!({ "text": "abc" })).unwrap();
    assert_eq!(count, 9);

    assert!(validate_split_body(&json!({ "slideCount": 4 })).is_err());
}

#[test]
fn test_config_builds_stage_configs() {
    let config = Config::new();

    let render = config.get_render_config(None, None);
    assert_eq!((render.width, render.height), (1080, 1350));
    assert_eq!(render.pixel_ratio, 2.0);
    assert_eq!(render.timeout_ms, 30000);

    let render = config.get_render_config(Some(3.0), Some(500));
    assert_eq!(render.pixel_ratio, 3.0);
    assert_eq!(render.timeout_ms, 500);

    let export = config.get_export_config(Some("carousel".to_string()), false);
    assert_eq!(export.file_prefix, "carousel");
    assert_eq!(export.zip_name, "carousel_1080x1350.zip");
    assert!(!export.include_cover);
}

#[test]
#[ignore] // Ignore by default as it requires Chrome to be installed
fn test_capture_frames_missing_element_is_hard_failure() {
    let html = generate_carousel_html(&Deck::default(), false);
    let ids = vec!["slide-01".to_string(), "slide-99".to_string()];

    let err = capture_frames(&html, &ids, &RenderConfig::default()).unwrap_err();
    assert!(matches!(err, CarouselError::ElementNotFound(id) if id == "slide-99"));
}

#[test]
fn test_error_conversions() {
    let err: CarouselError = anyhow::anyhow!("socket closed").into();
    assert!(matches!(err, CarouselError::UnknownError(ref m) if m == "socket closed"));

    let err = CarouselError::browser("Failed to launch browser", anyhow::anyhow!("no chrome"));
    assert_eq!(
        err.to_string(),
        "Headless browser error: Failed to launch browser: no chrome"
    );
    assert!(std::error::Error::source(&err).is_some());

    let err: CarouselError = zip::result::ZipError::FileNotFound.into();
    assert!(matches!(err, CarouselError::ExportError(_)));
}

#[test]
fn test_config_from_lookup_reads_values_and_treats_empty_as_unset() {
    let vars: std::collections::HashMap<&str, &str> = [
        ("OPENAI_API_KEY", "  "),
        ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
        ("PORT", "8081"),
        ("LLM_TIMEOUT_MS", ""),
    ]
    .into_iter()
    .collect();

    let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

    assert!(config.openai_api_key.is_none());
    assert_eq!(config.openai_base_url, "http://localhost:8080/v1");
    assert_eq!(config.port, 8081);
    assert_eq!(config.llm_timeout_ms, 60000);
    assert_eq!(config.cors_origin, "*");
}

#[test]
fn test_config_from_lookup_rejects_unparsable_numbers() {
    let err = Config::from_lookup(|key| (key == "PORT").then(|| "eighty".to_string())).unwrap_err();
    assert!(matches!(err, CarouselError::ConfigError(ref m) if m.contains("PORT")));

    let err =
        Config::from_lookup(|key| (key == "DEFAULT_TIMEOUT_MS").then(|| "-5".to_string())).unwrap_err();
    assert!(matches!(err, CarouselError::ConfigError(_)));
}
