// ABOUTME: HTML generation module for the carousel-slides application
// ABOUTME: Lays out cover and content slides as fixed 1080x1350 frames

use crate::deck::Deck;
use crate::errors::{CarouselError, Result};
use crate::types::{CarouselTheme, CoverConfig, SlideContent, FRAME_HEIGHT, FRAME_WIDTH};
use crate::utils::{self, escape_html};
use chrono::Datelike;
use log::info;
use std::fs;
use std::path::Path;

pub const COVER_ID: &str = "cover";
const PAD_X: u32 = 90;
const TOP_BAR_Y: u32 = 64;
const FONT_STACK: &str = "Inter, system-ui, Arial, sans-serif";

/// Element id of the content slide with the given 1-based index.
pub fn slide_id(index: usize) -> String {
    format!("slide-{:02}", index)
}

/// Ordered ids of every frame `generate_carousel_html` emits.
pub fn frame_ids(deck: &Deck, include_cover: bool) -> Vec<String> {
    let cover = include_cover.then(|| COVER_ID.to_string());
    cover
        .into_iter()
        .chain(deck.slides.iter().map(|slide| slide_id(slide.index)))
        .collect()
}

/// Build one HTML document containing every frame of the deck.
pub fn generate_carousel_html(deck: &Deck, include_cover: bool) -> String {
    info!(
        "Generating HTML for {} slides (cover: {})",
        deck.slides.len(),
        include_cover
    );

    let mut html_doc = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html_doc.push_str("<meta charset=\"UTF-8\">\n");
    html_doc.push_str(&format!(
        "<title>{}</title>\n",
        escape_html(first_line(&deck.cover.title))
    ));
    html_doc.push_str(&format!(
        "<style>\n\
         * {{ box-sizing: border-box; }}\n\
         html, body {{ margin: 0; padding: 0; background: #111; }}\n\
         .frame {{ width: {w}px; height: {h}px; position: relative; overflow: hidden; font-family: {font}; margin: 0 0 40px 0; }}\n\
         .top-bar {{ position: absolute; top: {top}px; left: {pad}px; right: {pad}px; display: flex; justify-content: space-between; align-items: center; z-index: 5; opacity: 0.9; }}\n\
         .clamp {{ overflow: hidden; word-break: break-word; overflow-wrap: anywhere; white-space: pre-wrap; }}\n\
         .bullets {{ margin: 0; padding-left: 1.1em; }}\n\
         .bullets li {{ margin-bottom: 0.35em; }}\n\
         </style>\n",
        w = FRAME_WIDTH,
        h = FRAME_HEIGHT,
        font = FONT_STACK,
        top = TOP_BAR_Y,
        pad = PAD_X,
    ));
    html_doc.push_str("</head>\n<body>\n");

    if include_cover {
        html_doc.push_str(&render_cover_html(&deck.cover, COVER_ID));
        html_doc.push('\n');
    }
    for slide in &deck.slides {
        html_doc.push_str(&render_slide_html(slide, &deck.theme, &slide_id(slide.index)));
        html_doc.push('\n');
    }

    html_doc.push_str("</body>\n</html>");
    html_doc
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

fn top_bar(handle: &str, handle_style: &str, label_style: &str) -> String {
    let year = chrono::Local::now().year();
    format!(
        r#"<div class="top-bar"><div style="{handle_style}">{handle}</div><div style="{label_style}">AI content</div><div style="{label_style}">Copyright &copy; {year}</div></div>"#,
        handle = escape_html(handle),
    )
}

/// Render the cover frame.
pub fn render_cover_html(cover: &CoverConfig, id: &str) -> String {
    let background = match &cover.background_image {
        Some(url) => format!(
            "background-image: url('{}'); background-size: cover; background-position: center;",
            escape_html(url)
        ),
        None => String::new(),
    };
    let label_size = cover.handle_size.saturating_sub(2).max(16);

    let mut html = format!(
        r#"<div id="{id}" class="frame cover" style="background-color: #000; {background}">"#,
        id = escape_html(id),
    );
    html.push_str(
        r#"<div style="position: absolute; inset: 0; background: linear-gradient(to top, rgba(0,0,0,0.72) 0%, rgba(0,0,0,0.25) 45%, rgba(0,0,0,0.10) 70%, rgba(0,0,0,0.00) 100%);"></div>"#,
    );
    html.push_str(&top_bar(
        &cover.profile_handle,
        &format!("color: {}; font-size: {}px;", css_value(&cover.handle_color), cover.handle_size),
        &format!("color: #EAEAEA; font-size: {}px; opacity: 0.85;", label_size),
    ));
    html.push_str(&format!(
        r#"<div style="position: absolute; left: {pad}px; right: {pad}px; bottom: 220px; z-index: 5; text-align: center;">"#,
        pad = PAD_X,
    ));
    html.push_str(&format!(
        r#"<div class="clamp" style="color: {color}; font-weight: 900; font-size: {size}px; line-height: 0.95; letter-spacing: -0.5px; text-shadow: 0 6px 22px rgba(0,0,0,0.55);">{text}</div>"#,
        color = css_value(&cover.title_color),
        size = cover.title_size,
        text = escape_html(&cover.title),
    ));
    html.push_str(&format!(
        r#"<div class="clamp" style="margin-top: 22px; color: {color}; font-size: {size}px; line-height: 1.2; opacity: 0.95; text-shadow: 0 6px 22px rgba(0,0,0,0.55);">{text}</div>"#,
        color = css_value(&cover.subtitle_color),
        size = cover.subtitle_size,
        text = escape_html(&cover.subtitle),
    ));
    html.push_str("</div></div>");
    html
}

/// Render one content slide frame in the given theme.
pub fn render_slide_html(slide: &SlideContent, theme: &CarouselTheme, id: &str) -> String {
    let style = &slide.style;

    let image_frame = {
        let inner = match &slide.image_data_url {
            Some(url) => format!(
                r#"<img src="{src}" alt="Slide {index} image" style="width: 100%; height: 100%; object-fit: cover; object-position: {x}% {y}%; display: block;">"#,
                src = escape_html(url),
                index = slide.index,
                x = style.image_pos_x.min(100),
                y = style.image_pos_y.min(100),
            ),
            None => r#"<div style="width: 100%; height: 100%; display: grid; place-items: center; color: rgba(0,0,0,0.55); font-size: 44px; font-weight: 700;">image</div>"#.to_string(),
        };
        let height = if slide.layout.is_horizontal() {
            "100%".to_string()
        } else {
            format!("{}px", style.frame_height)
        };
        format!(
            r#"<div class="image-frame" style="width: 100%; height: {height}; border-radius: 64px; background: rgba(220,220,220,0.65); overflow: hidden; box-shadow: 0 24px 80px rgba(0,0,0,0.55); flex-shrink: 0;">{inner}</div>"#
        )
    };

    let mut text_block = String::from(r#"<div class="text-block" style="width: 100%; min-width: 0;">"#);
    if style.show_title {
        text_block.push_str(&format!(
            r#"<div class="clamp" style="font-size: {size}px; font-weight: 900; line-height: {lh}px; max-height: 340px; opacity: 0.98;">{text}</div>"#,
            size = style.title_size,
            lh = (style.title_size as f64 * 0.92).round(),
            text = escape_html(&slide.title),
        ));
    }
    text_block.push_str(&format!(
        r#"<div style="width: 140px; height: 10px; border-radius: 999px; background: {}; margin: 18px 0 22px 0; opacity: 0.95;"></div>"#,
        css_value(&theme.accent_color)
    ));
    if style.show_subtitle && !slide.subtitle.trim().is_empty() {
        text_block.push_str(&format!(
            r#"<div class="clamp" style="font-size: {size}px; font-weight: 800; line-height: {lh}px; max-height: 180px; opacity: 0.92; margin-bottom: 22px;">{text}</div>"#,
            size = style.subtitle_size,
            lh = (style.subtitle_size as f64 * 1.05).round(),
            text = escape_html(&slide.subtitle),
        ));
    }
    let body_weight = if style.body_bold { 800 } else { 500 };
    let body_style = format!(
        "font-size: {size}px; font-weight: {weight}; line-height: {lh}px; max-height: 520px; opacity: 0.9;",
        size = style.body_size,
        weight = body_weight,
        lh = (style.body_size as f64 * 1.25).round(),
    );
    if slide.bullets.is_empty() {
        text_block.push_str(&format!(
            r#"<div class="clamp body" style="{body_style}">{}</div>"#,
            escape_html(&slide.body)
        ));
    } else {
        let items: String = slide
            .bullets
            .iter()
            .map(|b| format!("<li>{}</li>", escape_html(b)))
            .collect();
        text_block.push_str(&format!(
            r#"<ul class="clamp bullets" style="{body_style}">{items}</ul>"#
        ));
    }
    text_block.push_str("</div>");

    let (first, second) = if slide.layout.image_first() {
        (image_frame, text_block)
    } else {
        (text_block, image_frame)
    };
    let arrangement = if slide.layout.is_horizontal() {
        "display: grid; grid-template-columns: 1fr 1fr; gap: 44px; height: 100%; align-items: stretch;"
    } else {
        "display: flex; flex-direction: column; gap: 56px;"
    };

    let mut html = format!(
        r#"<div id="{id}" class="frame slide layout-{layout}" style="background: {bg}; color: {fg}; border-radius: 52px;">"#,
        id = escape_html(id),
        layout = slide.layout,
        bg = css_value(&theme.bg_color),
        fg = css_value(&theme.text_color),
    );
    html.push_str(&top_bar(
        &theme.profile_handle,
        "font-size: 28px;",
        "font-size: 28px; opacity: 0.8;",
    ));
    html.push_str(&format!(
        r#"<div style="position: absolute; top: 180px; left: {pad}px; right: {pad}px; bottom: 90px;"><div style="{arrangement}">{first}{second}</div></div>"#,
        pad = PAD_X,
    ));
    html.push_str("</div>");
    html
}

/// Keep user-supplied CSS values from breaking out of a style attribute.
fn css_value(value: &str) -> String {
    escape_html(&value.replace([';', '{', '}'], ""))
}

/// Utility function to write HTML content to a file
pub fn write_html_to_file(html_content: &str, output_path: &Path) -> Result<()> {
    info!("Writing HTML to file: {:?}", output_path);

    utils::ensure_parent_directory_exists(output_path)?;
    fs::write(output_path, html_content).map_err(CarouselError::FileReadError)?;

    Ok(())
}
