// ABOUTME: Shared data model for the carousel-slides application
// ABOUTME: Slide content, layouts, cover configuration and visual themes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CarouselError;

/// Width of every rendered frame in logical pixels.
pub const FRAME_WIDTH: u32 = 1080;
/// Height of every rendered frame in logical pixels.
pub const FRAME_HEIGHT: u32 = 1350;

/// Visual arrangement of the image relative to the text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlideLayout {
    ImageLeft,
    ImageRight,
    ImageTop,
    ImageBottom,
}

impl SlideLayout {
    /// Layouts in cycle order.
    pub const ALL: [SlideLayout; 4] = [
        SlideLayout::ImageLeft,
        SlideLayout::ImageRight,
        SlideLayout::ImageTop,
        SlideLayout::ImageBottom,
    ];

    /// Positional layout for a 1-based slide index.
    pub fn for_index(index: usize) -> Self {
        Self::ALL[index.saturating_sub(1) % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlideLayout::ImageLeft => "imageLeft",
            SlideLayout::ImageRight => "imageRight",
            SlideLayout::ImageTop => "imageTop",
            SlideLayout::ImageBottom => "imageBottom",
        }
    }

    /// Whether image and text sit side by side rather than stacked.
    pub fn is_horizontal(&self) -> bool {
        matches!(self, SlideLayout::ImageLeft | SlideLayout::ImageRight)
    }

    /// Whether the image comes before the text in reading order.
    pub fn image_first(&self) -> bool {
        matches!(self, SlideLayout::ImageLeft | SlideLayout::ImageTop)
    }
}

impl fmt::Display for SlideLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlideLayout {
    type Err = CarouselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "imageleft" | "left" => Ok(SlideLayout::ImageLeft),
            "imageright" | "right" => Ok(SlideLayout::ImageRight),
            "imagetop" | "top" => Ok(SlideLayout::ImageTop),
            "imagebottom" | "bottom" => Ok(SlideLayout::ImageBottom),
            _ => Err(CarouselError::ValidationError(format!(
                "Unknown layout: {} (expected imageLeft, imageRight, imageTop or imageBottom)",
                s
            ))),
        }
    }
}

/// Per-slide visual parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlideStyle {
    pub show_title: bool,
    pub show_subtitle: bool,
    pub body_bold: bool,
    pub title_size: u32,
    pub subtitle_size: u32,
    pub body_size: u32,
    /// Height of the image frame in pixels
    pub frame_height: u32,
    /// Horizontal focal point of the image, 0-100
    pub image_pos_x: u8,
    /// Vertical focal point of the image, 0-100
    pub image_pos_y: u8,
}

impl Default for SlideStyle {
    fn default() -> Self {
        Self {
            show_title: true,
            show_subtitle: false,
            body_bold: false,
            title_size: 98,
            subtitle_size: 52,
            body_size: 40,
            frame_height: 620,
            image_pos_x: 50,
            image_pos_y: 50,
        }
    }
}

/// One content slide of the carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideContent {
    pub index: usize,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    pub layout: SlideLayout,
    #[serde(default)]
    pub image_data_url: Option<String>,
    #[serde(default)]
    pub style: SlideStyle,
}

impl SlideContent {
    /// Synthetic title used when no heading can be derived.
    pub fn fallback_title(index: usize) -> String {
        format!("Part {}", index)
    }

    /// An empty slide carrying only the synthetic title.
    pub fn placeholder(index: usize) -> Self {
        Self {
            index,
            title: Self::fallback_title(index),
            subtitle: String::new(),
            body: String::new(),
            bullets: Vec::new(),
            layout: SlideLayout::for_index(index),
            image_data_url: None,
            style: SlideStyle::default(),
        }
    }
}

/// Cover slide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverConfig {
    pub background_image: Option<String>,

    pub profile_handle: String,
    pub handle_color: String,
    pub handle_size: u32,

    pub title: String,
    pub title_color: String,
    pub title_size: u32,

    pub subtitle: String,
    pub subtitle_color: String,
    pub subtitle_size: u32,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            background_image: None,
            profile_handle: "@yourprofile".to_string(),
            handle_color: "#ffffff".to_string(),
            handle_size: 18,
            title: "Don't count on me\nfor anything!".to_string(),
            title_color: "#ffffff".to_string(),
            title_size: 92,
            subtitle: "why the relief of missing out may be\nthe most freeing cultural trend right now"
                .to_string(),
            subtitle_color: "#e5e5e5".to_string(),
            subtitle_size: 30,
        }
    }
}

/// Named color presets for content slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CarouselVariant {
    Black,
    Yellow,
}

/// Colors and handle shared by every content slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselTheme {
    pub profile_handle: String,
    pub bg_color: String,
    pub text_color: String,
    pub accent_color: String,
}

impl Default for CarouselTheme {
    fn default() -> Self {
        Self::for_variant(CarouselVariant::Black)
    }
}

impl CarouselTheme {
    pub fn for_variant(variant: CarouselVariant) -> Self {
        let (bg, text, accent) = match variant {
            CarouselVariant::Black => ("#0A0A0A", "#F3F3F3", "#D3B04A"),
            CarouselVariant::Yellow => ("#D3B04A", "#0A0A0A", "#0A0A0A"),
        };
        Self {
            profile_handle: "@yourprofile".to_string(),
            bg_color: bg.to_string(),
            text_color: text.to_string(),
            accent_color: accent.to_string(),
        }
    }
}
