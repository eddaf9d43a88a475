// ABOUTME: Deck persistence for the carousel-slides application
// ABOUTME: Holds cover, theme and slides, and applies the regeneration merge policy

use crate::errors::{CarouselError, Result};
use crate::types::{CarouselTheme, CoverConfig, SlideContent};
use crate::utils;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything needed to render a carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    #[serde(default)]
    pub cover: CoverConfig,
    #[serde(default)]
    pub theme: CarouselTheme,
    pub slides: Vec<SlideContent>,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            cover: CoverConfig::default(),
            theme: CarouselTheme::default(),
            slides: (1..=3).map(SlideContent::placeholder).collect(),
        }
    }
}

impl Deck {
    pub fn load(path: &Path) -> Result<Self> {
        utils::validate_file_exists(path)?;
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load the deck at `path`, or start a fresh one when it does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!("No deck at {:?}, starting a new one", path);
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        utils::ensure_parent_directory_exists(path)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Saved deck with {} slides to {:?}", self.slides.len(), path);
        Ok(())
    }

    /// Replace all slides, keeping previously attached images by index.
    pub fn replace_slides(&mut self, mut slides: Vec<SlideContent>) {
        for (next, previous) in slides.iter_mut().zip(self.slides.iter()) {
            if next.image_data_url.is_none() {
                next.image_data_url = previous.image_data_url.clone();
            }
        }
        self.slides = slides;
    }

    /// Mutable access to the slide with the given 1-based index.
    pub fn slide_mut(&mut self, index: usize) -> Result<&mut SlideContent> {
        let count = self.slides.len();
        self.slides
            .iter_mut()
            .find(|slide| slide.index == index)
            .ok_or_else(|| {
                CarouselError::NotFound(format!("slide {} (deck has {} slides)", index, count))
            })
    }

    pub fn attach_image(&mut self, index: usize, data_url: Option<String>) -> Result<()> {
        self.slide_mut(index)?.image_data_url = data_url;
        Ok(())
    }

    pub fn set_cover_background(&mut self, data_url: Option<String>) {
        self.cover.background_image = data_url;
    }
}
