// ABOUTME: Library module for the carousel-slides program.
// ABOUTME: Contains core functionality for segmenting text, generating, rendering and exporting slides.

// Reexport modules
pub mod config;
pub mod deck;
pub mod errors;
pub mod export;
pub mod html;
pub mod llm;
pub mod render;
pub mod resources;
pub mod segment;
pub mod server;
pub mod types;
pub mod utils;

// Reexport common types and functions
pub use config::Config;
pub use deck::Deck;
pub use errors::{CarouselError, Result};
pub use export::{build_zip, export_carousel, write_zip, ExportConfig};
pub use html::{generate_carousel_html, write_html_to_file};
pub use llm::{GenerationRequest, SlideGenerator};
pub use render::{capture_frames, RenderConfig};
pub use resources::ImageSource;
pub use segment::{clamp_slide_count, segment};
pub use types::{CarouselTheme, CarouselVariant, CoverConfig, SlideContent, SlideLayout, SlideStyle};

#[cfg(test)]
mod tests;
