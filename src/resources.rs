// ABOUTME: Image resource handling for the carousel-slides application
// ABOUTME: Loads local or remote images and encodes them as data URLs for embedding

use crate::errors::{CarouselError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use log::info;
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

const FETCH_ATTEMPTS: u32 = 3;

/// An image that can be either a local file or a remote URL.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub path: String,
    pub is_remote: bool,
}

impl ImageSource {
    /// Create a new ImageSource from a path string.
    /// Anything that parses as an http(s) URL is treated as remote.
    pub fn new(path: &str) -> Self {
        let is_remote = Url::parse(path)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        Self {
            path: path.to_string(),
            is_remote,
        }
    }

    /// Raw bytes of the image.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        if self.is_remote {
            self.fetch_remote_bytes()
        } else {
            self.read_local_bytes()
        }
    }

    /// Encode the image as a `data:` URL, rejecting unsupported formats.
    pub fn data_url(&self) -> Result<String> {
        let bytes = self.bytes()?;
        to_data_url(&bytes).map_err(|e| match e {
            CarouselError::InvalidResource(reason) => {
                CarouselError::InvalidResource(format!("{}: {}", self.path, reason))
            }
            other => other,
        })
    }

    /// Fetch content from a remote URL with retry capability
    fn fetch_remote_bytes(&self) -> Result<Vec<u8>> {
        info!("Fetching remote image: {}", self.path);

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        let mut retry_delay = 1000; // Start with 1 second
        let mut last_error = None;

        for attempt in 1..=FETCH_ATTEMPTS {
            match client.get(&self.path).send() {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.bytes()?.to_vec());
                }
                Ok(response) => {
                    last_error = Some(CarouselError::InvalidResource(format!(
                        "HTTP error: {}",
                        response.status()
                    )));
                }
                Err(e) => last_error = Some(CarouselError::FetchError(e)),
            }

            if attempt < FETCH_ATTEMPTS {
                info!(
                    "Fetch attempt {} failed, retrying in {} ms",
                    attempt, retry_delay
                );
                std::thread::sleep(Duration::from_millis(retry_delay));
                retry_delay *= 2;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            CarouselError::InvalidResource("Unknown error fetching image".to_string())
        }))
    }

    fn read_local_bytes(&self) -> Result<Vec<u8>> {
        info!("Reading local image: {}", self.path);
        let path = Path::new(&self.path);
        if !path.exists() {
            return Err(CarouselError::PathNotFoundError(path.to_path_buf()));
        }
        Ok(fs::read(path)?)
    }
}

/// MIME type for the image formats a browser can embed.
pub fn mime_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Sniff the image format and wrap the bytes in a base64 `data:` URL.
pub fn to_data_url(bytes: &[u8]) -> Result<String> {
    let format = image::guess_format(bytes)
        .map_err(|_| CarouselError::InvalidResource("not a recognizable image".to_string()))?;
    let mime = mime_type(format).ok_or_else(|| {
        CarouselError::InvalidResource(format!("unsupported image format {:?}", format))
    })?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
