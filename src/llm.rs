// ABOUTME: Text-completion client for the carousel-slides application
// ABOUTME: Drafts slide content from a topic, with a placeholder fallback when unconfigured

use crate::config::Config;
use crate::errors::{CarouselError, Result};
use crate::segment::{MAX_SLIDES, MIN_SLIDES};
use crate::types::{SlideContent, SlideLayout, SlideStyle};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_NICHE: &str = "geral";
pub const DEFAULT_TONE: &str = "informativo e direto";
const TEMPERATURE: f32 = 0.6;

/// Input for one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    pub slide_count: usize,
    pub profile_niche: String,
    pub tone: String,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, slide_count: usize) -> Self {
        Self {
            topic: topic.into(),
            slide_count,
            profile_niche: DEFAULT_NICHE.to_string(),
            tone: DEFAULT_TONE.to_string(),
        }
    }
}

/// Slide shape the completion service is asked to return.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSlide {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

/// Client for a chat-completions style endpoint.
pub struct SlideGenerator {
    http: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl SlideGenerator {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.llm_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Whether calls go to the service or to the placeholder fallback.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate exactly `request.slide_count` slides (clamped to 3..=9).
    ///
    /// Without an API key this returns placeholder slides and never fails.
    /// Otherwise it makes a single request with no retry.
    pub fn generate(&self, request: &GenerationRequest) -> Result<Vec<SlideContent>> {
        let count = request.slide_count.clamp(MIN_SLIDES, MAX_SLIDES);

        let Some(api_key) = &self.api_key else {
            info!("No API key configured, using placeholder slides");
            return Ok(placeholder_slides(count, &request.topic));
        };

        info!(
            "Requesting {} slides from {} (model {})",
            count, self.base_url, self.model
        );

        let body = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(count, &request.tone, &request.profile_niche),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Carousel topic: {}", request.topic),
                },
            ],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            warn!("Completion service returned {}", status);
            return Err(CarouselError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let content = completion_content(&text)?;
        debug!("Completion content: {} chars", content.len());

        let slides = parse_slides_payload(&content)?;
        Ok(into_slide_contents(slides, count))
    }
}

fn system_prompt(count: usize, tone: &str, niche: &str) -> String {
    format!(
        "You are an AI that writes content for Instagram carousels.\n\
         Rules:\n\
         - Generate EXACTLY {count} slides.\n\
         - Explanatory content, short sentences, high retention.\n\
         - Each slide has: title, optional subtitle, bullets (3 to 5).\n\
         - Write in Brazilian Portuguese, tone: {tone}.\n\
         - Profile niche: {niche}.\n\
         - Do not use emojis.\n\
         - Keep text short; bullets must fit on a card.\n\
         Return ONLY valid JSON, with no commentary and no markdown, in the format:\n\
         {{ \"slides\": [ {{ \"title\": \"...\", \"subtitle\": \"...\", \"bullets\": [\"...\"] }} ] }}"
    )
}

/// Pull `choices[0].message.content` out of a chat-completions response body.
pub fn completion_content(response_body: &str) -> Result<String> {
    let data: Value = serde_json::from_str(response_body)
        .map_err(|e| CarouselError::InvalidJson(format!("completion envelope: {}", e)))?;

    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
        .ok_or(CarouselError::EmptyResponse)
}

/// Decode the slide list, tolerating prose around the JSON object.
pub fn parse_slides_payload(content: &str) -> Result<Vec<GeneratedSlide>> {
    let parsed: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(_) => {
            let candidate = extract_json_object(content).ok_or_else(|| {
                CarouselError::InvalidJson("no JSON object found in response".to_string())
            })?;
            serde_json::from_str(candidate)
                .map_err(|e| CarouselError::InvalidJson(e.to_string()))?
        }
    };

    let slides = parsed
        .get("slides")
        .filter(|slides| slides.is_array())
        .cloned()
        .ok_or_else(|| CarouselError::InvalidShape("expected { slides: [...] }".to_string()))?;

    serde_json::from_value(slides)
        .map_err(|e| CarouselError::InvalidShape(format!("malformed slide entry: {}", e)))
}

/// Return the first balanced `{...}` region, skipping braces inside strings.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Number generated slides and force the list to exactly `count` entries.
pub fn into_slide_contents(slides: Vec<GeneratedSlide>, count: usize) -> Vec<SlideContent> {
    let mut contents: Vec<SlideContent> = slides
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, slide)| {
            let index = i + 1;
            let bullets: Vec<String> = slide
                .bullets
                .into_iter()
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect();
            let title = match slide.title.trim() {
                "" => SlideContent::fallback_title(index),
                title => title.to_string(),
            };
            let subtitle = slide.subtitle.unwrap_or_default().trim().to_string();
            SlideContent {
                index,
                title,
                body: bullets.join("\n"),
                bullets,
                layout: SlideLayout::for_index(index),
                image_data_url: None,
                style: SlideStyle {
                    show_subtitle: !subtitle.is_empty(),
                    ..SlideStyle::default()
                },
                subtitle,
            }
        })
        .collect();

    if contents.len() < count {
        warn!(
            "Completion returned {} slides, padding to {}",
            contents.len(),
            count
        );
    }
    while contents.len() < count {
        contents.push(SlideContent::placeholder(contents.len() + 1));
    }
    contents
}

/// Deterministic slides used when no completion service is configured.
pub fn placeholder_slides(slide_count: usize, topic: &str) -> Vec<SlideContent> {
    let bullets = [
        "Explain it in one simple sentence.",
        "Give a detail that grabs attention.",
        "Close with a short, punchy line.",
    ];

    let generated = (1..=slide_count)
        .map(|i| GeneratedSlide {
            title: if i == 1 {
                "The strangest fact you never heard".to_string()
            } else {
                format!("Point {}", i)
            },
            subtitle: (i == 1).then(|| topic.to_string()),
            bullets: bullets.iter().map(|b| b.to_string()).collect(),
        })
        .collect();

    into_slide_contents(generated, slide_count)
}
