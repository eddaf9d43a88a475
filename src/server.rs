// ABOUTME: HTTP endpoint for the carousel-slides application
// ABOUTME: Validates generation requests and serves slide lists as JSON

use crate::config::Config;
use crate::errors::{CarouselError, Result};
use crate::llm::{GenerationRequest, SlideGenerator, DEFAULT_NICHE, DEFAULT_TONE};
use crate::segment::{self, MAX_SLIDES, MIN_SLIDES};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;
use std::thread;
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const MIN_TOPIC_CHARS: usize = 8;
const DEFAULT_SPLIT_COUNT: i64 = 9;

/// Status code and JSON body produced by the router.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Field-level validation failures, shaped like `{ formErrors, fieldErrors }`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    fn field(&mut self, name: &str, message: impl Into<String>) {
        self.field_errors
            .entry(name.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn as_object<'a>(body: &'a Value, errors: &mut ValidationErrors) -> Option<&'a Map<String, Value>> {
    let object = body.as_object();
    if object.is_none() {
        errors
            .form_errors
            .push(format!("Expected object, received {}", type_name(body)));
    }
    object
}

fn optional_string(
    object: &Map<String, Value>,
    name: &str,
    default: &str,
    errors: &mut ValidationErrors,
) -> String {
    match object.get(name) {
        None => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            errors.field(name, format!("Expected string, received {}", type_name(other)));
            default.to_string()
        }
    }
}

fn integer_field(value: &Value, name: &str, errors: &mut ValidationErrors) -> Option<i64> {
    let Some(number) = value.as_f64() else {
        errors.field(name, format!("Expected number, received {}", type_name(value)));
        return None;
    };
    if !number.is_finite() || number.fract() != 0.0 {
        errors.field(name, "Expected integer, received float");
        return None;
    }
    Some(number as i64)
}

/// Validate a `/api/generate-carousel` body.
pub fn validate_generate_body(
    body: &Value,
) -> std::result::Result<GenerationRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let Some(object) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    let topic = match object.get("topic") {
        None => {
            errors.field("topic", "Required");
            String::new()
        }
        Some(Value::String(topic)) => {
            if topic.chars().count() < MIN_TOPIC_CHARS {
                errors.field(
                    "topic",
                    format!("String must contain at least {} character(s)", MIN_TOPIC_CHARS),
                );
            }
            topic.clone()
        }
        Some(other) => {
            errors.field("topic", format!("Expected string, received {}", type_name(other)));
            String::new()
        }
    };

    let slide_count = match object.get("slideCount") {
        None => {
            errors.field("slideCount", "Required");
            None
        }
        Some(value) => integer_field(value, "slideCount", &mut errors).and_then(|n| {
            if n < MIN_SLIDES as i64 {
                errors.field(
                    "slideCount",
                    format!("Number must be greater than or equal to {}", MIN_SLIDES),
                );
                None
            } else if n > MAX_SLIDES as i64 {
                errors.field(
                    "slideCount",
                    format!("Number must be less than or equal to {}", MAX_SLIDES),
                );
                None
            } else {
                Some(n as usize)
            }
        }),
    };

    let profile_niche = optional_string(object, "profileNiche", DEFAULT_NICHE, &mut errors);
    let tone = optional_string(object, "tone", DEFAULT_TONE, &mut errors);

    match slide_count {
        Some(slide_count) if errors.is_empty() => Ok(GenerationRequest {
            topic,
            slide_count,
            profile_niche,
            tone,
        }),
        _ => Err(errors),
    }
}

/// Validate a `/api/split-text` body. The count is clamped, not rejected.
pub fn validate_split_body(body: &Value) -> std::result::Result<(String, usize), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let Some(object) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    let text = match object.get("text") {
        Some(Value::String(text)) => Some(text.clone()),
        None => {
            errors.field("text", "Required");
            None
        }
        Some(other) => {
            errors.field("text", format!("Expected string, received {}", type_name(other)));
            None
        }
    };

    let count = match object.get("slideCount") {
        None => Some(DEFAULT_SPLIT_COUNT),
        Some(value) => integer_field(value, "slideCount", &mut errors),
    };

    match (text, count) {
        (Some(text), Some(count)) => Ok((text, segment::clamp_slide_count(count))),
        _ => Err(errors),
    }
}

fn validation_failure(errors: ValidationErrors) -> ApiResponse {
    ApiResponse::new(400, json!({ "error": errors }))
}

fn parse_json_body(body: &str) -> std::result::Result<Value, ApiResponse> {
    serde_json::from_str(body).map_err(|e| {
        let mut errors = ValidationErrors::default();
        errors.form_errors.push(format!("Invalid JSON body: {}", e));
        validation_failure(errors)
    })
}

/// Route one request. Independent of the HTTP transport.
pub fn handle_request(generator: &SlideGenerator, method: &str, url: &str, body: &str) -> ApiResponse {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        ("OPTIONS", _) => ApiResponse::new(204, Value::Null),
        ("GET", "/health") => ApiResponse::new(200, json!({ "ok": true })),
        ("POST", "/api/generate-carousel") => {
            let value = match parse_json_body(body) {
                Ok(value) => value,
                Err(response) => return response,
            };
            let request = match validate_generate_body(&value) {
                Ok(request) => request,
                Err(errors) => return validation_failure(errors),
            };

            match generator.generate(&request) {
                Ok(slides) => ApiResponse::new(200, json!({ "slides": slides })),
                Err(e) => {
                    warn!("Carousel generation failed: {}", e);
                    ApiResponse::new(
                        500,
                        json!({ "error": "Failed to generate carousel", "detail": e.to_string() }),
                    )
                }
            }
        }
        ("POST", "/api/split-text") => {
            let value = match parse_json_body(body) {
                Ok(value) => value,
                Err(response) => return response,
            };
            match validate_split_body(&value) {
                Ok((text, count)) => {
                    ApiResponse::new(200, json!({ "slides": segment::segment(&text, count) }))
                }
                Err(errors) => validation_failure(errors),
            }
        }
        _ => ApiResponse::new(404, json!({ "error": "Not found" })),
    }
}

fn read_body(request: &mut Request) -> std::result::Result<String, ApiResponse> {
    if request.body_length().is_some_and(|len| len > MAX_BODY_BYTES) {
        return Err(ApiResponse::new(413, json!({ "error": "Request body too large" })));
    }

    let mut bytes = Vec::new();
    let limit = MAX_BODY_BYTES as u64 + 1;
    if let Err(e) = request.as_reader().take(limit).read_to_end(&mut bytes) {
        return Err(ApiResponse::new(
            400,
            json!({ "error": format!("Failed to read body: {}", e) }),
        ));
    }
    if bytes.len() > MAX_BODY_BYTES {
        return Err(ApiResponse::new(413, json!({ "error": "Request body too large" })));
    }

    String::from_utf8(bytes)
        .map_err(|_| ApiResponse::new(400, json!({ "error": "Request body is not valid UTF-8" })))
}

fn respond(request: Request, response: ApiResponse, cors_origin: &str) {
    let payload = if response.body.is_null() {
        String::new()
    } else {
        response.body.to_string()
    };

    let mut http_response =
        Response::from_string(payload).with_status_code(StatusCode(response.status));
    let headers = [
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", cors_origin),
        ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type"),
    ];
    for (name, value) in headers {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => http_response.add_header(header),
            Err(()) => warn!("Skipping invalid header value for {}", name),
        }
    }

    if let Err(e) = request.respond(http_response) {
        warn!("Failed to send response: {}", e);
    }
}

/// Run the HTTP server until the process exits. Each request gets its own thread.
pub fn serve(config: &Config) -> Result<()> {
    let generator = Arc::new(SlideGenerator::from_config(config)?);
    let cors_origin: Arc<str> = Arc::from(config.cors_origin.as_str());

    let address = format!("0.0.0.0:{}", config.port);
    let server = Server::http(&address)
        .map_err(|e| CarouselError::ServerError(format!("Failed to start HTTP server: {}", e)))?;

    info!("Server running on http://localhost:{}", config.port);
    if !generator.is_configured() {
        warn!("OPENAI_API_KEY is not set; generation will return placeholder slides");
    }

    for mut request in server.incoming_requests() {
        let generator = Arc::clone(&generator);
        let cors_origin = Arc::clone(&cors_origin);

        thread::spawn(move || {
            let method = request.method().to_string();
            let url = request.url().to_string();
            debug!("{} {}", method, url);

            let response = match read_body(&mut request) {
                Ok(body) => handle_request(&generator, &method, &url, &body),
                Err(response) => response,
            };
            info!("{} {} -> {}", method, url, response.status);
            respond(request, response, &cors_origin);
        });
    }

    Ok(())
}
