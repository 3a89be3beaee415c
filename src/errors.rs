// src/errors.rs
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::handlers::{CORS_ALLOW_HEADERS, CORS_ALLOW_ORIGIN};

#[derive(Error, Debug)]
pub enum CropSenseError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("AI gateway error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Malformed gateway response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Stream unavailable: {0}")]
    StreamUnavailable(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("No image staged for analysis")]
    NoImage,

    #[error("Relay error: {0}")]
    Relay(String),
}

impl ResponseError for CropSenseError {
    // Every relay-side failure collapses into the same `{error}` JSON shape
    // the browser client expects, CORS headers included.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::InternalServerError()
            .insert_header(CORS_ALLOW_ORIGIN)
            .insert_header(CORS_ALLOW_HEADERS)
            .json(serde_json::json!({
                "error": self.to_string()
            }))
    }
}
