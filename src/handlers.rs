// src/handlers.rs
use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::errors::CropSenseError;
use crate::models::ChatMessage;

pub const CORS_ALLOW_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");
pub const CORS_ALLOW_HEADERS: (&str, &str) = (
    "Access-Control-Allow-Headers",
    "authorization, x-client-info, apikey, content-type",
);

/// Preflight requests succeed unconditionally, before any other processing.
pub async fn cors_preflight() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(CORS_ALLOW_ORIGIN)
        .insert_header(CORS_ALLOW_HEADERS)
        .body("ok")
}

pub async fn analyze_crop(
    body: web::Json<serde_json::Value>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, CropSenseError> {
    let image = body
        .get("image")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CropSenseError::Validation("image is required".to_string()))?;

    let result = data.gateway.analyze_crop(image).await?;

    Ok(HttpResponse::Ok()
        .insert_header(CORS_ALLOW_ORIGIN)
        .insert_header(CORS_ALLOW_HEADERS)
        .json(result))
}

pub async fn farm_chat(
    body: web::Json<serde_json::Value>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, CropSenseError> {
    let raw = body
        .get("messages")
        .cloned()
        .ok_or_else(|| CropSenseError::Validation("messages is required".to_string()))?;
    let messages: Vec<ChatMessage> = serde_json::from_value(raw)
        .map_err(|e| CropSenseError::Validation(format!("invalid messages: {}", e)))?;

    let upstream = data.gateway.chat_stream(&messages).await?;

    // Pipe the upstream byte stream back verbatim; delta parsing is the
    // consumer's responsibility.
    Ok(HttpResponse::Ok()
        .insert_header(CORS_ALLOW_ORIGIN)
        .insert_header(CORS_ALLOW_HEADERS)
        .content_type("text/event-stream")
        .streaming(upstream.bytes_stream()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::Method;
    use actix_web::{App, test};
    use serde_json::json;

    use crate::config::RelayConfig;
    use crate::services::GatewayService;

    fn state_without_credential() -> web::Data<AppState> {
        let config = RelayConfig::default();
        web::Data::new(AppState {
            gateway: Arc::new(GatewayService::from_config(&config)),
        })
    }

    #[actix_web::test]
    async fn preflight_succeeds_with_cors_headers() {
        let app = test::init_service(
            App::new().route("/analyze-crop", web::method(Method::OPTIONS).to(cors_preflight)),
        )
        .await;

        let req = test::TestRequest::with_uri("/analyze-crop")
            .method(Method::OPTIONS)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        assert!(resp.headers().get("Access-Control-Allow-Headers").is_some());
    }

    #[actix_web::test]
    async fn missing_image_yields_error_body() {
        let app = test::init_service(
            App::new()
                .app_data(state_without_credential())
                .route("/analyze-crop", web::post().to(analyze_crop)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/analyze-crop")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_server_error());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("image"));
    }

    #[actix_web::test]
    async fn empty_image_string_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(state_without_credential())
                .route("/analyze-crop", web::post().to(analyze_crop)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/analyze-crop")
            .set_json(json!({ "image": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_server_error());
    }

    #[actix_web::test]
    async fn missing_messages_yields_error_body() {
        let app = test::init_service(
            App::new()
                .app_data(state_without_credential())
                .route("/farm-chat", web::post().to(farm_chat)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/farm-chat")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_server_error());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("messages"));
    }

    #[actix_web::test]
    async fn malformed_message_role_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(state_without_credential())
                .route("/farm-chat", web::post().to(farm_chat)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/farm-chat")
            .set_json(json!({ "messages": [{ "role": "wizard", "content": "hi" }] }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_server_error());
    }
}
