// src/main.rs
use std::sync::Arc;

use actix_web::{App, HttpResponse, HttpServer, http::Method, middleware, web};
use log::info;

use cropsense::AppState;
use cropsense::config::RelayConfig;
use cropsense::handlers::{analyze_crop, cors_preflight, farm_chat};
use cropsense::services::GatewayService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting cropsense relay...");

    let config = RelayConfig::from_env();
    if config.api_key.is_none() {
        info!("AI_GATEWAY_API_KEY not set; analysis and chat requests will fail");
    }

    let app_state = AppState {
        gateway: Arc::new(GatewayService::from_config(&config)),
    };

    info!("Starting HTTP server on {}", config.bind_addr);

    let bind_addr = config.bind_addr.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .route("/analyze-crop", web::post().to(analyze_crop))
            .route("/analyze-crop", web::method(Method::OPTIONS).to(cors_preflight))
            .route("/farm-chat", web::post().to(farm_chat))
            .route("/farm-chat", web::method(Method::OPTIONS).to(cors_preflight))
            .route("/health", web::get().to(health_check))
    })
    .bind(bind_addr)?
    .run()
    .await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "cropsense",
        "version": cropsense::services::gateway::RELAY_VERSION
    }))
}
