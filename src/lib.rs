// src/lib.rs
use std::sync::Arc;

pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

use crate::services::GatewayService;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayService>,
}
