// src/services/mod.rs
pub mod gateway;
pub mod image_normalizer;
pub mod progress;

pub use gateway::GatewayService;
pub use image_normalizer::ImageNormalizer;
pub use progress::ProgressEstimator;
