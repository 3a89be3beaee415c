// src/services/image_normalizer.rs
use base64::{Engine as _, engine::general_purpose};
use image::{GenericImageView, codecs::jpeg::JpegEncoder, imageops::FilterType};
use log::warn;

use crate::errors::CropSenseError;
use crate::models::NormalizedImage;

/// Uploads larger than this on either side get scaled down so the longer
/// side is exactly this many pixels.
pub const MAX_DIMENSION: u32 = 800;

/// JPEG quality factor, 0.6 on the [0,1] scale.
pub const JPEG_QUALITY: u8 = 60;

pub struct ImageNormalizer;

impl ImageNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Downscales and re-encodes an upload into a bounded data URI.
    /// Re-encoding happens even when the image is already small enough, to
    /// bound the upload size regardless of the original format.
    pub fn normalize(&self, data: &[u8]) -> Result<NormalizedImage, CropSenseError> {
        let img = image::load_from_memory(data)
            .map_err(|e| CropSenseError::ImageDecode(format!("failed to decode upload: {}", e)))?;

        let (width, height) = img.dimensions();

        let img = if width > MAX_DIMENSION || height > MAX_DIMENSION {
            // resize() preserves aspect ratio; the longer side lands exactly
            // on MAX_DIMENSION.
            img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
        } else {
            img
        };

        let (out_width, out_height) = img.dimensions();

        let mut encoded = Vec::new();
        {
            let mut cursor = std::io::Cursor::new(&mut encoded);
            let mut encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
            encoder.encode_image(&img.to_rgb8()).map_err(|e| {
                CropSenseError::ImageDecode(format!("failed to re-encode upload: {}", e))
            })?;
        }

        Ok(NormalizedImage {
            data_uri: format!(
                "data:image/jpeg;base64,{}",
                general_purpose::STANDARD.encode(&encoded)
            ),
            width: out_width,
            height: out_height,
            staged_at: chrono::Utc::now(),
        })
    }

    /// Normalization failure is non-fatal: the unmodified upload is staged
    /// under its original MIME type instead. Dimensions are unknown in that
    /// case and reported as zero.
    pub fn normalize_or_original(&self, data: &[u8], content_type: &str) -> NormalizedImage {
        match self.normalize(data) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!("image normalization failed, staging original upload: {}", e);
                NormalizedImage {
                    data_uri: format!(
                        "data:{};base64,{}",
                        content_type,
                        general_purpose::STANDARD.encode(data)
                    ),
                    width: 0,
                    height: 0,
                    staged_at: chrono::Utc::now(),
                }
            }
        }
    }
}
