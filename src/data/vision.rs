//! Hosted vision-model boundary for leaf diagnosis.
//!
//! The input image is re-encoded to RGB JPEG (quality 92) so uploads have a
//! predictable size and format regardless of what the user hands us, then
//! sent inline (base64) with the fixed agronomist prompt. The reply is free
//! text and goes straight through `diagnose::parse`, which never fails.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::VisionConfig;
use crate::diagnose;
use crate::domain::DiagnosisRecord;
use crate::error::AppError;

const JPEG_QUALITY: u8 = 92;

pub struct VisionClient {
    client: Client,
    config: VisionConfig,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Analyze raw image bytes and return a schema-valid diagnosis.
    pub fn diagnose_image(&self, image_bytes: &[u8]) -> Result<DiagnosisRecord, AppError> {
        let jpeg = reencode_jpeg(image_bytes)?;
        let text = self.generate(&jpeg)?;
        Ok(diagnose::parse(&text))
    }

    fn generate(&self, jpeg: &[u8]) -> Result<String, AppError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model_id
        );

        let body = json!({
            "contents": [{
                "parts": [
                    { "text": diagnose::DIAGNOSIS_PROMPT },
                    { "inline_data": { "mime_type": "image/jpeg", "data": BASE64.encode(jpeg) } },
                ]
            }]
        });

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| AppError::new(4, format!("Vision model request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Vision model returned status {}.", resp.status()),
            ));
        }

        let reply: GenerateResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Malformed vision model response: {e}")))?;

        Ok(reply.into_text())
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenate the text parts of the first candidate. An empty reply is
    /// fine: the recovering parser turns it into a fallback record.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

/// Decode whatever we were given and re-encode as RGB JPEG.
fn reencode_jpeg(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::new(2, format!("Could not decode input image: {e}")))?;
    let rgb = img.to_rgb8();

    let mut out = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| AppError::new(2, format!("Could not re-encode image to JPEG: {e}")))?;
    Ok(out)
}
