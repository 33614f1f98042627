//! Content provider trait and the values it produces.
//!
//! Choice-mode rounds are built from generated content: a short clinical case
//! for the clinical quiz, an anatomical illustration for the visual quiz.
//! Implementations live in the `neuromaster-providers` crate.

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::model::NerveRecord;

/// Nerve the offline clinical case is about (XI, Accessory).
pub const OFFLINE_SCENARIO_NERVE_ID: u8 = 11;

const OFFLINE_SCENARIO_TEXT: &str = "The patient has marked difficulty shrugging the shoulders \
     and turning the head against resistance. (Offline mode: content service unavailable)";

/// Source of generated round content.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate a clinical case about a nerve of the provider's choosing.
    async fn clinical_scenario(&self) -> anyhow::Result<ClinicalScenario>;

    /// Generate an illustration of `nerve`'s main function.
    async fn illustration(&self, nerve: &NerveRecord) -> anyhow::Result<Illustration>;
}

/// A generated clinical case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalScenario {
    /// Case description. Never names the affected nerve.
    pub text: String,
    /// Id of the affected nerve.
    pub target_id: u8,
    /// `true` for the built-in case used when generation fails.
    #[serde(default)]
    pub offline: bool,
}

impl ClinicalScenario {
    /// Built-in case that keeps the clinical quiz playable without a backend.
    pub fn offline() -> Self {
        Self {
            text: OFFLINE_SCENARIO_TEXT.to_string(),
            target_id: OFFLINE_SCENARIO_NERVE_ID,
            offline: true,
        }
    }
}

/// A generated raster image, carried inline as base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Illustration {
    /// MIME type reported by the provider (e.g. "image/png").
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data_base64: String,
}

impl Illustration {
    /// Decode the image bytes.
    pub fn decode(&self) -> anyhow::Result<Vec<u8>> {
        Ok(base64::engine::general_purpose::STANDARD.decode(self.data_base64.trim())?)
    }

    /// `data:` URL suitable for embedding in HTML.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}
