//! Google Gemini content provider.
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`)
//! with a text model for clinical cases and an image model for illustrations.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use neuromaster_core::catalog::{self, NERVE_COUNT};
use neuromaster_core::model::NerveRecord;
use neuromaster_core::traits::{ClinicalScenario, ContentProvider, Illustration};

use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gemini API provider.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            client,
        })
    }

    /// Override the model used for clinical cases.
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Override the model used for illustrations.
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    async fn generate_content(
        &self,
        model: &str,
        prompt: String,
    ) -> anyhow::Result<GeminiResponse> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiRequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(error_message(body)).into());
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(model.to_string()).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: error_message(body),
            }
            .into());
        }

        let api_response: GeminiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;
        Ok(api_response)
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiRequestPart>,
}

#[derive(Serialize)]
struct GeminiRequestPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GeminiResponse {
    fn parts(&self) -> impl Iterator<Item = &GeminiResponsePart> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
            .iter()
    }

    fn text(&self) -> String {
        self.parts()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_string()
    }

    fn inline_image(&self) -> Option<&GeminiInlineData> {
        self.parts().find_map(|p| p.inline_data.as_ref())
    }
}

fn error_message(body: String) -> String {
    serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

fn scenario_prompt(nerve: &NerveRecord) -> String {
    format!(
        "You are a neuroanatomy professor writing a quiz for medical students.\n\
         Write a short clinical case (at most 3 sentences) describing a patient with a lesion \
         of cranial nerve {} - {}.\n\n\
         Rules:\n\
         1. Do NOT mention the name of the nerve or its roman numeral.\n\
         2. Describe specific clinical signs (e.g. ptosis, anosmia, Bell's palsy, uvula deviation).\n\
         3. Return ONLY the case text.",
        nerve.roman, nerve.name
    )
}

fn illustration_prompt(nerve: &NerveRecord) -> String {
    format!(
        "Create an anatomical medical illustration in a didactic scientific drawing style, \
         focused on the main function of the cranial nerve: {} (function: {}).\n\n\
         Details:\n\
         - White or neutral background.\n\
         - Clean style, vector or high-quality medical sketch.\n\
         - Highlight the affected body part (eye, tongue, ear, face, etc.) or the action performed.\n\
         - Do NOT include text, letters or numbers in the image.",
        nerve.name, nerve.key_function
    )
}

#[async_trait]
impl ContentProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self), fields(model = %self.text_model))]
    async fn clinical_scenario(&self) -> anyhow::Result<ClinicalScenario> {
        let start = Instant::now();
        let target = &catalog::all()[rand::thread_rng().gen_range(0..NERVE_COUNT)];

        let response = self
            .generate_content(&self.text_model, scenario_prompt(target))
            .await?;

        let text = response.text();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse("no scenario text generated".into()).into());
        }

        tracing::debug!(
            target_id = target.id,
            latency_ms = start.elapsed().as_millis() as u64,
            "clinical case generated"
        );
        Ok(ClinicalScenario {
            text,
            target_id: target.id,
            offline: false,
        })
    }

    #[instrument(skip(self, nerve), fields(model = %self.image_model, nerve = nerve.id))]
    async fn illustration(&self, nerve: &NerveRecord) -> anyhow::Result<Illustration> {
        let start = Instant::now();
        let response = self
            .generate_content(&self.image_model, illustration_prompt(nerve))
            .await?;

        let image = response
            .inline_image()
            .ok_or_else(|| ProviderError::EmptyResponse("no image generated".into()))?;

        let illustration = Illustration {
            mime_type: image.mime_type.clone(),
            data_base64: image.data.clone(),
        };
        if illustration.decode().is_err() {
            return Err(
                ProviderError::EmptyResponse("image data is not valid base64".into()).into(),
            );
        }

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            bytes = image.data.len(),
            "illustration generated"
        );
        Ok(illustration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEXT_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";
    const IMAGE_PATH: &str = "/v1beta/models/gemini-2.5-flash-image:generateContent";

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new("test-key", Some(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn generates_clinical_scenario() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "  A 40-year-old cannot shrug his left shoulder.  "}]
                }
            }]
        });

        Mock::given(method("POST"))
            .and(path(TEXT_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_string_contains("Do NOT mention"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let scenario = provider(&server).clinical_scenario().await.unwrap();
        assert_eq!(scenario.text, "A 40-year-old cannot shrug his left shoulder.");
        assert!((1..=12).contains(&scenario.target_id));
        assert!(!scenario.offline);
    }

    #[tokio::test]
    async fn empty_text_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TEXT_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let err = provider(&server).clinical_scenario().await.unwrap_err();
        assert!(err.to_string().contains("empty response"));
    }

    #[tokio::test]
    async fn generates_illustration() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your illustration."},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                    ]
                }
            }]
        });

        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .and(body_string_contains("Tongue movement"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let nerve = catalog::by_id(12).unwrap();
        let image = provider(&server).illustration(nerve).await.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data_base64, "iVBORw0KGgo=");
        assert_eq!(image.decode().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn missing_image_is_an_error() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot draw that."}]}}]
        });

        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let nerve = catalog::by_id(2).unwrap();
        let err = provider(&server).illustration(nerve).await.unwrap_err();
        assert!(err.to_string().contains("no image generated"));
    }

    #[tokio::test]
    async fn undecodable_image_is_an_error() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": "not base64 at all!"}}
            ]}}]
        });

        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let nerve = catalog::by_id(3).unwrap();
        let err = provider(&server).illustration(nerve).await.unwrap_err();
        assert!(err.to_string().contains("not valid base64"));
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::EmptyResponse(_))
        ));
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TEXT_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server).clinical_scenario().await.unwrap_err();
        assert!(err.to_string().contains("authentication"));
        assert!(err.to_string().contains("API key not valid"));
        let provider_err = err.downcast_ref::<ProviderError>().unwrap();
        assert!(provider_err.is_permanent());
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "5"))
            .mount(&server)
            .await;

        let nerve = catalog::by_id(7).unwrap();
        let err = provider(&server).illustration(nerve).await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(
            err.downcast_ref::<ProviderError>()
                .and_then(|e| e.retry_after_ms()),
            Some(5000)
        );
    }

    #[tokio::test]
    async fn unknown_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = provider(&server)
            .with_text_model("gemini-0.1-nope")
            .clinical_scenario()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model not found: gemini-0.1-nope"));
    }

    #[tokio::test]
    async fn server_error_message_is_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TEXT_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"code": 500, "message": "internal failure"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server).clinical_scenario().await.unwrap_err();
        assert_eq!(err.to_string(), "API error (HTTP 500): internal failure");
    }
}
