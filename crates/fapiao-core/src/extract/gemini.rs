//! Gemini `generateContent` adapter for the extraction capability.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ExtractionClient, ExtractionRequest};
use crate::error::{ExtractionError, FapiaoError};
use crate::models::GeminiConfig;

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
enum Part<'a> {
    #[serde(rename = "text")]
    Text(&'a str),
    #[serde(rename = "inlineData")]
    InlineData(InlineData<'a>),
}

#[derive(Serialize)]
struct InlineData<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Extraction client backed by the Gemini `generateContent` API.
pub struct GeminiClient {
    config: GeminiConfig,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Build a client from configuration. Fails when no API key is
    /// configured and `GEMINI_API_KEY` is unset.
    pub fn new(config: GeminiConfig) -> crate::error::Result<Self> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| FapiaoError::Config("no API key configured".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FapiaoError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ExtractionClient for GeminiClient {
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<String, ExtractionError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text(request.instruction),
                    Part::InlineData(InlineData {
                        mime_type: request.mime_type,
                        data: BASE64.encode(request.content),
                    }),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        debug!(
            mime_type = request.mime_type,
            bytes = request.content.len(),
            model = %self.config.model,
            "sending extraction request"
        );

        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Request(format!(
                "extraction service returned {status}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Request(e.to_string()))?;

        parsed
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.swap_remove(0)) })
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| if p.is_empty() { None } else { Some(p.swap_remove(0)) })
            .and_then(|p| p.text)
            .ok_or(ExtractionError::EmptyResponse)
    }
}
