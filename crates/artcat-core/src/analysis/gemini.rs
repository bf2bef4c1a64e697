use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::backend::{AnalysisBackend, BackendResponse};
use crate::config::{AiConfig, ApiKey};
use crate::errors::CoreError;
use crate::models::AnalysisRequest;
use crate::util::truncate_for_error;

// ── Wire types for `models/{model}:generateContent` ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// AI backend that calls the Gemini REST API.
pub struct GeminiBackend {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<ApiKey>,
}

impl GeminiBackend {
    /// The key is injected rather than read here; a missing key only fails when
    /// `execute` is called, and before anything goes over the network.
    pub fn new(config: &AiConfig, api_key: Option<ApiKey>) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl AnalysisBackend for GeminiBackend {
    fn execute(
        &self,
        image: &AnalysisRequest,
        prompt: &str,
        json_schema: &str,
    ) -> Result<BackendResponse, CoreError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            CoreError::MissingCredential("no API key configured for the inference service".to_string())
        })?;

        let body = build_request_body(image, prompt, json_schema, self.temperature)?;

        tracing::debug!(
            model = %self.model,
            mime_type = %image.mime_type,
            payload_chars = image.image_data.len(),
            "calling generateContent"
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key.expose())
            .json(&body)
            .send()?;

        let status = response.status();
        let raw = response.text()?;

        if !status.is_success() {
            return Err(CoreError::Transport(describe_error(status.as_u16(), &raw)));
        }

        parse_generate_response(&raw)
    }
}

fn build_request_body<'a>(
    image: &'a AnalysisRequest,
    prompt: &'a str,
    json_schema: &str,
    temperature: f32,
) -> Result<GenerateContentRequest<'a>, CoreError> {
    let response_schema: serde_json::Value = serde_json::from_str(json_schema)
        .map_err(|e| CoreError::Config(format!("response schema is not valid JSON: {e}")))?;

    Ok(GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: &image.mime_type,
                        data: &image.image_data,
                    },
                },
                Part::Text { text: prompt },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema,
            temperature,
        },
    })
}

/// Pull the reply text out of a successful `generateContent` body.
fn parse_generate_response(raw: &str) -> Result<BackendResponse, CoreError> {
    let parsed: GenerateContentResponse = serde_json::from_str(raw).map_err(|e| {
        CoreError::Transport(format!(
            "unexpected generateContent body: {e}\nraw output: {}",
            truncate_for_error(raw, 500)
        ))
    })?;

    let (input_tokens, output_tokens) = parsed
        .usage_metadata
        .as_ref()
        .map(|u| (u.prompt_token_count, u.candidates_token_count))
        .unwrap_or((0, 0));

    let candidate = parsed.candidates.into_iter().next();
    if let Some(reason) = candidate.as_ref().and_then(|c| c.finish_reason.as_deref()) {
        tracing::debug!(finish_reason = reason, input_tokens, output_tokens, "candidate finished");
    }

    let text: String = candidate
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(CoreError::EmptyResponse);
    }

    Ok(BackendResponse {
        text,
        input_tokens,
        output_tokens,
    })
}

fn describe_error(status: u16, raw: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(raw) {
        Ok(env) => format!(
            "HTTP {status} {} ({}): {}",
            env.error.status, env.error.code, env.error.message
        ),
        Err(_) => format!("HTTP {status}: {}", truncate_for_error(raw, 500)),
    }
}
