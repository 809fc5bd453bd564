use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::{GencliError, Result};
use crate::model_gateway::{GenerateResponse, ModelGateway, ModelGatewayFuture};
use crate::providers::http_errors::{model_api_request_error, model_api_status_error};
use crate::request::GenerateRequest;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: InlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn generate_url(base_url: &str, model_id: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model_id
    )
}

fn to_request_body(request: &GenerateRequest) -> GenerateContentBody {
    let mut parts = Vec::with_capacity(2);
    if let Some(image) = &request.image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type(),
                data: STANDARD.encode(&image.bytes),
            },
        });
    }
    parts.push(Part::Text {
        text: request.prompt(),
    });

    GenerateContentBody {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        generation_config: request
            .temperature
            .map(|temperature| GenerationConfig { temperature }),
    }
}

fn first_candidate_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|part| part.text)
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiGateway {
    client: Client,
    api_key: String,
    base_url: String,
    timeout_secs: u64,
}

impl GeminiGateway {
    pub fn new(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_api_key()?.to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(GencliError::HttpClient)?;

        Ok(Self {
            client,
            api_key,
            base_url: settings.base_url.clone(),
            timeout_secs: settings.timeout_secs,
        })
    }

    async fn send(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let api_url = generate_url(&self.base_url, &request.model_id);
        let body = to_request_body(request);
        debug!(
            api_url = %api_url,
            model = %request.model_id,
            has_image = request.image.is_some(),
            "sending gemini generate request"
        );

        let response = self
            .client
            .post(&api_url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                warn!(
                    api_url = %api_url,
                    model = %request.model_id,
                    error = %err,
                    "gemini request failed"
                );
                model_api_request_error(err, &api_url, self.timeout_secs)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response body>".to_string());
            warn!(
                api_url = %api_url,
                model = %request.model_id,
                status = %status,
                response_body_len = response_body.len(),
                "gemini returned non-success status"
            );
            return Err(model_api_status_error(status.as_u16(), &response_body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| GencliError::Decode(err.to_string()))?;
        let text = first_candidate_text(parsed).ok_or(GencliError::EmptyResponse)?;
        debug!(
            model = %request.model_id,
            response_len = text.len(),
            "received gemini response"
        );
        Ok(GenerateResponse { text })
    }
}

impl ModelGateway for GeminiGateway {
    fn generate<'a>(&'a self, request: &'a GenerateRequest) -> ModelGatewayFuture<'a> {
        Box::pin(self.send(request))
    }
}
