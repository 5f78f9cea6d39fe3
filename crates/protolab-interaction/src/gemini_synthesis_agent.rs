//! GeminiSynthesisAgent - Direct REST API implementation of the
//! synthesis service.
//!
//! This agent calls the Gemini REST API directly with the ordered screen
//! sequence as inline image parts and decodes the JSON answer into a
//! canonical file set.

use crate::SynthesisAgent;
use crate::response::SynthesisResponse;
use async_trait::async_trait;
use protolab_core::{FileSet, ProtolabError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const DEFAULT_SYNTHESIS_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default instruction sent alongside every request.
///
/// The contract it states to the model: screen order is navigation order,
/// the first screen is the home page, and the answer is a single JSON
/// object with a `files` array of `{path, content}` records.
const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an expert Next.js developer. \
Generate a complete, functional Next.js application from the ordered sequence of UI screenshots you are given.\n\
Use the App Router with TypeScript and TSX files, and TailwindCSS for styling.\n\
Navigation between pages must follow the order of the screenshots: the first screenshot is the home page \
at 'src/app/page.tsx', and every screen links to the one after it with a Next.js <Link> or router.push. \
Put the following screens under 'src/app/screen2/page.tsx', 'src/app/screen3/page.tsx' and so on, and \
create a root layout in 'src/app/layout.tsx'. Reusable components belong in 'src/components/'. \
Use https://placehold.co for placeholder images where needed.\n\
Respond with a single JSON object containing a 'files' property: an array of objects, each with a 'path' \
key (the full file path, e.g. 'src/app/page.tsx') and a 'content' key (the complete code for that file).";

/// Agent implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiSynthesisAgent {
    client: Client,
    api_key: String,
    model: String,
    system_instruction: String,
}

impl GeminiSynthesisAgent {
    /// Creates a new agent with the provided API key and the default
    /// model and instruction.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_SYNTHESIS_MODEL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Replaces the instruction that is sent alongside every request.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    fn build_contents(screens: &[String]) -> Result<Vec<Content>> {
        if screens.is_empty() {
            return Err(ProtolabError::validation(
                "Synthesis request requires at least one screen",
            ));
        }

        let mut parts = vec![Part::Text {
            text: "Here is the sequence of screens to implement, in navigation order."
                .to_string(),
        }];

        for (index, src) in screens.iter().enumerate() {
            let (mime_type, data) = split_data_uri(src)?;
            parts.push(Part::Text {
                text: format!("Screen {}:", index),
            });
            parts.push(Part::InlineData {
                inline_data: InlineDataPayload { mime_type, data },
            });
        }

        Ok(vec![Content {
            role: "user".to_string(),
            parts,
        }])
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response =
            self.client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|err| ProtolabError::Synthesis {
                    status_code: None,
                    message: format!("Synthesis request failed: {err}"),
                    is_retryable: err.is_connect() || err.is_timeout(),
                })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read synthesis error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            ProtolabError::malformed_response(format!("Failed to parse synthesis response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl SynthesisAgent for GeminiSynthesisAgent {
    fn describe(&self) -> &str {
        "Gemini synthesis agent for screenshot-to-codebase generation"
    }

    async fn generate(&self, screens: &[String]) -> Result<FileSet> {
        let request = GenerateContentRequest {
            contents: Self::build_contents(screens)?,
            system_instruction: Some(Content {
                role: "system".to_string(),
                parts: vec![Part::Text {
                    text: self.system_instruction.clone(),
                }],
            }),
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        tracing::info!(
            target: "synthesis",
            screens = screens.len(),
            model = %self.model,
            "Invoking synthesis service"
        );

        let text = self.send_request(&request).await?;
        let files = decode_file_set(&text)?;

        tracing::info!(target: "synthesis", files = files.len(), "Synthesis succeeded");
        Ok(files)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

/// Splits a `data:<mime>;base64,<payload>` URI into mime type and payload.
fn split_data_uri(src: &str) -> Result<(String, String)> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| ProtolabError::validation("Screen payload is not a data URI"))?;

    let (mime_type, data) = rest.split_once(";base64,").ok_or_else(|| {
        ProtolabError::validation("Screen payload is not a base64-encoded data URI")
    })?;

    if mime_type.is_empty() || data.is_empty() {
        return Err(ProtolabError::validation(
            "Screen payload has an empty media type or payload",
        ));
    }

    Ok((mime_type.to_string(), data.to_string()))
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            ProtolabError::malformed_response(
                "The synthesis service returned no text in the response candidates",
            )
        })
}

/// Decodes the model's JSON answer into a non-empty file set.
fn decode_file_set(text: &str) -> Result<FileSet> {
    let parsed: SynthesisResponse = serde_json::from_str(strip_json_fences(text))
        .map_err(|err| {
            ProtolabError::malformed_response(format!("Not a recognized file-set shape: {err}"))
        })?;

    let files = parsed.into_file_set();
    if files.is_empty() {
        return Err(ProtolabError::malformed_response(
            "The synthesis service returned no usable files",
        ));
    }

    Ok(files)
}

/// Models occasionally wrap JSON answers in markdown code fences even when
/// a JSON mime type was requested.
fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn map_http_error(status: StatusCode, body: String) -> ProtolabError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    ProtolabError::Synthesis {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_data_uri() {
        let (mime, data) = split_data_uri("data:image/png;base64,aGVsbG8=").unwrap();

        assert_eq!(mime, "image/png");
        assert_eq!(data, "aGVsbG8=");
    }

    #[test]
    fn test_split_data_uri_rejects_other_payloads() {
        assert!(split_data_uri("https://example.com/a.png").is_err());
        assert!(split_data_uri("data:image/png,rawdata").is_err());
        assert!(split_data_uri("data:;base64,aGVsbG8=").is_err());
        assert!(split_data_uri("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_build_contents_keeps_screen_order() {
        let screens = vec![
            "data:image/png;base64,Zmlyc3Q=".to_string(),
            "data:image/jpeg;base64,c2Vjb25k".to_string(),
        ];

        let contents = GeminiSynthesisAgent::build_contents(&screens).unwrap();

        assert_eq!(contents.len(), 1);
        // Leading instruction text, then a label and an image per screen
        assert_eq!(contents[0].parts.len(), 1 + screens.len() * 2);
        match &contents[0].parts[2] {
            Part::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/png");
                assert_eq!(inline_data.data, "Zmlyc3Q=");
            }
            Part::Text { .. } => panic!("expected first screen inline data"),
        }
        match &contents[0].parts[4] {
            Part::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/jpeg");
                assert_eq!(inline_data.data, "c2Vjb25k");
            }
            Part::Text { .. } => panic!("expected second screen inline data"),
        }
    }

    #[test]
    fn test_build_contents_rejects_empty_sequence() {
        let err = GeminiSynthesisAgent::build_contents(&[]).unwrap_err();

        assert!(err.is_validation());
    }

    #[test]
    fn test_extract_text_response() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"files\": []}"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(extract_text_response(response).unwrap(), r#"{"files": []}"#);
    }

    #[test]
    fn test_extract_text_response_without_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": []}"#).unwrap();

        let err = extract_text_response(response).unwrap_err();
        assert!(matches!(err, ProtolabError::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_file_set_accepts_fenced_json() {
        let files = decode_file_set(
            "```json\n{\"files\": [{\"path\": \"src/app/page.tsx\", \"content\": \"X\"}]}\n```",
        )
        .unwrap();

        assert_eq!(files.get("src/app/page.tsx"), Some("X"));
    }

    #[test]
    fn test_decode_file_set_rejects_empty_result() {
        let err = decode_file_set(r#"{"files": []}"#).unwrap_err();

        assert!(matches!(err, ProtolabError::MalformedResponse(_)));
    }

    #[test]
    fn test_map_http_error_classification() {
        let err = map_http_error(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error": {"code": 503, "message": "overloaded", "status": "UNAVAILABLE"}}"#
                .to_string(),
        );

        match err {
            ProtolabError::Synthesis {
                status_code,
                message,
                is_retryable,
            } => {
                assert_eq!(status_code, Some(503));
                assert_eq!(message, "UNAVAILABLE: overloaded");
                assert!(is_retryable);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = map_http_error(StatusCode::BAD_REQUEST, "nonsense".to_string());
        assert!(!err.is_retryable());
    }
}
