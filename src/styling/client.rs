//! Gemini client for styling advice.
//!
//! One `generateContent` call per request: the photo goes inline as JPEG,
//! the prompt as text, and `responseSchema` pins the shape of the JSON reply.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::config::GeminiConfig;

use super::error::{ApiErrorResponse, GenerationError};
use super::prompt::{build_prompt, response_schema, strip_data_url_prefix, SHOPPING_KEYWORD_COUNT};
use super::types::{StylingAdvice, StylingRequest, StylingResult};

const IMAGE_MIME_TYPE: &str = "image/jpeg";
const RESPONSE_MIME_TYPE: &str = "application/json";

/// Anything that can turn a request into a finished result.
#[async_trait]
pub trait StylingModel: Send + Sync {
    async fn generate(&self, request: &StylingRequest) -> Result<StylingResult, GenerationError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build gemini http client")?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                api_key: config.api_key.clone(),
                model: config.model.clone(),
                endpoint,
            }),
        })
    }

    async fn error_from_status(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> GenerationError {
        match response.text().await {
            Ok(body) => {
                let message = serde_json::from_str::<ApiErrorResponse>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                GenerationError::Status {
                    status: status.as_u16(),
                    message,
                }
            }
            Err(e) => GenerationError::Http(e),
        }
    }
}

#[async_trait]
impl StylingModel for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.inner.model, gender = ?request.gender, occasion = ?request.occasion))]
    async fn generate(&self, request: &StylingRequest) -> Result<StylingResult, GenerationError> {
        let Some(api_key) = self.inner.api_key.as_deref() else {
            error!("GEMINI_API_KEY is not set; styling generation is unavailable");
            return Err(GenerationError::MissingApiKey);
        };

        let body = build_request_body(request);
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_status(status, response).await);
        }

        let raw = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| GenerationError::Malformed(format!("Failed to parse response: {e}")))?;
        let text = parsed.first_text().ok_or(GenerationError::EmptyResponse)?;
        let advice = parse_advice(&text)?;

        let result = StylingResult::from_advice(advice, request);
        debug!(result_id = %result.id, skin_tone = ?result.detected_skin_tone, "styling advice generated");
        Ok(result)
    }
}

// ---- wire types ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, `None` when blank.
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn build_request_body(request: &StylingRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".into()),
            parts: vec![
                Part {
                    inline_data: Some(Blob {
                        mime_type: IMAGE_MIME_TYPE.into(),
                        data: strip_data_url_prefix(&request.image).to_string(),
                    }),
                    text: None,
                },
                Part {
                    inline_data: None,
                    text: Some(build_prompt(request)),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE,
            response_schema: response_schema(),
        },
    }
}

fn parse_advice(text: &str) -> Result<StylingAdvice, GenerationError> {
    let advice: StylingAdvice = serde_json::from_str(text.trim())
        .map_err(|e| GenerationError::Malformed(format!("invalid advice JSON: {e}")))?;
    if advice.shopping_keywords.len() != SHOPPING_KEYWORD_COUNT {
        return Err(GenerationError::Malformed(format!(
            "expected {} shopping keywords, got {}",
            SHOPPING_KEYWORD_COUNT,
            advice.shopping_keywords.len()
        )));
    }
    Ok(advice)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode, Uri},
        Json, Router,
    };
    use serde_json::json;

    use super::*;
    use crate::styling::types::{fixtures, SkinTone};

    #[derive(Debug, Clone)]
    struct Seen {
        path: String,
        api_key: Option<String>,
        body: Value,
    }

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        body: String,
        seen: Arc<Mutex<Vec<Seen>>>,
    }

    async fn stub_handler(
        State(stub): State<Stub>,
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        stub.seen.lock().unwrap().push(Seen {
            path: uri.path().to_string(),
            api_key: headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            body,
        });
        (stub.status, stub.body.clone())
    }

    async fn spawn_stub(status: StatusCode, body: String) -> (String, Arc<Mutex<Vec<Seen>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(stub_handler).with_state(Stub {
            status,
            body,
            seen: seen.clone(),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    fn config(api_base: &str, api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(String::from),
            model: "gemini-test".into(),
            api_base: api_base.into(),
            timeout_secs: 5,
        }
    }

    fn candidate_body(text: &str) -> String {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn generate_merges_advice_with_request() {
        let advice = serde_json::to_string(&fixtures::advice()).unwrap();
        let (base, seen) = spawn_stub(StatusCode::OK, candidate_body(&advice)).await;
        let client = GeminiClient::new(&config(&base, Some("test-key"))).unwrap();

        let req = fixtures::request();
        let result = client.generate(&req).await.unwrap();

        assert_eq!(result.detected_skin_tone, SkinTone::Olive);
        assert!(SkinTone::ALL.contains(&result.detected_skin_tone));
        assert_eq!(result.shopping_keywords.len(), 5);
        assert_eq!(result.user_image, req.image);
        assert_eq!(result.event_details, "Rooftop birthday dinner");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/v1beta/models/gemini-test:generateContent");
        assert_eq!(seen[0].api_key.as_deref(), Some("test-key"));
        let parts = &seen[0].body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "aGVsbG8=");
        assert!(parts[1]["text"].as_str().unwrap().contains("Occasion: Party"));
        assert_eq!(
            seen[0].body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn padded_data_url_is_sent_as_bare_base64() {
        let advice = serde_json::to_string(&fixtures::advice()).unwrap();
        let (base, seen) = spawn_stub(StatusCode::OK, candidate_body(&advice)).await;
        let client = GeminiClient::new(&config(&base, Some("k"))).unwrap();

        let mut req = fixtures::request();
        req.image = "  data:image/png;base64,aGVsbG8=\n".into();
        client.generate(&req).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0].body["contents"][0]["parts"][0]["inlineData"]["data"],
            "aGVsbG8="
        );
    }

    #[tokio::test]
    async fn http_failure_maps_to_status_error() {
        let body = json!({"error": {"code": 503, "message": "overloaded", "status": "UNAVAILABLE"}});
        let (base, _) = spawn_stub(StatusCode::SERVICE_UNAVAILABLE, body.to_string()).await;
        let client = GeminiClient::new(&config(&base, Some("k"))).unwrap();

        match client.generate(&fixtures::request()).await {
            Err(GenerationError::Status { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_candidates_is_empty_response() {
        let (base, _) = spawn_stub(StatusCode::OK, r#"{"candidates":[]}"#.into()).await;
        let client = GeminiClient::new(&config(&base, Some("k"))).unwrap();
        let err = client.generate(&fixtures::request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn non_json_text_is_malformed() {
        let (base, _) = spawn_stub(StatusCode::OK, candidate_body("Sure! Here is your look")).await;
        let client = GeminiClient::new(&config(&base, Some("k"))).unwrap();
        let err = client.generate(&fixtures::request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[tokio::test]
    async fn missing_api_key_never_calls_out() {
        let (base, seen) = spawn_stub(StatusCode::OK, candidate_body("{}")).await;
        let client = GeminiClient::new(&config(&base, None)).unwrap();
        let err = client.generate(&fixtures::request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn parse_advice_rejects_wrong_keyword_count() {
        let mut advice = fixtures::advice();
        advice.shopping_keywords.pop();
        let text = serde_json::to_string(&advice).unwrap();
        assert!(matches!(parse_advice(&text), Err(GenerationError::Malformed(_))));
    }

    #[test]
    fn parse_advice_rejects_unknown_skin_tone() {
        let mut value = serde_json::to_value(fixtures::advice()).unwrap();
        value["detectedSkinTone"] = json!("Tan");
        assert!(matches!(
            parse_advice(&value.to_string()),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn first_text_joins_parts() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn client_is_clone_send_sync() {
        fn assert_traits<T: Clone + Send + Sync>() {}
        assert_traits::<GeminiClient>();
    }
}
