use super::{Backend, RefineRequest, RefinementKind, status_error};
use crate::draft::ScoreCard;
use crate::error::BackendError;
use crate::models::ModelDescriptor;
use crate::params::{EmailParameters, OutputFormat};
use crate::validate;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

/// JSON-over-HTTP client for the companion email API.
///
/// The base URL is deployment configuration; every endpoint lives under
/// `/api`. Non-2xx responses carry a `{ "detail": text }` body which is
/// surfaced verbatim.
pub struct ProxyBackend {
    base_url: String,
    client: Client,
}

impl ProxyBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .connect_timeout(Duration::from_secs(10))
                .pool_max_idle_per_host(10)
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, BackendError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, BackendError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, BackendError> {
    if !response.status().is_success() {
        return Err(status_error(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| BackendError::Malformed(e.to_string()))
}

// ─── Wire types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelDescriptor>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(rename = "generatedEmail")]
    generated_email: String,
}

#[derive(Debug, Serialize)]
struct RefineBody<'a> {
    #[serde(rename = "emailContent")]
    email_content: &'a str,
    #[serde(rename = "refinementType")]
    refinement_type: RefinementKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<&'a str>,
    model: &'a str,
    #[serde(rename = "outputFormat")]
    output_format: OutputFormat,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct RefineResponse {
    #[serde(rename = "refinedEmail")]
    refined_email: String,
}

#[derive(Debug, Serialize)]
struct ScoreBody<'a> {
    #[serde(rename = "emailContent")]
    email_content: &'a str,
    model: &'a str,
    #[serde(rename = "outputFormat")]
    output_format: OutputFormat,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ConvertBody<'a> {
    content: &'a str,
    #[serde(rename = "fromFormat")]
    from_format: OutputFormat,
    #[serde(rename = "toFormat")]
    to_format: OutputFormat,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(rename = "convertedContent")]
    converted_content: String,
}

// ─── Backend impl ───────────────────────────────────────────────────────────

#[async_trait]
impl Backend for ProxyBackend {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, BackendError> {
        let response: ModelsResponse = self.get_json("/api/models").await?;
        Ok(response.models)
    }

    async fn generate(&self, params: &EmailParameters) -> Result<String, BackendError> {
        let response: GenerateResponse = self.post_json("/api/generate-email", params).await?;
        Ok(response.generated_email)
    }

    async fn refine(&self, request: RefineRequest<'_>) -> Result<String, BackendError> {
        let body = RefineBody {
            email_content: request.content,
            refinement_type: request.kind,
            suggestions: request.suggestions,
            model: request.model,
            output_format: request.output_format,
            temperature: request.temperature,
        };
        let response: RefineResponse = self.post_json("/api/refine-email", &body).await?;
        Ok(response.refined_email)
    }

    async fn score(
        &self,
        content: &str,
        model: &str,
        format: OutputFormat,
        temperature: f64,
    ) -> Result<ScoreCard, BackendError> {
        let body = ScoreBody {
            email_content: content,
            model,
            output_format: format,
            temperature,
        };
        let value: serde_json::Value = self.post_json("/api/score-email", &body).await?;
        validate::score_card_from_value(&value)
    }

    async fn convert(
        &self,
        content: &str,
        from: OutputFormat,
        to: OutputFormat,
        model: &str,
    ) -> Result<String, BackendError> {
        let body = ConvertBody {
            content,
            from_format: from,
            to_format: to,
            model,
        };
        let response: ConvertResponse = self.post_json("/api/convert-format", &body).await?;
        Ok(response.converted_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn strips_trailing_slash() {
        let backend = ProxyBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn refine_body_serializes_with_suggestions() {
        let body = RefineBody {
            email_content: "Hello",
            refinement_type: RefinementKind::Improvement,
            suggestions: Some("shorten the intro"),
            model: "gemma",
            output_format: OutputFormat::Markdown,
            temperature: 0.7,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"refinementType\":\"improvement\""));
        assert!(json.contains("\"suggestions\":\"shorten the intro\""));
        assert!(json.contains("\"emailContent\":\"Hello\""));
    }

    #[test]
    fn refine_body_omits_absent_suggestions() {
        let body = RefineBody {
            email_content: "Hello",
            refinement_type: RefinementKind::Shorter,
            suggestions: None,
            model: "gemma",
            output_format: OutputFormat::Html,
            temperature: 0.2,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("suggestions"));
        assert!(json.contains("\"refinementType\":\"shorter\""));
        assert!(json.contains("\"outputFormat\":\"html\""));
    }

    #[test]
    fn responses_deserialize() {
        let r#gen: GenerateResponse =
            serde_json::from_str(r#"{"generatedEmail":"Dear Jordan"}"#).unwrap();
        assert_eq!(r#gen.generated_email, "Dear Jordan");

        let refined: RefineResponse =
            serde_json::from_str(r#"{"refinedEmail":"Dear J."}"#).unwrap();
        assert_eq!(refined.refined_email, "Dear J.");

        let converted: ConvertResponse =
            serde_json::from_str(r##"{"convertedContent":"# Hi"}"##).unwrap();
        assert_eq!(converted.converted_content, "# Hi");

        let models: ModelsResponse =
            serde_json::from_str(r#"{"models":[{"name":"gemma"},{"name":"qwen"}]}"#).unwrap();
        assert_eq!(models.models.len(), 2);
    }

    #[tokio::test]
    async fn generate_posts_full_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-email"))
            .and(body_partial_json(json!({
                "tone": "professional",
                "outputFormat": "markdown",
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"generatedEmail": "Dear Jordan,"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let backend = ProxyBackend::new(&server.uri());
        let draft = backend
            .generate(&crate::params::EmailParameters::sample())
            .await
            .unwrap();
        assert_eq!(draft, "Dear Jordan,");
    }

    #[tokio::test]
    async fn non_2xx_surfaces_detail_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-email"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"detail": "temperature must be between 0 and 1"})),
            )
            .mount(&server)
            .await;

        let backend = ProxyBackend::new(&server.uri());
        let err = backend
            .generate(&crate::params::EmailParameters::sample())
            .await
            .unwrap_err();

        match err {
            BackendError::Status { status, detail } => {
                assert_eq!(status, 422);
                assert_eq!(detail, "temperature must be between 0 and 1");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn score_response_missing_field_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/score-email"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "scores": {
                    "subjectLine": 8,
                    "writingStyle": 7,
                    "content": 9,
                    "structure": 6
                },
                "suggestions": "Add a subject line."
            })))
            .mount(&server)
            .await;

        let backend = ProxyBackend::new(&server.uri());
        let err = backend
            .score("Hello", "gemma", OutputFormat::Markdown, 0.7)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
        assert!(err.to_string().contains("personalization"));
    }
}
