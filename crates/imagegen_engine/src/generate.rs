use engine_logging::{engine_debug, engine_warn};
use imagegen_core::GenerationFailure;
use serde::{Deserialize, Serialize};

use crate::{AuthSession, ServiceSettings};

const GENERATE_PATH: &str = "functions/v1/generate-image";

/// The remote image generation service.
#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns the generated image reference (URL or `data:` URI).
    async fn generate(
        &self,
        prompt: &str,
        source_image: Option<&str>,
    ) -> Result<String, GenerationFailure>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequestBody<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_image: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponseBody {
    image_url: Option<String>,
    error: Option<String>,
}

/// Calls the `generate-image` edge function over HTTP.
#[derive(Debug, Clone)]
pub struct HttpImageGenerator {
    settings: ServiceSettings,
    auth: AuthSession,
    client: reqwest::Client,
}

impl HttpImageGenerator {
    pub fn new(settings: ServiceSettings, auth: AuthSession) -> Result<Self, GenerationFailure> {
        let client = settings
            .build_client()
            .map_err(|err| GenerationFailure::Transport(err.to_string()))?;
        Ok(Self {
            settings,
            auth,
            client,
        })
    }
}

#[async_trait::async_trait]
impl ImageGenerator for HttpImageGenerator {
    async fn generate(
        &self,
        prompt: &str,
        source_image: Option<&str>,
    ) -> Result<String, GenerationFailure> {
        let url = self
            .settings
            .endpoint(GENERATE_PATH)
            .map_err(|err| GenerationFailure::Transport(err.to_string()))?;
        let token = self
            .auth
            .access_token()
            .unwrap_or_else(|| self.settings.api_key.clone());

        let response = self
            .client
            .post(url)
            .header("apikey", &self.settings.api_key)
            .bearer_auth(token)
            .json(&GenerateRequestBody {
                prompt,
                source_image,
            })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        let parsed = serde_json::from_str::<GenerateResponseBody>(&body);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|parsed| parsed.error)
                .unwrap_or_else(|| format!("status {status}"));
            engine_warn!("Generation rejected with {}: {}", status, message);
            return Err(GenerationFailure::RequestRejected(message));
        }

        let parsed = parsed.map_err(|err| {
            GenerationFailure::Transport(format!("invalid response body: {err}"))
        })?;
        interpret_response(parsed)
    }
}

fn interpret_response(body: GenerateResponseBody) -> Result<String, GenerationFailure> {
    match body {
        GenerateResponseBody {
            image_url: Some(image_url),
            ..
        } if !image_url.trim().is_empty() => {
            engine_debug!("Generation returned image ref of {} bytes", image_url.len());
            Ok(image_url)
        }
        GenerateResponseBody {
            error: Some(error), ..
        } => Err(GenerationFailure::RequestRejected(error)),
        _ => Err(GenerationFailure::NoImageReturned),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GenerationFailure {
    if err.is_timeout() {
        return GenerationFailure::Transport("request timed out".to_string());
    }
    GenerationFailure::Transport(err.to_string())
}
