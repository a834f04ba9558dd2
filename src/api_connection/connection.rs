use dotenv::dotenv;
use reqwest::Client;
use std::env;
use thiserror::Error;
use tracing::{debug, error};

use super::endpoints::{GenerateContentRequest, GenerateContentResponse, Provider, GEMINI_BASE_URL};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("Model returned no usable content")]
    EmptyResponse,
}

impl Provider {
    pub fn gemini(api_key_env_var_name: &str) -> Self {
        dotenv().ok();
        Self::Gemini {
            api_key_env_var: api_key_env_var_name.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Same provider, pointed at another endpoint root (proxies, local mocks).
    pub fn with_base_url(self, url: impl Into<String>) -> Self {
        match self {
            Provider::Gemini { api_key_env_var, .. } => Provider::Gemini {
                api_key_env_var,
                base_url: url.into(),
            },
        }
    }

    pub fn api_key_env_var(&self) -> &str {
        match self {
            Provider::Gemini { api_key_env_var, .. } => api_key_env_var,
        }
    }

    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError> {
        match self {
            Provider::Gemini {
                api_key_env_var,
                base_url,
            } => {
                dotenv().ok();
                let api_key = env::var(api_key_env_var)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| ApiConnectionError::MissingApiKey(api_key_env_var.clone()))?;

                let url = format!("{}/{}:generateContent", base_url.trim_end_matches('/'), model);
                debug!(model, "Sending generateContent request");

                let response = Client::new()
                    .post(&url)
                    .query(&[("key", api_key.as_str())])
                    .json(request)
                    .send()
                    .await?;

                let status = response.status();
                if status.is_success() {
                    let body = response.text().await?;
                    Ok(serde_json::from_str::<GenerateContentResponse>(&body)?)
                } else {
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    error!(model, %status, "Gemini request failed");
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}
