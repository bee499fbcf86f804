// SPDX-License-Identifier: MIT

//! HTTP client for the local Ollama-compatible model runtime

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::{DaylogError, Result};

/// Sampling options for a single generation call
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenOptions {
    pub num_predict: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
}

/// Local model runtime client
pub struct RuntimeClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
    modelfile: String,
    stream: bool,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl RuntimeClient {
    /// Create a new runtime client
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DaylogError::RuntimeUnavailable(format!("HTTP client: {}", e)))?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Check if the runtime is reachable
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.base_url);

        self.client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                DaylogError::RuntimeUnavailable(format!(
                    "Cannot connect to model runtime at {}: {}",
                    self.base_url, e
                ))
            })?;

        Ok(())
    }

    /// List models known to the runtime
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;
        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Check whether a model is already served by the runtime
    pub async fn model_available(&self, model: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models
            .iter()
            .any(|m| m.starts_with(model) || m == &format!("{}:latest", model)))
    }

    /// Register a local gguf artifact under a model name
    pub async fn create_from_artifact(&self, model: &str, artifact: &Path) -> Result<()> {
        let url = format!("{}/api/create", self.base_url);

        let request = CreateRequest {
            name: model,
            modelfile: format!("FROM {}", artifact.display()),
            stream: false,
        };

        debug!("Registering artifact {:?} as '{}'", artifact, model);

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(DaylogError::RuntimeUnavailable(format!(
                "Runtime rejected artifact registration with status {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Generate a completion.
    ///
    /// Each call is stateless and non-streaming; no conversation context
    /// survives between calls.
    pub async fn generate(&self, model: &str, prompt: &str, options: GenOptions) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options,
        };

        debug!("Generate request: model={}", model);

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(DaylogError::RuntimeUnavailable(format!(
                "Runtime returned status {}",
                response.status()
            )));
        }

        let result: GenerateResponse = response.json().await?;
        Ok(result.response)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
