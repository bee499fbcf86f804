// SPDX-License-Identifier: MIT

//! Model gateway: load-or-degrade provider selection
//!
//! At startup exactly one text provider is chosen: the model-backed one if a
//! gguf artifact resolves and the local runtime serves it, otherwise the
//! deterministic fallback. Callers never branch on availability; every
//! operation returns a non-empty string and never fails.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{AppConfig, GenerationConfig, PromptConfig};
use crate::fallback;
pub use crate::fallback::ContextKind;
use crate::model;
use crate::runtime::{GenOptions, RuntimeClient};

/// Diagnostic record for status display
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub artifact_path: Option<PathBuf>,
    pub runtime_available: bool,
}

/// The two prompted operations plus context enhancement, with fallback
/// semantics baked into each implementation.
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn summarize(&self, text: &str, max_tokens: u32) -> String;
    async fn expand_detailed(&self, text: &str, max_tokens: u32) -> String;
    async fn enhance_with_context(&self, text: &str, kind: ContextKind, max_tokens: u32) -> String;
}

/// Deterministic provider used when no model is loaded
struct FallbackProvider;

#[async_trait]
impl TextProvider for FallbackProvider {
    async fn summarize(&self, text: &str, _max_tokens: u32) -> String {
        info!("Using fallback summary generation");
        fallback::summary(text)
    }

    async fn expand_detailed(&self, text: &str, _max_tokens: u32) -> String {
        info!("Using fallback detailed notes generation");
        fallback::detailed(text)
    }

    async fn enhance_with_context(&self, text: &str, kind: ContextKind, _max_tokens: u32) -> String {
        info!("Using fallback enhanced notes generation ({})", kind.as_str());
        fallback::enhanced(text, kind)
    }
}

/// Provider backed by the local model runtime
struct ModelProvider {
    runtime: RuntimeClient,
    model: String,
    prompts: PromptConfig,
    generation: GenerationConfig,
}

impl ModelProvider {
    fn options(&self, max_tokens: u32, temperature: f32) -> GenOptions {
        GenOptions {
            num_predict: max_tokens,
            temperature,
            top_p: self.generation.top_p,
            repeat_penalty: self.generation.repeat_penalty,
        }
    }

    /// Run one generation call, strip the echoed marker, fall back on
    /// error or whitespace-only output.
    async fn generate_or(
        &self,
        prompt: &str,
        marker: &str,
        options: GenOptions,
        fallback_text: impl FnOnce() -> String,
    ) -> String {
        match self.runtime.generate(&self.model, prompt, options).await {
            Ok(response) => {
                let cleaned = strip_marker(&response, marker);
                if cleaned.is_empty() {
                    warn!("Model returned empty output, using fallback");
                    fallback_text()
                } else {
                    cleaned.to_string()
                }
            }
            Err(e) => {
                warn!("Generation failed: {}, using fallback", e);
                fallback_text()
            }
        }
    }
}

#[async_trait]
impl TextProvider for ModelProvider {
    async fn summarize(&self, text: &str, max_tokens: u32) -> String {
        let prompt = format!("{}\n\n{}\n\nSummary:", self.prompts.summary, text);
        let options = self.options(max_tokens, self.generation.summary.temperature);
        self.generate_or(&prompt, "Summary:", options, || fallback::summary(text))
            .await
    }

    async fn expand_detailed(&self, text: &str, max_tokens: u32) -> String {
        let prompt = format!(
            "{}\n\nBrief Notes:\n{}\n\nDetailed Documentation:",
            self.prompts.expand, text
        );
        let options = self.options(max_tokens, self.generation.expand.temperature);
        self.generate_or(&prompt, "Detailed Documentation:", options, || {
            fallback::detailed(text)
        })
        .await
    }

    async fn enhance_with_context(&self, text: &str, kind: ContextKind, max_tokens: u32) -> String {
        let instruction = match kind {
            ContextKind::Professional => &self.prompts.enhance_professional,
            ContextKind::Personal => &self.prompts.enhance_personal,
            ContextKind::Technical => &self.prompts.enhance_technical,
        };
        let prompt = format!("{}\n\nOriginal Notes:\n{}\n\nEnhanced Notes:", instruction, text);
        let options = self.options(max_tokens, self.generation.enhance.temperature);
        self.generate_or(&prompt, "Enhanced Notes:", options, || {
            fallback::enhanced(text, kind)
        })
        .await
    }
}

/// Remove an echo of the prompt's trailing marker from a response
fn strip_marker<'a>(response: &'a str, marker: &str) -> &'a str {
    match response.rfind(marker) {
        Some(idx) => response[idx + marker.len()..].trim(),
        None => response.trim(),
    }
}

/// Model gateway: owns the selected provider and the status record
pub struct Gateway {
    provider: Box<dyn TextProvider>,
    status: ModelStatus,
    generation: GenerationConfig,
}

impl Gateway {
    /// Resolve the artifact, probe the runtime, and pick a provider.
    ///
    /// Never fails: any problem along the way degrades to the fallback
    /// provider so the application stays usable with zero AI capability.
    pub async fn initialize(config: &AppConfig) -> Self {
        let artifact = model::find_artifact(
            Path::new(&config.models_dir),
            config.model_name_hint.as_deref(),
        );

        let runtime = RuntimeClient::new(&config.runtime.url, config.runtime.timeout_secs).ok();
        let runtime_available = match runtime {
            Some(ref rt) => rt.health_check().await.is_ok(),
            None => false,
        };

        if artifact.is_none() {
            warn!("No gguf model artifact found, using fallback processing");
        }
        if !runtime_available {
            warn!(
                "Model runtime not reachable at {}, using fallback processing",
                config.runtime.url
            );
        }

        if let (Some(artifact_path), Some(rt), true) = (&artifact, runtime, runtime_available) {
            let name = model::model_name_for(artifact_path);
            match Self::ensure_served(&rt, &name, artifact_path).await {
                Ok(()) => {
                    info!("Model '{}' loaded from {:?}", name, artifact_path);
                    return Self {
                        provider: Box::new(ModelProvider {
                            runtime: rt,
                            model: name,
                            prompts: config.prompts.clone(),
                            generation: config.generation.clone(),
                        }),
                        status: ModelStatus {
                            loaded: true,
                            artifact_path: artifact.clone(),
                            runtime_available: true,
                        },
                        generation: config.generation.clone(),
                    };
                }
                Err(e) => {
                    warn!("Failed to load model: {}, using fallback processing", e);
                }
            }
        }

        Self {
            provider: Box::new(FallbackProvider),
            status: ModelStatus {
                loaded: false,
                artifact_path: artifact,
                runtime_available,
            },
            generation: config.generation.clone(),
        }
    }

    /// Make sure the runtime serves the artifact under the derived name
    async fn ensure_served(
        runtime: &RuntimeClient,
        name: &str,
        artifact: &Path,
    ) -> crate::Result<()> {
        if runtime.model_available(name).await? {
            return Ok(());
        }
        runtime.create_from_artifact(name, artifact).await
    }

    /// Summarize text. Empty input short-circuits to a fixed placeholder
    /// without touching any provider.
    pub async fn summarize(&self, text: &str, max_tokens: Option<u32>) -> String {
        if text.trim().is_empty() {
            return "No notes provided.".to_string();
        }
        let limit = max_tokens.unwrap_or(self.generation.summary.max_tokens);
        self.provider.summarize(text, limit).await
    }

    /// Expand brief notes into detailed documentation
    pub async fn expand_detailed(&self, text: &str, max_tokens: Option<u32>) -> String {
        if text.trim().is_empty() {
            return "No notes provided to expand.".to_string();
        }
        let limit = max_tokens.unwrap_or(self.generation.expand.max_tokens);
        self.provider.expand_detailed(text, limit).await
    }

    /// Enhance notes with a context-specific framing
    pub async fn enhance_with_context(&self, text: &str, kind: ContextKind) -> String {
        if text.trim().is_empty() {
            return "No notes provided to enhance.".to_string();
        }
        self.provider
            .enhance_with_context(text, kind, self.generation.enhance.max_tokens)
            .await
    }

    /// Whether a model is currently loaded
    pub fn is_model_loaded(&self) -> bool {
        self.status.loaded
    }

    /// Diagnostic status record
    pub fn status(&self) -> &ModelStatus {
        &self.status
    }
}
