// SPDX-License-Identifier: MIT

//! Configuration management for daylog

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Directory scanned for gguf model artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    /// Optional substring used to prefer one artifact over another
    #[serde(default)]
    pub model_name_hint: Option<String>,

    /// Directory where report artifacts are written
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,

    /// Directory holding the TTF font family used for PDF output
    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: String,

    /// Local model runtime settings
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Sampling parameters per operation
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Prompt templates
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RuntimeConfig {
    #[serde(default = "default_runtime_url")]
    pub url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Per-operation sampling parameters
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct OpParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_summary_params")]
    pub summary: OpParams,
    #[serde(default = "default_expand_params")]
    pub expand: OpParams,
    #[serde(default = "default_enhance_params")]
    pub enhance: OpParams,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptConfig {
    #[serde(default = "default_summary_prompt")]
    pub summary: String,
    #[serde(default = "default_expand_prompt")]
    pub expand: String,
    #[serde(default = "default_professional_prompt")]
    pub enhance_professional: String,
    #[serde(default = "default_personal_prompt")]
    pub enhance_personal: String,
    #[serde(default = "default_technical_prompt")]
    pub enhance_technical: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

// Default value functions
fn default_models_dir() -> String { "./models".to_string() }
fn default_reports_dir() -> String { "./reports".to_string() }
fn default_fonts_dir() -> String { "./fonts".to_string() }
fn default_runtime_url() -> String { "http://localhost:11434".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_summary_params() -> OpParams { OpParams { max_tokens: 150, temperature: 0.3 } }
fn default_expand_params() -> OpParams { OpParams { max_tokens: 500, temperature: 0.4 } }
fn default_enhance_params() -> OpParams { OpParams { max_tokens: 400, temperature: 0.4 } }
fn default_top_p() -> f32 { 0.9 }
fn default_repeat_penalty() -> f32 { 1.1 }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }

fn default_summary_prompt() -> String {
    "Please summarize the following daily notes in 2-3 concise sentences. \
     Focus on the key activities and outcomes:".to_string()
}

fn default_expand_prompt() -> String {
    "Please expand the following brief daily notes into a detailed, professional \
     documentation. Add context, elaborate on activities, include potential outcomes \
     and next steps. Maintain a professional tone suitable for work documentation:".to_string()
}

fn default_professional_prompt() -> String {
    "Transform these notes into professional documentation suitable for workplace \
     reporting. Add business context and implications.".to_string()
}

fn default_personal_prompt() -> String {
    "Expand these notes with personal reflection and learning insights. Focus on \
     growth and development aspects.".to_string()
}

fn default_technical_prompt() -> String {
    "Enhance these notes with technical details and implementation considerations. \
     Include potential challenges and solutions.".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            url: default_runtime_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            summary: default_summary_params(),
            expand: default_expand_params(),
            enhance: default_enhance_params(),
            top_p: default_top_p(),
            repeat_penalty: default_repeat_penalty(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            summary: default_summary_prompt(),
            expand: default_expand_prompt(),
            enhance_professional: default_professional_prompt(),
            enhance_personal: default_personal_prompt(),
            enhance_technical: default_technical_prompt(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            model_name_hint: None,
            reports_dir: default_reports_dir(),
            fonts_dir: default_fonts_dir(),
            runtime: RuntimeConfig::default(),
            generation: GenerationConfig::default(),
            prompts: PromptConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::DaylogError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
