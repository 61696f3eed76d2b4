pub mod command;
pub mod template;

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

pub use command::{CommandSynthesizer, SynthesizerConfig};
pub use template::{CommandTemplate, TemplateError};

fn default_output_format() -> String {
    "wav".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    #[serde(default)]
    pub reference_audio: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    /// Additional template variables; these win over the built-in names.
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

#[cfg(test)]
impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reference_audio: None,
            speaker: None,
            seed: None,
            output_format: default_output_format(),
            extra: HashMap::new(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Rendered command is empty. Check the command template.")]
    EmptyCommand,

    #[error("Synthesis command failed (exit code {code})")]
    Execution { code: i32 },

    #[error("Expected audio file not found at {}", .path.display())]
    OutputMissing { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthesisError {
    pub fn code(&self) -> &'static str {
        match self {
            SynthesisError::Template(_) => "TEMPLATE_ERROR",
            SynthesisError::EmptyCommand => "CONFIGURATION_ERROR",
            SynthesisError::Execution { .. } => "EXECUTION_ERROR",
            SynthesisError::OutputMissing { .. } => "OUTPUT_MISSING",
            SynthesisError::Io(_) => "IO_ERROR",
        }
    }
}

/// Turns one request into audio bytes. Implementations block the calling
/// thread until the audio is ready.
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError>;
}
