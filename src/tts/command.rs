use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use super::template::CommandTemplate;
use super::{SynthesisError, SynthesisRequest, Synthesizer};

#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    pub template: CommandTemplate,
    pub workdir: PathBuf,
}

/// Runs an external TTS command line built from a template.
///
/// Every call gets its own temporary directory; the command is told to write
/// its audio to `<tmpdir>/output.<format>` through the `{output}` placeholder.
pub struct CommandSynthesizer {
    config: SynthesizerConfig,
}

impl CommandSynthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    fn run(&self, command: &str) -> Result<ExitStatus, SynthesisError> {
        tracing::debug!(
            command = %command,
            workdir = %self.config.workdir.display(),
            "Running synthesis command"
        );

        let status = Command::new("/bin/sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.config.workdir)
            .stdin(Stdio::null())
            .status()?;

        Ok(status)
    }
}

impl Synthesizer for CommandSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError> {
        // Removed on drop, whichever way we leave this function
        let tmpdir = tempfile::Builder::new().prefix("index-tts-").tempdir()?;
        let output_path = tmpdir
            .path()
            .join(format!("output.{}", request.output_format));

        let values = template_values(request, &output_path);
        let command = self.config.template.render(&values)?;
        if command.is_empty() {
            return Err(SynthesisError::EmptyCommand);
        }

        let status = self.run(&command)?;
        if !status.success() {
            return Err(SynthesisError::Execution {
                code: exit_code(status),
            });
        }

        if !output_path.exists() {
            return Err(SynthesisError::OutputMissing { path: output_path });
        }

        let audio = std::fs::read(&output_path)?;
        tracing::info!(bytes = audio.len(), format = %request.output_format, "Synthesis complete");

        Ok(audio)
    }
}

/// Build the substitution map: the five built-in names, then `extra` on top.
pub fn template_values(request: &SynthesisRequest, output_path: &Path) -> HashMap<String, String> {
    let mut values = HashMap::new();
    values.insert("text".to_string(), request.text.clone());
    values.insert(
        "output".to_string(),
        output_path.to_string_lossy().to_string(),
    );
    values.insert(
        "reference_audio".to_string(),
        request.reference_audio.clone().unwrap_or_default(),
    );
    values.insert(
        "speaker".to_string(),
        request.speaker.clone().unwrap_or_default(),
    );
    values.insert(
        "seed".to_string(),
        request.seed.map(|s| s.to_string()).unwrap_or_default(),
    );

    values.extend(
        request
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    values
}

/// Exit code of the process, or `-signal` when it was killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}
