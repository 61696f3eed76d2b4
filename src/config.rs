use std::env;
use std::path::PathBuf;

use crate::tts::{CommandTemplate, SynthesizerConfig};

pub const DEFAULT_COMMAND_TEMPLATE: &str = "python /models/scripts/infer.py \
     --text {text} \
     --output {output} \
     --reference_audio {reference_audio} \
     --speaker {speaker} \
     --seed {seed}";

pub const DEFAULT_WORKDIR: &str = "/models";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub synthesizer: SynthesizerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup, falling back to defaults for
    /// unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let template = lookup("INDEX_TTS_COMMAND_TEMPLATE")
            .unwrap_or_else(|| DEFAULT_COMMAND_TEMPLATE.to_string());

        let config = Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()?,
            synthesizer: SynthesizerConfig {
                template: CommandTemplate::parse(&template)?,
                workdir: PathBuf::from(
                    lookup("INDEX_TTS_WORKDIR").unwrap_or_else(|| DEFAULT_WORKDIR.to_string()),
                ),
            },
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.synthesizer.workdir, PathBuf::from("/models"));
        assert_eq!(
            config.synthesizer.template.placeholders(),
            vec!["text", "output", "reference_audio", "speaker", "seed"]
        );
        assert!(config
            .synthesizer
            .template
            .as_str()
            .starts_with("python /models/scripts/infer.py --text {text} --output {output}"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9001"),
            ("INDEX_TTS_COMMAND_TEMPLATE", "tts {text} -o {output}"),
            ("INDEX_TTS_WORKDIR", "/srv/tts"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.synthesizer.template.as_str(), "tts {text} -o {output}");
        assert_eq!(config.synthesizer.workdir, PathBuf::from("/srv/tts"));
    }

    #[test]
    fn test_invalid_port() {
        assert!(Config::from_lookup(lookup(&[("PORT", "not-a-port")])).is_err());
    }

    #[test]
    fn test_malformed_template_fails_startup() {
        let result = Config::from_lookup(lookup(&[("INDEX_TTS_COMMAND_TEMPLATE", "tts {text")]));
        assert!(result.is_err());
    }
}
