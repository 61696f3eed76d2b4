use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Missing placeholder '{0}' in command template")]
    MissingPlaceholder(String),

    #[error("Malformed command template: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

lazy_static! {
    static ref BRACE_REGEX: Regex = Regex::new(
        r"(?x)
        \{\{|                 # Escaped opening brace
        \}\}|                 # Escaped closing brace
        \{([^{}]*)\}|         # Placeholder {name}
        [{}]                  # Unbalanced brace
        "
    )
    .unwrap();
    static ref NAME_REGEX: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref SAFE_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_@%+=:,./-]+$").unwrap();
}

/// A shell command line with `{name}` placeholders, parsed once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl CommandTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last_end = 0;

        for cap in BRACE_REGEX.captures_iter(source) {
            let m = cap.get(0).unwrap();
            literal.push_str(&source[last_end..m.start()]);
            last_end = m.end();

            match m.as_str() {
                "{{" => literal.push('{'),
                "}}" => literal.push('}'),
                "{" | "}" => {
                    return Err(TemplateError::Malformed(format!(
                        "single '{}' at byte {}",
                        m.as_str(),
                        m.start()
                    )))
                }
                _ => {
                    let name = cap.get(1).map(|n| n.as_str()).unwrap_or_default();
                    if !NAME_REGEX.is_match(name) {
                        return Err(TemplateError::Malformed(format!(
                            "invalid placeholder '{{{}}}'",
                            name
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name.to_string()));
                }
            }
        }

        literal.push_str(&source[last_end..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Distinct placeholder names, in order of first use.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute every placeholder with its shell-quoted value.
    ///
    /// Empty values are substituted as nothing at all rather than `''`, so a
    /// template like `--speaker {speaker}` degrades to a bare flag. The result
    /// is trimmed. Nothing is returned unless every placeholder resolved.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        let mut command = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => command.push_str(text),
                Segment::Placeholder(name) => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingPlaceholder(name.clone()))?;
                    if !value.is_empty() {
                        command.push_str(&quote(value));
                    }
                }
            }
        }

        Ok(command.trim().to_string())
    }
}

/// Quote a value so the shell reads it as exactly one literal word.
pub fn quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    if SAFE_REGEX.is_match(value) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_placeholders() {
        let template =
            CommandTemplate::parse("infer --text {text} --out {output} --again {text}").unwrap();
        assert_eq!(template.placeholders(), vec!["text", "output"]);
    }

    #[test]
    fn test_parse_no_placeholders() {
        let template = CommandTemplate::parse("exit 2").unwrap();
        assert!(template.placeholders().is_empty());
        assert_eq!(template.render(&HashMap::new()).unwrap(), "exit 2");
    }

    #[test]
    fn test_escaped_braces() {
        let template = CommandTemplate::parse("echo {{literal}} {text}").unwrap();
        assert_eq!(template.placeholders(), vec!["text"]);
        let rendered = template.render(&values(&[("text", "hi")])).unwrap();
        assert_eq!(rendered, "echo {literal} hi");
    }

    #[test]
    fn test_malformed_single_brace() {
        assert!(matches!(
            CommandTemplate::parse("echo {text"),
            Err(TemplateError::Malformed(_))
        ));
        assert!(matches!(
            CommandTemplate::parse("echo text}"),
            Err(TemplateError::Malformed(_))
        ));
    }

    #[test]
    fn test_malformed_placeholder_name() {
        assert!(matches!(
            CommandTemplate::parse("echo {}"),
            Err(TemplateError::Malformed(_))
        ));
        assert!(matches!(
            CommandTemplate::parse("echo {bad name}"),
            Err(TemplateError::Malformed(_))
        ));
    }

    #[test]
    fn test_render_missing_placeholder() {
        let template = CommandTemplate::parse("infer {text} {voice}").unwrap();
        let err = template.render(&values(&[("text", "hi")])).unwrap_err();
        assert_eq!(err, TemplateError::MissingPlaceholder("voice".to_string()));
        assert_eq!(
            err.to_string(),
            "Missing placeholder 'voice' in command template"
        );
    }

    #[test]
    fn test_render_empty_value_is_bare() {
        let template = CommandTemplate::parse("infer --speaker {speaker} --seed {seed}").unwrap();
        let rendered = template
            .render(&values(&[("speaker", ""), ("seed", "")]))
            .unwrap();
        assert_eq!(rendered, "infer --speaker  --seed");
    }

    #[test]
    fn test_render_trims() {
        let template = CommandTemplate::parse("  {text}  ").unwrap();
        assert_eq!(template.render(&values(&[("text", "")])).unwrap(), "");
    }

    #[test]
    fn test_render_ignores_unused_values() {
        let template = CommandTemplate::parse("infer {text}").unwrap();
        let rendered = template
            .render(&values(&[("text", "hi"), ("unused", "x")]))
            .unwrap();
        assert_eq!(rendered, "infer hi");
    }

    #[test]
    fn test_quote_safe() {
        assert_eq!(quote("hello"), "hello");
        assert_eq!(quote("/tmp/abc/output.wav"), "/tmp/abc/output.wav");
        assert_eq!(quote("42"), "42");
    }

    #[test]
    fn test_quote_metacharacters() {
        assert_eq!(quote("hello world"), "'hello world'");
        assert_eq!(quote("a;rm -rf /"), "'a;rm -rf /'");
        assert_eq!(quote("$HOME"), "'$HOME'");
        assert_eq!(quote("it's"), r#"'it'"'"'s'"#);
        assert_eq!(quote(""), "''");
    }
}
