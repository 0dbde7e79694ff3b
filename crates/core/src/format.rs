//! Output format selector

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the evaluator should hand its result back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Yaml,
    Toml,
    /// The evaluator's unprocessed text output
    Raw,
    /// The binary wire protocol
    Binary,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Json,
        ExportFormat::Yaml,
        ExportFormat::Toml,
        ExportFormat::Raw,
        ExportFormat::Binary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
            ExportFormat::Toml => "toml",
            ExportFormat::Raw => "raw",
            ExportFormat::Binary => "binary",
        }
    }

    /// Whether the result is interchange text rather than a wire buffer
    pub fn is_textual(self) -> bool {
        !matches!(self, ExportFormat::Binary)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "unsupported output format '{s}', expected one of: json, yaml, toml, raw, binary"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case("json", ExportFormat::Json)]
    #[case("YAML", ExportFormat::Yaml)]
    #[case(" toml ", ExportFormat::Toml)]
    #[case("raw", ExportFormat::Raw)]
    #[case("Binary", ExportFormat::Binary)]
    fn test_parse_known_formats(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[rstest]
    #[case("xml")]
    #[case("")]
    #[case("jsonl")]
    fn test_reject_unknown_formats(#[case] input: &str) {
        let err = input.parse::<ExportFormat>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("unsupported output format"));
    }

    #[test]
    fn test_only_binary_is_not_textual() {
        let textual: Vec<_> = ExportFormat::ALL
            .into_iter()
            .filter(|f| f.is_textual())
            .collect();
        assert_eq!(textual.len(), 4);
        assert!(!ExportFormat::Binary.is_textual());
    }
}
