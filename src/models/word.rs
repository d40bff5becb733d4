use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::AppError;

/// How objectionable a library word is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    /// Never allowed, whatever the moderation level.
    #[serde(rename = "wtf", alias = "extreme")]
    Extreme,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Mild,
        Severity::Moderate,
        Severity::Severe,
        Severity::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::Extreme => "wtf",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            "wtf" | "extreme" => Ok(Severity::Extreme),
            other => Err(AppError::Validation(format!("Unknown severity: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub severity: Severity,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub variants: Vec<String>,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, severity: Severity) -> Self {
        Self {
            word: word.into().trim().to_lowercase(),
            severity,
            alternatives: Vec::new(),
            variants: Vec::new(),
        }
    }

    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternatives = alternatives.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants
            .into_iter()
            .map(|v| v.into().trim().to_lowercase())
            .collect();
        self
    }

    /// Canonical word followed by every variant spelling.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.word.as_str()).chain(self.variants.iter().map(String::as_str))
    }

    pub fn first_alternative(&self) -> Option<&str> {
        self.alternatives
            .iter()
            .map(String::as_str)
            .find(|alt| !alt.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Mild < Severity::Moderate);
        assert!(Severity::Moderate < Severity::Severe);
        assert!(Severity::Severe < Severity::Extreme);
        assert_eq!(Severity::ALL.iter().max(), Some(&Severity::Extreme));
    }

    #[test]
    fn test_severity_string_forms_round_trip() {
        for severity in Severity::ALL {
            let parsed: Severity = severity.to_string().parse().unwrap();
            assert_eq!(parsed, severity);

            let json = serde_json::to_string(&severity).unwrap();
            assert_eq!(json, format!("\"{}\"", severity.as_str()));
            let back: Severity = serde_json::from_str(&json).unwrap();
            assert_eq!(back, severity);
        }
    }

    #[test]
    fn test_severity_extreme_alias() {
        assert_eq!("EXTREME".parse::<Severity>().unwrap(), Severity::Extreme);
        let parsed: Severity = serde_json::from_str("\"extreme\"").unwrap();
        assert_eq!(parsed, Severity::Extreme);
        assert!("nasty".parse::<Severity>().is_err());
    }

    #[test]
    fn test_word_entry_normalizes_case() {
        let entry = WordEntry::new("  DaMn ", Severity::Mild).with_variants(["DAYUM"]);
        assert_eq!(entry.word, "damn");
        assert_eq!(entry.tokens().collect::<Vec<_>>(), vec!["damn", "dayum"]);
    }

    #[test]
    fn test_word_entry_deserializes_without_optional_lists() {
        let entry: WordEntry =
            serde_json::from_str(r#"{"word": "heck", "severity": "mild"}"#).unwrap();
        assert!(entry.alternatives.is_empty());
        assert!(entry.variants.is_empty());
        assert_eq!(entry.first_alternative(), None);
    }
}
