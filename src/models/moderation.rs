use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::models::word::Severity;
use crate::utils::error::AppError;

/// Caller-selected strictness tier. Each level blocks a superset of the
/// severities blocked by the level below it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ModerationLevel {
    Off,
    Relaxed,
    #[default]
    Moderate,
    Strict,
}

impl ModerationLevel {
    pub const ALL: [ModerationLevel; 4] = [
        ModerationLevel::Off,
        ModerationLevel::Relaxed,
        ModerationLevel::Moderate,
        ModerationLevel::Strict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationLevel::Off => "off",
            ModerationLevel::Relaxed => "relaxed",
            ModerationLevel::Moderate => "moderate",
            ModerationLevel::Strict => "strict",
        }
    }
}

impl fmt::Display for ModerationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(ModerationLevel::Off),
            "relaxed" => Ok(ModerationLevel::Relaxed),
            "moderate" => Ok(ModerationLevel::Moderate),
            "strict" => Ok(ModerationLevel::Strict),
            other => Err(AppError::Validation(format!(
                "Unknown moderation level: {}",
                other
            ))),
        }
    }
}

/// A claimed span of the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// The text as it appeared in the input, not the canonical word.
    pub word: String,
    /// Library word this span was attributed to.
    pub canonical: String,
    pub severity: Severity,
    /// Byte offset of the span start in the original text.
    pub position: usize,
    /// Byte offset one past the span end.
    pub end: usize,
}

impl Match {
    pub fn span(&self) -> std::ops::Range<usize> {
        self.position..self.end
    }

    pub fn overlaps(&self, other: &Match) -> bool {
        self.position < other.end && other.position < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterStatus {
    Clean,
    Filtered,
    Rejected,
}

impl FilterStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FilterStatus::Clean => "clean",
            FilterStatus::Filtered => "filtered",
            FilterStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResult {
    pub is_clean: bool,
    pub is_extreme: bool,
    pub found_words: BTreeSet<String>,
    pub severity: Option<Severity>,
    pub sanitized: String,
    pub matches: Vec<Match>,
}

impl ModerationResult {
    pub fn clean(text: &str) -> Self {
        Self {
            is_clean: true,
            is_extreme: false,
            found_words: BTreeSet::new(),
            severity: None,
            sanitized: text.to_string(),
            matches: Vec::new(),
        }
    }

    /// Assembles a result from claimed matches (any order) and the censored text.
    pub fn from_matches(mut matches: Vec<Match>, sanitized: String) -> Self {
        matches.sort_by_key(|m| m.position);

        let severity = matches.iter().map(|m| m.severity).max();
        let found_words = matches.iter().map(|m| m.word.clone()).collect();

        Self {
            is_clean: matches.is_empty(),
            is_extreme: severity == Some(Severity::Extreme),
            found_words,
            severity,
            sanitized,
            matches,
        }
    }

    pub fn filter_status(&self) -> FilterStatus {
        if self.is_extreme {
            FilterStatus::Rejected
        } else if self.is_clean {
            FilterStatus::Clean
        } else {
            FilterStatus::Filtered
        }
    }

    pub fn censored_text(&self) -> Option<&str> {
        if self.is_clean {
            None
        } else {
            Some(&self.sanitized)
        }
    }
}
