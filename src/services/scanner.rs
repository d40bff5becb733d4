use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::Arc;

use crate::models::moderation::{Match, ModerationLevel};
use crate::models::word::Severity;
use crate::services::pattern::{self, WordMatcher};
use crate::services::severity_policy;
use crate::services::word_library::WordLibrary;
use crate::utils::error::AppResult;

#[derive(Debug, Clone)]
pub struct CompiledToken {
    pub matcher: Arc<WordMatcher>,
    pub canonical: String,
    pub severity: Severity,
}

/// Immutable compiled form of a [`WordLibrary`]: every canonical word and
/// variant with its matcher, in scan priority order.
#[derive(Debug, Clone, Default)]
pub struct CompiledLibrary {
    tokens: Vec<CompiledToken>,
}

impl CompiledLibrary {
    pub fn compile(library: &WordLibrary) -> AppResult<Self> {
        Self::recompile(library, None)
    }

    /// Compiles `library`, reusing matchers from `previous` for tokens that
    /// are already compiled there.
    pub fn recompile(library: &WordLibrary, previous: Option<&CompiledLibrary>) -> AppResult<Self> {
        let cache: HashMap<&str, Arc<WordMatcher>> = previous
            .map(|p| {
                p.tokens
                    .iter()
                    .map(|t| (t.matcher.token(), t.matcher.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let mut tokens = Vec::new();
        let mut compiled_count = 0;
        let mut reused_count = 0;

        for entry in library.iter() {
            for token in entry.tokens().unique() {
                let matcher = match cache.get(token) {
                    Some(existing) => {
                        reused_count += 1;
                        existing.clone()
                    }
                    None => match pattern::compile(token)? {
                        Some(matcher) => {
                            compiled_count += 1;
                            Arc::new(matcher)
                        }
                        None => {
                            tracing::warn!(
                                "Skipping token without letters for entry {}",
                                entry.word
                            );
                            continue;
                        }
                    },
                };

                tokens.push(CompiledToken {
                    matcher,
                    canonical: entry.word.clone(),
                    severity: entry.severity,
                });
            }
        }

        // Longest tokens first so they claim spans before their substrings.
        tokens.sort_by(|a, b| {
            b.matcher
                .priority_len()
                .cmp(&a.matcher.priority_len())
                .then_with(|| b.severity.cmp(&a.severity))
                .then_with(|| a.matcher.token().cmp(b.matcher.token()))
                .then_with(|| a.canonical.cmp(&b.canonical))
        });

        tracing::info!(
            "Compiled word library: {} entries, {} tokens ({} compiled, {} reused)",
            library.len(),
            tokens.len(),
            compiled_count,
            reused_count
        );

        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[CompiledToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens whose severity `level` blocks, in priority order.
    pub fn blockable(&self, level: ModerationLevel) -> impl Iterator<Item = &CompiledToken> {
        self.tokens
            .iter()
            .filter(move |t| severity_policy::is_blocked(level, t.severity))
    }
}

/// Disjoint claimed `[start, end)` byte ranges keyed by start.
#[derive(Debug, Default)]
pub struct ClaimedSpans {
    spans: BTreeMap<usize, usize>,
}

impl ClaimedSpans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        // With disjoint spans, only the span starting last before `range.end`
        // can overlap.
        self.spans
            .range(..range.end)
            .next_back()
            .is_some_and(|(_, &end)| end > range.start)
    }

    /// Claims `range` unless it overlaps an existing claim.
    pub fn try_claim(&mut self, range: &Range<usize>) -> bool {
        if range.is_empty() || self.overlaps(range) {
            return false;
        }
        self.spans.insert(range.start, range.end);
        true
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Runs every blockable token over `text`. Earlier (longer) tokens claim
/// their spans first; later candidates overlapping a claim are dropped.
/// Returned matches are in claim order.
pub fn scan(text: &str, library: &CompiledLibrary, level: ModerationLevel) -> Vec<Match> {
    let mut claimed = ClaimedSpans::new();
    let mut matches = Vec::new();

    if text.is_empty() || !severity_policy::should_scan(level) {
        return matches;
    }

    for token in library.blockable(level) {
        for range in token.matcher.find_all(text) {
            if !claimed.try_claim(&range) {
                tracing::debug!(
                    "Dropping overlapping candidate for {} at {}..{}",
                    token.canonical,
                    range.start,
                    range.end
                );
                continue;
            }

            tracing::debug!(
                "Matched {} ({}) at {}..{}",
                token.canonical,
                token.severity,
                range.start,
                range.end
            );
            matches.push(Match {
                word: text[range.clone()].to_string(),
                canonical: token.canonical.clone(),
                severity: token.severity,
                position: range.start,
                end: range.end,
            });
        }
    }

    matches
}
