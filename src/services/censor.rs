use serde::{Deserialize, Serialize};

use crate::models::moderation::Match;
use crate::services::word_library::WordLibrary;

pub const DEFAULT_MASK: char = '*';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CensorMode {
    /// Each matched character becomes one mask character.
    #[default]
    Mask,
    /// Use the entry's first alternative word where one exists, mask otherwise.
    PreserveStructure,
}

/// Replaces every matched span of `text`. Spans are rewritten from the end of
/// the text backwards so offsets computed against the original stay valid.
pub fn censor<'a, F>(text: &str, matches: &[Match], mask_char: char, replacement_for: F) -> String
where
    F: Fn(&Match) -> Option<&'a str>,
{
    let mut ordered: Vec<&Match> = matches.iter().collect();
    ordered.sort_by(|a, b| b.position.cmp(&a.position));

    let mut sanitized = text.to_string();
    for m in ordered {
        let Some(original) = text.get(m.span()) else {
            tracing::warn!(
                "Ignoring match {}..{} outside of text bounds",
                m.position,
                m.end
            );
            continue;
        };

        let replacement = match replacement_for(m) {
            Some(word) => word.to_string(),
            None => std::iter::repeat_n(mask_char, original.chars().count()).collect(),
        };
        sanitized.replace_range(m.span(), &replacement);
    }

    sanitized
}

pub fn mask(text: &str, matches: &[Match], mask_char: char) -> String {
    censor(text, matches, mask_char, |_| None)
}

pub fn apply(
    text: &str,
    matches: &[Match],
    mask_char: char,
    mode: CensorMode,
    library: &WordLibrary,
) -> String {
    match mode {
        CensorMode::Mask => mask(text, matches, mask_char),
        CensorMode::PreserveStructure => censor(text, matches, mask_char, |m| {
            library
                .get(&m.canonical)
                .and_then(|entry| entry.first_alternative())
        }),
    }
}
