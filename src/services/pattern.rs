//! Obfuscation-tolerant matchers for library tokens.
//!
//! Every letter of a token becomes a character class built from
//! [`SUBSTITUTIONS`] (the letter plus its leet/homoglyph look-alikes), letters
//! are joined by a short run of optional non-letter noise, and a single
//! trailing plural character from the `s` class is allowed. Word boundaries
//! are checked explicitly on the surrounding characters rather than with `\b`.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::ops::Range;

use crate::utils::error::AppResult;

/// Letter -> look-alike characters. Matching is case-insensitive, so only
/// lowercase forms are listed.
pub static SUBSTITUTIONS: &[(char, &str)] = &[
    ('a', "4@^àáâãäåāąаα"),
    ('b', "86ßвб"),
    ('c', "(<[{¢©çćčс"),
    ('d', "ďđԁ"),
    ('e', "3€&ëèéêēęěеёє"),
    ('f', "ƒ"),
    ('g', "96ğģġ"),
    ('h', "#ĥħн"),
    ('i', "1!|ìíîïīįıії"),
    ('j', "ĵј"),
    ('k', "ķĸк"),
    ('l', "1|£łĺľļ"),
    ('m', "м"),
    ('n', "ñńňņп"),
    ('o', "0°öòóôõøōőоο"),
    ('p', "ρрþ"),
    ('q', "9ԛ"),
    ('r', "®ŕřг"),
    ('s', "5$§šśşѕ"),
    ('t', "7+†ťţт"),
    ('u', "üùúûūůűųµυ"),
    ('v', "ν"),
    ('w', "ŵωш"),
    ('x', "×%х"),
    ('y', "¥ýÿŷуў"),
    ('z', "2žźż"),
];

static SUBSTITUTION_MAP: Lazy<HashMap<char, &'static str>> =
    Lazy::new(|| SUBSTITUTIONS.iter().copied().collect());

/// Run of characters allowed between two letters of a token. Bounded so a
/// failed attempt on a long run of symbols or digits stops early.
const NOISE: &str = r"[^\p{Alphabetic}]{0,8}";

/// Repetitions accepted for each letter of a token (`fuuuck`).
const RUN: &str = "{1,16}";

/// A single non-letter, non-space symbol standing in for an interior letter.
const STAND_IN: &str = r"[^\p{Alphabetic}\s]";

/// Long phrases repeat the Unicode noise class many times.
const PATTERN_SIZE_LIMIT: usize = 32 * (1 << 20);

/// Tokens need at least this many letters before interior stand-ins apply.
const STAND_IN_MIN_LETTERS: usize = 4;

fn is_letter(c: char) -> bool {
    c.is_alphabetic()
}

fn char_class(c: char) -> String {
    let mut class = String::from("[");
    class.push_str(&regex::escape(&c.to_string()));
    if let Some(lookalikes) = SUBSTITUTION_MAP.get(&c) {
        for alt in lookalikes.chars() {
            class.push_str(&regex::escape(&alt.to_string()));
        }
    }
    class.push(']');
    class
}

/// Whether `c` belongs to the substitution class of `letter`, ignoring case.
fn in_class(letter: char, c: char) -> bool {
    let lookalikes = SUBSTITUTION_MAP.get(&letter).copied().unwrap_or_default();
    std::iter::once(letter).chain(lookalikes.chars()).any(|member| {
        c == member
            || c.to_lowercase().eq(member.to_lowercase())
            || c.to_uppercase().eq(member.to_uppercase())
    })
}

/// Every run of adjacent stand-ins must sit directly between two letters.
/// Stand-ins next to noise, digits or the span edges are rejected, which also
/// means a span using stand-ins holds at least two letters.
fn stand_ins_flanked(matched: &str, stand_ins: impl Iterator<Item = Range<usize>>) -> bool {
    stand_ins
        .coalesce(|a, b| {
            if a.end == b.start {
                Ok(a.start..b.end)
            } else {
                Err((a, b))
            }
        })
        .all(|run| {
            let before = matched[..run.start].chars().next_back();
            let after = matched[run.end..].chars().next();
            before.is_some_and(is_letter) && after.is_some_and(is_letter)
        })
}

fn ends_at_boundary(text: &str, end: usize) -> bool {
    text[end..].chars().next().is_none_or(|next| !is_letter(next))
}

/// Builds the anchored regex source for `token`, or `None` when the token
/// contains no letters and must never match.
pub fn pattern_source(token: &str) -> Option<String> {
    let token = token.trim().to_lowercase();

    // Letters and digits are significant, everything else is noise.
    let units: Vec<char> = token.chars().filter(|c| c.is_alphanumeric()).collect();
    let letter_count = units.iter().filter(|c| is_letter(**c)).count();
    if letter_count == 0 {
        return None;
    }

    let last = units.len() - 1;
    let fragments: Vec<String> = units
        .iter()
        .enumerate()
        .map(|(idx, &c)| {
            let class = format!("{}{}", char_class(c), RUN);
            let interior = idx != 0 && idx != last;
            if interior && is_letter(c) && letter_count >= STAND_IN_MIN_LETTERS {
                // Captured so the match can be checked for flanking letters.
                format!("(?:{}|({}))", class, STAND_IN)
            } else {
                class
            }
        })
        .collect();

    Some(format!(
        "^(?:{}){}?",
        fragments.join(NOISE),
        char_class('s')
    ))
}

/// Compiled obfuscation-tolerant matcher for one token.
#[derive(Debug, Clone)]
pub struct WordMatcher {
    token: String,
    first: char,
    regex: Regex,
}

impl WordMatcher {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Length of the token in characters, used for scan priority.
    pub fn priority_len(&self) -> usize {
        self.token.chars().count()
    }

    fn has_stand_ins(&self) -> bool {
        self.regex.captures_len() > 1
    }

    /// End of the anchored match at the start of `haystack`.
    fn anchored_end(&self, haystack: &str) -> Option<usize> {
        if !self.has_stand_ins() {
            return self.regex.find(haystack).map(|m| m.end());
        }

        let caps = self.regex.captures(haystack)?;
        let whole = caps.get(0)?;
        let stand_ins = caps.iter().skip(1).flatten().map(|m| m.range());
        stand_ins_flanked(whole.as_str(), stand_ins).then_some(whole.end())
    }

    /// Attempts a match starting exactly at byte offset `start`. Returns the
    /// end offset when the match is not followed by another letter.
    pub fn match_at(&self, text: &str, start: usize) -> Option<usize> {
        let rest = &text[start..];
        let end = self.anchored_end(rest)?;
        if ends_at_boundary(rest, end) {
            return Some(start + end);
        }

        // A plural character directly before a letter ("fuck$ake") belongs to
        // the next word. Retry with the singular form.
        let plural = rest[..end].chars().next_back().filter(|c| in_class('s', *c))?;
        let singular = end - plural.len_utf8();
        match self.anchored_end(&rest[..singular]) {
            Some(found) if found == singular && ends_at_boundary(rest, singular) => {
                Some(start + singular)
            }
            _ => None,
        }
    }

    /// Every non-overlapping occurrence of the token in `text`, left to
    /// right. Candidates must start at the beginning of the text or after a
    /// non-letter, on a character that can open the token.
    pub fn find_all(&self, text: &str) -> Vec<Range<usize>> {
        let mut found = Vec::new();
        let mut resume_at = 0;
        let mut prev: Option<char> = None;

        for (idx, c) in text.char_indices() {
            let at_boundary = prev.is_none_or(|p| !is_letter(p));
            prev = Some(c);

            if idx < resume_at || !at_boundary || !in_class(self.first, c) {
                continue;
            }

            if let Some(end) = self.match_at(text, idx) {
                found.push(idx..end);
                resume_at = end;
            }
        }

        found
    }
}

/// Compiles `token` into a matcher. Returns `Ok(None)` for tokens without
/// letters. Pure: the same token always yields the same matcher.
pub fn compile(token: &str) -> AppResult<Option<WordMatcher>> {
    let Some(source) = pattern_source(token) else {
        return Ok(None);
    };

    let token = token.trim().to_lowercase();
    let Some(first) = token.chars().find(|c| c.is_alphanumeric()) else {
        return Ok(None);
    };

    let regex = RegexBuilder::new(&source)
        .case_insensitive(true)
        .unicode(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()?;

    Ok(Some(WordMatcher {
        token,
        first,
        regex,
    }))
}
