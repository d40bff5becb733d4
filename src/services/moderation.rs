use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::moderation::{ModerationLevel, ModerationResult};
use crate::models::word::WordEntry;
use crate::services::censor::{self, CensorMode, DEFAULT_MASK};
use crate::services::scanner::{self, CompiledLibrary};
use crate::services::severity_policy;
use crate::services::word_library::WordLibrary;
use crate::utils::error::{AppError, AppResult};

const DEFAULT_LIBRARY_JSON: &str = include_str!("../../data/word_library.json");

/// A word library together with its compiled matchers. Never mutated once
/// built; changes produce a new snapshot.
#[derive(Debug, Default)]
pub struct LibrarySnapshot {
    words: WordLibrary,
    compiled: CompiledLibrary,
}

impl LibrarySnapshot {
    pub fn build(words: WordLibrary) -> AppResult<Self> {
        let compiled = CompiledLibrary::compile(&words)?;
        Ok(Self { words, compiled })
    }

    fn rebuild_from(&self, words: WordLibrary) -> AppResult<Self> {
        let compiled = CompiledLibrary::recompile(&words, Some(&self.compiled))?;
        Ok(Self { words, compiled })
    }

    pub fn words(&self) -> &WordLibrary {
        &self.words
    }

    pub fn compiled(&self) -> &CompiledLibrary {
        &self.compiled
    }
}

static DEFAULT_SNAPSHOT: Lazy<Arc<LibrarySnapshot>> = Lazy::new(|| {
    match WordLibrary::from_json(DEFAULT_LIBRARY_JSON).and_then(LibrarySnapshot::build) {
        Ok(snapshot) => {
            tracing::info!(
                "Loaded default word library with {} entries",
                snapshot.words.len()
            );
            Arc::new(snapshot)
        }
        Err(e) => {
            tracing::error!("Failed to load default word library: {}", e);
            Arc::new(LibrarySnapshot::default())
        }
    }
});

pub fn default_library() -> &'static WordLibrary {
    &DEFAULT_SNAPSHOT.words
}

#[derive(Debug, Clone)]
pub struct ModerationEngine {
    level: ModerationLevel,
    mask_char: char,
    snapshot: Arc<LibrarySnapshot>,
}

impl Default for ModerationEngine {
    fn default() -> Self {
        Self::new(ModerationLevel::default())
    }
}

impl ModerationEngine {
    /// Engine backed by the bundled default library.
    pub fn new(level: ModerationLevel) -> Self {
        Self {
            level,
            mask_char: DEFAULT_MASK,
            snapshot: DEFAULT_SNAPSHOT.clone(),
        }
    }

    pub fn with_library(level: ModerationLevel, words: WordLibrary) -> AppResult<Self> {
        Ok(Self {
            level,
            mask_char: DEFAULT_MASK,
            snapshot: Arc::new(LibrarySnapshot::build(words)?),
        })
    }

    pub fn empty(level: ModerationLevel) -> Self {
        Self {
            level,
            mask_char: DEFAULT_MASK,
            snapshot: Arc::new(LibrarySnapshot::default()),
        }
    }

    pub fn level(&self) -> ModerationLevel {
        self.level
    }

    pub fn set_moderation_level(&mut self, level: ModerationLevel) {
        self.level = level;
    }

    pub fn mask_char(&self) -> char {
        self.mask_char
    }

    /// Letters are refused so masked output never spells a word.
    pub fn set_mask_char(&mut self, mask_char: char) -> AppResult<()> {
        if mask_char.is_alphabetic() || mask_char.is_whitespace() || mask_char.is_control() {
            return Err(AppError::Config(format!(
                "Mask character {:?} must be a visible non-letter",
                mask_char
            )));
        }
        self.mask_char = mask_char;
        Ok(())
    }

    pub fn library(&self) -> &WordLibrary {
        &self.snapshot.words
    }

    pub fn snapshot(&self) -> Arc<LibrarySnapshot> {
        self.snapshot.clone()
    }

    fn update_library<F>(&mut self, change: F) -> AppResult<()>
    where
        F: FnOnce(&mut WordLibrary) -> AppResult<()>,
    {
        let mut words = self.snapshot.words.clone();
        change(&mut words)?;
        self.snapshot = Arc::new(self.snapshot.rebuild_from(words)?);
        Ok(())
    }

    pub fn add_word(&mut self, entry: WordEntry) -> AppResult<()> {
        self.update_library(|words| words.insert(entry))
    }

    pub fn add_words<I>(&mut self, entries: I) -> AppResult<()>
    where
        I: IntoIterator<Item = WordEntry>,
    {
        self.update_library(|words| words.load(entries))
    }

    /// Returns whether the word was in the library.
    pub fn remove_word(&mut self, word: &str) -> AppResult<bool> {
        if !self.snapshot.words.contains(word) {
            return Ok(false);
        }
        self.update_library(|words| {
            words.remove(word);
            Ok(())
        })?;
        Ok(true)
    }

    pub fn clear_library(&mut self) {
        self.snapshot = Arc::new(LibrarySnapshot::default());
    }

    pub fn moderate(&self, text: &str) -> ModerationResult {
        self.run(text, CensorMode::Mask)
    }

    pub fn moderate_sentence(&self, text: &str, preserve_structure: bool) -> ModerationResult {
        let mode = if preserve_structure {
            CensorMode::PreserveStructure
        } else {
            CensorMode::Mask
        };
        self.run(text, mode)
    }

    pub fn is_clean(&self, text: &str) -> bool {
        self.moderate(text).is_clean
    }

    pub fn sanitize(&self, text: &str) -> String {
        self.moderate(text).sanitized
    }

    fn run(&self, text: &str, mode: CensorMode) -> ModerationResult {
        if text.is_empty() || !severity_policy::should_scan(self.level) {
            return ModerationResult::clean(text);
        }

        let matches = scanner::scan(text, &self.snapshot.compiled, self.level);
        if matches.is_empty() {
            return ModerationResult::clean(text);
        }

        let sanitized = censor::apply(text, &matches, self.mask_char, mode, &self.snapshot.words);
        let result = ModerationResult::from_matches(matches, sanitized);

        if result.is_extreme {
            tracing::warn!(
                "Extreme-severity language detected ({} matches)",
                result.matches.len()
            );
        } else {
            tracing::debug!(
                "Moderated text at level {}: {} matches",
                self.level,
                result.matches.len()
            );
        }

        result
    }
}

/// One-shot moderation against the default library.
pub fn quick_moderate(text: &str, level: ModerationLevel) -> ModerationResult {
    ModerationEngine::new(level).moderate(text)
}

/// Engine shared between threads. Moderation takes the read lock, library
/// and level changes take the write lock.
#[derive(Debug, Clone, Default)]
pub struct SharedModerator {
    inner: Arc<RwLock<ModerationEngine>>,
}

impl SharedModerator {
    pub fn new(engine: ModerationEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn moderate(&self, text: &str) -> ModerationResult {
        let engine = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        engine.moderate(text)
    }

    pub fn moderate_sentence(&self, text: &str, preserve_structure: bool) -> ModerationResult {
        let engine = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        engine.moderate_sentence(text, preserve_structure)
    }

    /// Cheap copy of the current engine; later updates do not affect it.
    pub fn engine(&self) -> ModerationEngine {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update<F, T>(&self, change: F) -> T
    where
        F: FnOnce(&mut ModerationEngine) -> T,
    {
        let mut engine = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        change(&mut engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::word::Severity;

    fn scenario_engine(level: ModerationLevel) -> ModerationEngine {
        let words = WordLibrary::from_entries(vec![
            WordEntry::new("damn", Severity::Mild),
            WordEntry::new("fuck", Severity::Severe),
        ])
        .unwrap();
        ModerationEngine::with_library(level, words).unwrap()
    }

    #[test]
    fn test_strict_scenario() {
        let text = "damn this is fu4k!ng bad";
        let result = scenario_engine(ModerationLevel::Strict).moderate(text);

        assert!(!result.is_clean);
        assert!(!result.is_extreme);
        assert_eq!(result.severity, Some(Severity::Severe));
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].word, "damn");
        assert_eq!(result.matches[0].position, 0);
        assert_eq!(result.matches[1].word, "fu4k");
        assert_eq!(result.matches[1].position, 13);
        assert_eq!(result.sanitized, "**** this is ****!ng bad");
        assert_eq!(result.sanitized.chars().count(), text.chars().count());
    }

    #[test]
    fn test_relaxed_scenario() {
        let result = scenario_engine(ModerationLevel::Relaxed).moderate("damn this is fu4k!ng bad");

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].canonical, "fuck");
        assert_eq!(result.severity, Some(Severity::Severe));
        assert_eq!(result.sanitized, "damn this is ****!ng bad");
    }

    #[test]
    fn test_off_is_identity() {
        let engine = scenario_engine(ModerationLevel::Off);
        for text in ["damn this is fu4k!ng bad", "", "FUCK", "clean text"] {
            let result = engine.moderate(text);
            assert!(result.is_clean);
            assert!(result.matches.is_empty());
            assert_eq!(result.sanitized, text);
        }
    }

    #[test]
    fn test_empty_input_is_clean() {
        let result = scenario_engine(ModerationLevel::Strict).moderate("");
        assert!(result.is_clean);
        assert_eq!(result.sanitized, "");
    }

    #[test]
    fn test_monotonic_levels() {
        let text = "damn, shit, fuck and kys";
        let words = WordLibrary::from_entries(vec![
            WordEntry::new("damn", Severity::Mild),
            WordEntry::new("shit", Severity::Moderate),
            WordEntry::new("fuck", Severity::Severe),
            WordEntry::new("kys", Severity::Extreme),
        ])
        .unwrap();
        let mut engine = ModerationEngine::with_library(ModerationLevel::Off, words).unwrap();

        let mut previous: Vec<usize> = Vec::new();
        for level in ModerationLevel::ALL {
            engine.set_moderation_level(level);
            let positions: Vec<usize> = engine
                .moderate(text)
                .matches
                .iter()
                .map(|m| m.position)
                .collect();
            assert!(previous.iter().all(|p| positions.contains(p)));
            assert!(positions.len() >= previous.len());
            previous = positions;
        }
        assert_eq!(previous.len(), 4);
    }

    #[test]
    fn test_case_insensitive_severity() {
        let engine = ModerationEngine::new(ModerationLevel::Strict);
        let upper = engine.moderate("SHIT");
        let lower = engine.moderate("shit");
        assert!(!upper.is_clean);
        assert_eq!(upper.severity, lower.severity);
        assert_eq!(upper.found_words.iter().next().map(String::as_str), Some("SHIT"));
    }

    #[test]
    fn test_sanitized_output_is_clean() {
        let engine = scenario_engine(ModerationLevel::Strict);
        let first = engine.moderate("damn this is fu4k!ng bad, f u c k");
        assert!(!first.is_clean);
        let second = engine.moderate(&first.sanitized);
        assert!(second.is_clean);
        assert_eq!(second.sanitized, first.sanitized);
    }

    #[test]
    fn test_preserve_structure() {
        let words = WordLibrary::from_entries(vec![
            WordEntry::new("damn", Severity::Mild).with_alternatives(["darn"]),
            WordEntry::new("fuck", Severity::Severe),
        ])
        .unwrap();
        let engine = ModerationEngine::with_library(ModerationLevel::Strict, words).unwrap();

        let result = engine.moderate_sentence("damn, fuck", true);
        assert_eq!(result.sanitized, "darn, ****");
        let masked = engine.moderate_sentence("damn, fuck", false);
        assert_eq!(masked.sanitized, "****, ****");
    }

    #[test]
    fn test_conveniences() {
        let engine = scenario_engine(ModerationLevel::Strict);
        assert!(engine.is_clean("what a lovely day"));
        assert!(!engine.is_clean("damn"));
        assert_eq!(engine.sanitize("oh damn"), "oh ****");
    }

    #[test]
    fn test_library_mutation() {
        let mut engine = ModerationEngine::empty(ModerationLevel::Strict);
        assert!(engine.is_clean("heck"));

        engine.add_word(WordEntry::new("heck", Severity::Mild)).unwrap();
        assert!(!engine.is_clean("heck"));

        let before = engine.clone();
        assert!(engine.remove_word("HECK").unwrap());
        assert!(!engine.remove_word("heck").unwrap());
        assert!(engine.is_clean("heck"));
        // Earlier copies keep their snapshot.
        assert!(!before.is_clean("heck"));

        engine
            .add_words(vec![
                WordEntry::new("crap", Severity::Mild),
                WordEntry::new("damn", Severity::Mild),
            ])
            .unwrap();
        assert_eq!(engine.library().len(), 2);

        engine.clear_library();
        assert!(engine.library().is_empty());
        assert!(engine.is_clean("crap damn"));
    }

    #[test]
    fn test_invalid_entry_leaves_library_unchanged() {
        let mut engine = scenario_engine(ModerationLevel::Strict);
        let err = engine.add_word(WordEntry::new("", Severity::Mild)).unwrap_err();
        assert!(matches!(err, AppError::Library(_)));
        assert_eq!(engine.library().len(), 2);
    }

    #[test]
    fn test_mask_char() {
        let mut engine = scenario_engine(ModerationLevel::Strict);
        engine.set_mask_char('#').unwrap();
        assert_eq!(engine.sanitize("damn"), "####");
        assert!(engine.set_mask_char('x').is_err());
        assert!(engine.set_mask_char(' ').is_err());
        assert_eq!(engine.mask_char(), '#');
    }

    #[test]
    fn test_default_library_loads() {
        let library = default_library();
        assert!(!library.is_empty());
        assert!(library.contains("fuck"));
        assert!(!DEFAULT_SNAPSHOT.compiled.is_empty());
    }

    #[test]
    fn test_quick_moderate() {
        let result = quick_moderate("what the f*ck", ModerationLevel::Moderate);
        assert!(!result.is_clean);
        assert_eq!(result.sanitized, "what the ****");

        let off = quick_moderate("what the f*ck", ModerationLevel::Off);
        assert_eq!(off.sanitized, "what the f*ck");
    }

    #[test]
    fn test_extreme_detected_at_every_scanning_level() {
        for level in [
            ModerationLevel::Relaxed,
            ModerationLevel::Moderate,
            ModerationLevel::Strict,
        ] {
            let result = quick_moderate("just kill yourself", level);
            assert!(result.is_extreme, "level {}", level);
        }
    }

    #[test]
    fn test_shared_moderator_across_threads() {
        let shared = SharedModerator::new(scenario_engine(ModerationLevel::Strict));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.moderate("damn it").sanitized)
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "**** it");
        }

        shared
            .update(|engine| engine.remove_word("damn"))
            .unwrap();
        assert!(shared.moderate("damn it").is_clean);
        assert_eq!(shared.engine().library().len(), 1);
    }

    #[test]
    fn test_plural_symbol_before_a_letter_is_censored() {
        let result = scenario_engine(ModerationLevel::Strict).moderate("fuck$ake, really");
        assert_eq!(result.sanitized, "****$ake, really");
        assert_eq!(result.matches[0].word, "fuck");
    }

    #[test]
    fn test_numbers_stay_clean() {
        for text in [
            "see issue #2021",
            "ticket #101",
            "fees (10p) each",
            "pdf, d 10k",
        ] {
            let result = quick_moderate(text, ModerationLevel::Strict);
            assert!(result.is_clean, "{} -> {}", text, result.sanitized);
            assert_eq!(result.sanitized, text);
        }
        assert_eq!(
            quick_moderate("f*ck, f**k and fu4k", ModerationLevel::Strict).sanitized,
            "****, **** and ****"
        );
    }

    #[test]
    fn test_long_digit_run_is_linear() {
        // Build the default snapshot outside the timed section.
        assert!(quick_moderate("warm up", ModerationLevel::Strict).is_clean);

        let digits = "5".repeat(50_000);
        let started = std::time::Instant::now();
        let result = quick_moderate(&digits, ModerationLevel::Strict);
        let elapsed = started.elapsed();

        assert!(result.is_clean);
        assert!(
            elapsed < std::time::Duration::from_secs(5),
            "took {:?}",
            elapsed
        );
    }
}
