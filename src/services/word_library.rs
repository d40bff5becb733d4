use std::collections::BTreeMap;
use std::path::Path;

use crate::models::word::WordEntry;
use crate::utils::error::{AppError, AppResult};

/// Canonical word -> entry. Keys are lowercased; a later entry with the same
/// key replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordLibrary {
    entries: BTreeMap<String, WordEntry>,
}

fn normalize(mut entry: WordEntry) -> AppResult<WordEntry> {
    entry.word = entry.word.trim().to_lowercase();
    if entry.word.is_empty() {
        return Err(AppError::Library(
            "Word entries must have a non-empty word".to_string(),
        ));
    }

    entry.variants = entry
        .variants
        .into_iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty() && *v != entry.word)
        .collect();
    entry.alternatives.retain(|alt| !alt.trim().is_empty());

    Ok(entry)
}

impl WordLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = WordEntry>,
    {
        let mut library = Self::new();
        library.load(entries)?;
        Ok(library)
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        let entries: Vec<WordEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let library = Self::from_json(&json)?;
        tracing::info!(
            "Loaded {} word entries from {}",
            library.len(),
            path.display()
        );
        Ok(library)
    }

    /// Merges `entries` into the library. Nothing is inserted if any entry
    /// is invalid.
    pub fn load<I>(&mut self, entries: I) -> AppResult<()>
    where
        I: IntoIterator<Item = WordEntry>,
    {
        let normalized = entries
            .into_iter()
            .map(normalize)
            .collect::<AppResult<Vec<_>>>()?;

        for entry in normalized {
            self.entries.insert(entry.word.clone(), entry);
        }

        Ok(())
    }

    pub fn insert(&mut self, entry: WordEntry) -> AppResult<()> {
        self.load(std::iter::once(entry))
    }

    pub fn remove(&mut self, word: &str) -> Option<WordEntry> {
        self.entries.remove(&word.trim().to_lowercase())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, word: &str) -> Option<&WordEntry> {
        self.entries.get(&word.trim().to_lowercase())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordEntry> {
        self.entries.values()
    }

    pub fn export(&self) -> Vec<WordEntry> {
        self.entries.values().cloned().collect()
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }
}
