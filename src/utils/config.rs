use std::path::PathBuf;

use crate::models::moderation::ModerationLevel;
use crate::services::censor::DEFAULT_MASK;
use crate::services::moderation::ModerationEngine;
use crate::services::word_library::WordLibrary;
use crate::utils::error::{AppError, AppResult};

pub const LEVEL_VAR: &str = "MODERATION_LEVEL";
pub const MASK_CHAR_VAR: &str = "MODERATION_MASK_CHAR";
pub const WORD_LIBRARY_VAR: &str = "MODERATION_WORD_LIBRARY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationConfig {
    pub level: ModerationLevel,
    pub mask_char: char,
    pub library_path: Option<PathBuf>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            level: ModerationLevel::default(),
            mask_char: DEFAULT_MASK,
            library_path: None,
        }
    }
}

impl ModerationConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Unset or blank values fall back to
    /// the defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(level) = read(LEVEL_VAR) {
            config.level = level.parse().map_err(|_| {
                AppError::Config(format!("{} has unknown level {:?}", LEVEL_VAR, level))
            })?;
        }

        if let Some(mask) = read(MASK_CHAR_VAR) {
            let mut chars = mask.chars();
            config.mask_char = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(AppError::Config(format!(
                        "{} must be a single character, got {:?}",
                        MASK_CHAR_VAR, mask
                    )));
                }
            };
        }

        config.library_path = read(WORD_LIBRARY_VAR).map(PathBuf::from);

        Ok(config)
    }

    pub fn build_engine(&self) -> AppResult<ModerationEngine> {
        let mut engine = match &self.library_path {
            Some(path) => ModerationEngine::with_library(self.level, WordLibrary::from_path(path)?)?,
            None => ModerationEngine::new(self.level),
        };
        engine.set_mask_char(self.mask_char)?;

        tracing::info!(
            "Moderation engine ready: level={}, {} library entries",
            engine.level(),
            engine.library().len()
        );

        Ok(engine)
    }
}
