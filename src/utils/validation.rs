use crate::models::moderation::{ModerationLevel, ModerationResult};
use crate::services::moderation::ModerationEngine;
use crate::services::profanity::contains_profanity;
use crate::utils::error::{AppError, AppResult};

const MAX_NAME_LENGTH: usize = 64;
const MAX_NOTE_LENGTH: usize = 4000;
const MAX_COMMENT_LENGTH: usize = 1000;

fn is_printable_ascii(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii() && !c.is_ascii_control())
}

fn validate_name(value: &str, label: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", label)));
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters long",
            label, MAX_NAME_LENGTH
        )));
    }

    if contains_profanity(value) {
        return Err(AppError::Validation(format!(
            "{} contains inappropriate language",
            label
        )));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> AppResult<()> {
    if !is_printable_ascii(username) {
        return Err(AppError::Validation(
            "Username must contain only printable ASCII characters".to_string(),
        ));
    }

    validate_name(username, "Username")
}

pub fn validate_display_name(name: &str) -> AppResult<()> {
    if name.chars().any(char::is_control) {
        return Err(AppError::Validation(
            "Display name cannot contain control characters".to_string(),
        ));
    }

    validate_name(name, "Display name")
}

fn validate_length(content: &str, label: &str, max: usize) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", label)));
    }

    if content.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters long",
            label, max
        )));
    }

    Ok(())
}

pub fn validate_note_content(content: &str) -> AppResult<()> {
    validate_length(content, "Note content", MAX_NOTE_LENGTH)
}

pub fn validate_comment_content(content: &str) -> AppResult<()> {
    validate_length(content, "Comment content", MAX_COMMENT_LENGTH)
}

/// Moderates user content before it is stored. Extreme content is refused
/// outright; anything else comes back with `sanitized` ready to persist.
pub fn screen_submission(text: &str, level: ModerationLevel) -> AppResult<ModerationResult> {
    screen_with(&ModerationEngine::new(level), text)
}

pub fn screen_with(engine: &ModerationEngine, text: &str) -> AppResult<ModerationResult> {
    let result = engine.moderate(text);

    if let Some(severity) = result.severity.filter(|_| result.is_extreme) {
        tracing::warn!("Rejecting submission containing {} language", severity);
        return Err(AppError::Rejected { severity });
    }

    Ok(result)
}
