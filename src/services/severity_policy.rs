use crate::models::moderation::ModerationLevel;
use crate::models::word::Severity;

/// Severities blocked at `level`. `Off` blocks nothing.
pub fn blocked_severities(level: ModerationLevel) -> &'static [Severity] {
    match level {
        ModerationLevel::Off => &[],
        ModerationLevel::Relaxed => &[Severity::Severe, Severity::Extreme],
        ModerationLevel::Moderate => &[Severity::Moderate, Severity::Severe, Severity::Extreme],
        ModerationLevel::Strict => &Severity::ALL,
    }
}

pub fn is_blocked(level: ModerationLevel, severity: Severity) -> bool {
    blocked_severities(level).contains(&severity)
}

/// `Off` skips scanning entirely.
pub fn should_scan(level: ModerationLevel) -> bool {
    level != ModerationLevel::Off
}
