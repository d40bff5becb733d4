//! Obfuscation-tolerant content moderation.
//!
//! Words from a [`WordLibrary`] are compiled into matchers that tolerate
//! look-alike characters, spacing and repetition, scanned longest-first so
//! matches never overlap, and censored in place without shifting offsets.
//!
//! ```rust
//! use rmoderate::{ModerationLevel, quick_moderate};
//!
//! let result = quick_moderate("what the f u c k", ModerationLevel::Moderate);
//! assert!(!result.is_clean);
//! assert_eq!(result.sanitized, "what the *******");
//! ```

pub mod models;
pub mod services;
pub mod utils;

pub use models::moderation::{FilterStatus, Match, ModerationLevel, ModerationResult};
pub use models::word::{Severity, WordEntry};
pub use services::censor::CensorMode;
pub use services::moderation::{ModerationEngine, SharedModerator, quick_moderate};
pub use services::word_library::WordLibrary;
pub use utils::config::ModerationConfig;
pub use utils::error::{AppError, AppResult};
