pub mod censor;
pub mod moderation;
pub mod pattern;
pub mod profanity;
pub mod scanner;
pub mod severity_policy;
pub mod word_library;
