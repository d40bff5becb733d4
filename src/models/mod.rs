pub mod moderation;
pub mod word;
