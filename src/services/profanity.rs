use crate::models::moderation::ModerationLevel;
use crate::services::moderation::quick_moderate;

pub fn filter_profanity(text: &str) -> (String, bool) {
    let result = quick_moderate(text, ModerationLevel::Strict);

    if result.is_clean {
        (text.to_string(), false)
    } else {
        (result.sanitized, true)
    }
}

pub fn contains_profanity(text: &str) -> bool {
    !quick_moderate(text, ModerationLevel::Strict).is_clean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_profanity() {
        let (filtered, has_profanity) = filter_profanity("This is a fuck test");
        assert!(has_profanity);
        assert_eq!(filtered, "This is a **** test");
    }

    #[test]
    fn test_no_profanity() {
        let (filtered, has_profanity) = filter_profanity("This is a clean message");
        assert!(!has_profanity);
        assert_eq!(filtered, "This is a clean message");
    }

    #[test]
    fn test_contains_profanity() {
        assert!(contains_profanity("what the fuck"));
        assert!(contains_profanity("what the f.u.c.k"));
        assert!(!contains_profanity("hello world"));
    }
}
