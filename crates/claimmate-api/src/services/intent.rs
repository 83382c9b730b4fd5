//! Detecting when a chat message asks the assistant to act.

/// Phrases that mean "send something on my behalf".
pub const ACTION_KEYWORDS: [&str; 8] = [
    "send email",
    "email them",
    "contact them",
    "reach out",
    "follow up",
    "send a message",
    "write to them",
    "notify them",
];

pub trait IntentClassifier: Send + Sync {
    /// True when `text` requests an outbound action.
    fn detects_action(&self, text: &str) -> bool;
}

/// Case-insensitive substring match against [`ACTION_KEYWORDS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntentClassifier;

impl IntentClassifier for KeywordIntentClassifier {
    fn detects_action(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        ACTION_KEYWORDS.iter().any(|kw| lowered.contains(kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_keywords_case_insensitive() {
        let classifier = KeywordIntentClassifier;
        assert!(classifier.detects_action("Please SEND EMAIL to the insurer"));
        assert!(classifier.detects_action("can you reach out to them?"));
        assert!(classifier.detects_action("Follow up with Acme"));
    }

    #[test]
    fn test_ignores_other_text() {
        let classifier = KeywordIntentClassifier;
        assert!(!classifier.detects_action("what is the status?"));
        assert!(!classifier.detects_action("emailing is hard"));
        assert!(!classifier.detects_action(""));
    }
}
