//! Chat command parsing.
//!
//! Commands are case-insensitive and whitespace-trimmed. `HELP` is a prefix
//! match (the rest of the line is the question); `SKIP` and `NEXT` must be
//! the whole message. Everything else is free text, which only some stages
//! accept.

/// A parsed chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask for a hint. Carries the full original message, which is what the
    /// hint service receives as the question.
    Help(String),
    Skip,
    Next,
    /// Anything else, trimmed. May be empty.
    Text(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let upper = trimmed.to_uppercase();

        if upper == "SKIP" {
            Command::Skip
        } else if upper == "NEXT" {
            Command::Next
        } else if upper.starts_with("HELP") {
            Command::Help(trimmed.to_string())
        } else {
            Command::Text(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tokens_ignore_case_and_whitespace() {
        assert_eq!(Command::parse("skip"), Command::Skip);
        assert_eq!(Command::parse("  SkIp \n"), Command::Skip);
        assert_eq!(Command::parse("next"), Command::Next);
        assert_eq!(Command::parse("NEXT"), Command::Next);
    }

    #[test]
    fn test_help_is_prefix_match_and_keeps_text() {
        assert_eq!(
            Command::parse("help how do I sort?"),
            Command::Help("help how do I sort?".to_string())
        );
        assert_eq!(Command::parse("HELP"), Command::Help("HELP".to_string()));
    }

    #[test]
    fn test_tokens_inside_sentences_are_text() {
        assert_eq!(
            Command::parse("skip this please"),
            Command::Text("skip this please".to_string())
        );
        assert_eq!(Command::parse("   "), Command::Text(String::new()));
    }
}
