//! Contract with the conversational feedback generator.
//!
//! The generator itself is external. This module assembles the prompt it
//! receives and owns the per-learner conversation state, so concurrent
//! sessions never share history.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::DiscrepancyError;
use crate::viseme::{self, table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// External model turning a conversation into coaching text.
pub trait FeedbackGenerator: Send + Sync {
    fn generate(&self, history: &[ChatTurn]) -> Result<String, DiscrepancyError>;
}

/// Prompt describing one attempt: the sentence, both phoneme strings, and
/// one entry per viseme token found in the error phonemes.
pub fn build_prompt(sentence: &str, expected: &str, observed: &str, errors: &[String]) -> String {
    let mut prompt = format!(
        "The user pronounced the sentence \"{sentence}\" as: {observed}.\n\
         The correct pronunciation should be: {expected}.\n"
    );
    for token in errors.iter().flat_map(|segment| viseme::tokenize(segment)) {
        // Writing to a String cannot fail.
        let _ = write!(
            prompt,
            "\n- Mistake: {}\n  → Description: {}",
            token.phoneme,
            table::description(token.viseme)
        );
    }
    prompt
}

/// Conversation history for one learner. The system prompt is always kept;
/// older exchanges are dropped once `limit` turns are exceeded.
#[derive(Debug, Clone)]
pub struct FeedbackSession {
    history: Vec<ChatTurn>,
    limit: usize,
}

impl FeedbackSession {
    pub fn new(system_prompt: impl Into<String>, limit: usize) -> Self {
        Self {
            history: vec![ChatTurn::new(ChatRole::System, system_prompt)],
            limit: limit.max(1),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.system_prompt.clone(), config.history_limit)
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Drop everything but the system prompt.
    pub fn reset(&mut self) {
        self.history.truncate(1);
    }

    /// Send one attempt to `generator` and record the exchange. On failure
    /// the history is left as it was.
    pub fn request(
        &mut self,
        generator: &dyn FeedbackGenerator,
        sentence: &str,
        expected: &str,
        observed: &str,
        errors: &[String],
    ) -> Result<String, DiscrepancyError> {
        let prompt = build_prompt(sentence, expected, observed, errors);
        self.history.push(ChatTurn::new(ChatRole::User, prompt));

        let reply = match generator.generate(&self.history) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "feedback: generator failed, discarding turn");
                self.history.pop();
                return Err(err);
            }
        };

        self.history
            .push(ChatTurn::new(ChatRole::Assistant, reply.clone()));
        self.trim();
        Ok(reply)
    }

    fn trim(&mut self) {
        if self.history.len() <= self.limit {
            return;
        }
        let excess = self.history.len() - self.limit;
        self.history.drain(1..1 + excess);
        tracing::debug!(
            dropped = excess,
            kept = self.history.len(),
            "feedback: trimmed session history"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct EchoGenerator {
        calls: AtomicUsize,
    }

    impl FeedbackGenerator for EchoGenerator {
        fn generate(&self, history: &[ChatTurn]) -> Result<String, DiscrepancyError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("reply {n} to {} turns", history.len()))
        }
    }

    struct FailingGenerator;

    impl FeedbackGenerator for FailingGenerator {
        fn generate(&self, _history: &[ChatTurn]) -> Result<String, DiscrepancyError> {
            Err(DiscrepancyError::invalid_input("model offline"))
        }
    }

    fn echo() -> EchoGenerator {
        EchoGenerator {
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn prompt_lists_each_error_viseme() {
        let prompt = build_prompt(
            "Anthony likes apple pie",
            "ænθənilaɪksæpəlpaɪ",
            "æmθənilaɪksæpəlpaɪ",
            &["n".to_string(), "tʃ".to_string()],
        );
        assert!(prompt.starts_with("The user pronounced the sentence \"Anthony likes apple pie\""));
        assert!(prompt.contains("as: æmθənilaɪksæpəlpaɪ."));
        assert!(prompt.contains("should be: ænθənilaɪksæpəlpaɪ."));
        assert!(prompt.contains("- Mistake: n\n  → Description: d, t, n"));
        assert!(prompt.contains("- Mistake: tʃ\n  → Description: ʃ, tʃ"));
        assert_eq!(prompt.matches("- Mistake:").count(), 2);
    }

    #[test]
    fn prompt_without_errors_has_no_mistakes() {
        let prompt = build_prompt("hi", "haɪ", "haɪ", &[]);
        assert!(!prompt.contains("Mistake"));
    }

    #[test]
    fn request_records_exchange() {
        let mut session = FeedbackSession::new("coach", 10);
        let generator = echo();
        let reply = session
            .request(&generator, "hi", "haɪ", "hi", &["aɪ".to_string()])
            .unwrap();
        assert_eq!(reply, "reply 0 to 2 turns");
        let roles: Vec<_> = session.history().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![ChatRole::System, ChatRole::User, ChatRole::Assistant]);
    }

    #[test]
    fn history_trimmed_to_limit_keeping_system_prompt() {
        let mut session = FeedbackSession::new("coach", 5);
        let generator = echo();
        for _ in 0..4 {
            session.request(&generator, "s", "a", "b", &[]).unwrap();
        }
        let history = session.history();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0], ChatTurn::new(ChatRole::System, "coach"));
        assert_eq!(history[4].content, "reply 3 to 6 turns");
    }

    #[test]
    fn failed_request_leaves_history_untouched() {
        let mut session = FeedbackSession::new("coach", 10);
        let err = session.request(&FailingGenerator, "s", "a", "b", &[]).unwrap_err();
        assert!(matches!(err, DiscrepancyError::InvalidInput { .. }));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn sessions_are_independent() {
        let generator = echo();
        let mut a = FeedbackSession::from_config(&EngineConfig::default());
        let b = FeedbackSession::from_config(&EngineConfig::default());
        a.request(&generator, "s", "a", "b", &[]).unwrap();
        assert_eq!(a.history().len(), 3);
        assert_eq!(b.history().len(), 1);
        a.reset();
        assert_eq!(a.history().len(), 1);
    }
}
