//! Modal questions asked on behalf of a chat action.
//!
//! Replying to a post and editing a draft both need a line of text from the
//! user before anything is sent.  The session asks through [`Prompter`] and
//! awaits the answer the same way it awaits the backend.

use std::collections::VecDeque;

/// Something that can ask the user a question.
#[async_trait::async_trait]
pub trait Prompter: Send {
    /// Ask `question`, pre-filling the answer with `initial` when given.
    ///
    /// Returns `None` when the user dismisses the question.
    async fn ask(&mut self, question: &str, initial: Option<&str>) -> Option<String>;
}

/// A prompter that replays canned answers in order.
///
/// Useful for scripted sessions; once the answers run out every question
/// is treated as dismissed.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    questions: Vec<String>,
}

impl ScriptedPrompter {
    /// Creates a prompter answering with `answers`; `None` dismisses.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
            questions: Vec::new(),
        }
    }

    /// The questions asked so far.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }
}

#[async_trait::async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&mut self, question: &str, _initial: Option<&str>) -> Option<String> {
        self.questions.push(question.to_string());
        self.answers.pop_front().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_answers_in_order() {
        let mut prompter = ScriptedPrompter::new([Some("first"), None]);
        assert_eq!(prompter.ask("one?", None).await.as_deref(), Some("first"));
        assert_eq!(prompter.ask("two?", Some("x")).await, None);
        assert_eq!(prompter.ask("three?", None).await, None);
        assert_eq!(prompter.questions(), ["one?", "two?", "three?"]);
    }
}
