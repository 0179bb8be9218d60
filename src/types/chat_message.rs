use time::OffsetDateTime;

use crate::error::Error;
use crate::types::{ChatResponse, Post};
use crate::utils::time::now;

/// Text of the assistant message every session starts with.
pub const GREETING: &str =
    "Hi, I'm your Reddit Search Agent. Try searching, posting, or scheduling on Reddit!";

/// Who wrote a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MessageRole {
    /// The person at the keyboard.
    User,

    /// The agent backend.
    Assistant,
}

/// Delivery state of a message.  Responses are not streamed, so every
/// message is complete once it exists.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum MessageStatus {
    /// The message is fully formed.
    #[default]
    Complete,
}

/// One turn in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: MessageRole,
    /// The display text.
    pub content: String,
    /// Search results or a generated draft.
    pub results: Option<Vec<Post>>,
    /// Ids of posts created by the command.
    pub post_ids: Option<Vec<String>>,
    /// Artifact served by the backend under `/files/`.
    pub download_file: Option<String>,
    /// Help text from the agent.
    pub instructions: Option<String>,
    /// The agent's log lines.
    pub logs: Option<Vec<String>>,
    timestamp: OffsetDateTime,
    status: MessageStatus,
}

impl ChatMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            results: None,
            post_ids: None,
            download_file: None,
            instructions: None,
            logs: None,
            timestamp: now(),
            status: MessageStatus::Complete,
        }
    }

    /// A message typed by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// A plain assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// The greeting every session opens with.
    pub fn greeting() -> Self {
        Self::assistant(GREETING)
    }

    /// The assistant message reporting a failed request.
    pub fn error(err: &Error) -> Self {
        Self::assistant(format!("Error: {err}"))
    }

    /// The assistant message carrying a backend response.
    pub fn from_response(response: ChatResponse) -> Self {
        let ChatResponse {
            message,
            results,
            post_ids,
            download_file,
            instructions,
            logs,
        } = response;
        Self {
            results,
            post_ids,
            download_file,
            instructions,
            logs,
            ..Self::assistant(message)
        }
    }

    /// When the message was created.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// The delivery state.
    pub fn status(&self) -> MessageStatus {
        self.status
    }

    /// True when the first result is a generated draft.
    pub fn is_draft(&self) -> bool {
        self.results
            .as_ref()
            .and_then(|results| results.first())
            .is_some_and(Post::is_drafted)
    }
}

impl From<ChatResponse> for ChatMessage {
    fn from(response: ChatResponse) -> Self {
        Self::from_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DraftedPost, RetrievedPost};

    #[test]
    fn greeting_is_a_complete_assistant_message() {
        let greeting = ChatMessage::greeting();
        assert_eq!(greeting.role, MessageRole::Assistant);
        assert_eq!(greeting.content, GREETING);
        assert_eq!(greeting.status(), MessageStatus::Complete);
        assert!(greeting.results.is_none());
    }

    #[test]
    fn error_messages_are_prefixed() {
        let message = ChatMessage::error(&Error::api(502, "Bad Gateway"));
        assert!(message.content.starts_with("Error:"));
        assert_eq!(message.role, MessageRole::Assistant);
    }

    #[test]
    fn response_fields_are_carried_over() {
        let response = ChatResponse::new("Post created").with_post_ids(vec!["abc".to_string()]);
        let message = ChatMessage::from(response);
        assert_eq!(message.content, "Post created");
        assert_eq!(message.post_ids, Some(vec!["abc".to_string()]));
        assert!(!message.is_draft());
    }

    #[test]
    fn draft_detection_looks_at_first_result() {
        let draft = ChatMessage::from(
            ChatResponse::new("Generated post preview")
                .with_results(vec![DraftedPost::new("startups", "T", "body").into()]),
        );
        assert!(draft.is_draft());

        let mixed = ChatMessage::from(ChatResponse::new("Search results").with_results(vec![
            RetrievedPost::new("A", "startups").into(),
            DraftedPost::new("startups", "T", "body").into(),
        ]));
        assert!(!mixed.is_draft());

        let empty = ChatMessage::from(ChatResponse::new("Search results").with_results(vec![]));
        assert!(!empty.is_draft());
    }
}
