//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! with the agent backend: the message list, the pending input line and the
//! flags the interface derives its affordances from.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use time::UtcOffset;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::chat::prompter::Prompter;
use crate::client::Backend;
use crate::error::Result;
use crate::observability::{
    SESSION_CANCELLED, SESSION_DRAFTS_RETRACTED, SESSION_FAILURES, SESSION_SENDS,
};
use crate::types::{ChatMessage, ChatRequest, DraftedPost, MessageRole, Post};
use crate::utils::time::local_offset;

/// Example commands offered before the first user turn.
pub const SUGGESTIONS: [&str; 6] = [
    "Search for AI agents in startups",
    "Generate post for startups about AI agents",
    "Post to startups with title AI Ideas text: Discuss AI",
    "Reply to post 1jfxanf with Great idea!",
    "Schedule generated post for startups about AI agents every 10 minutes",
    "Post to test with poll title Test Poll options Yes,No duration 3",
];

/// What became of a call to [`ChatSession::send_message`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The input was empty after trimming; nothing changed.
    Ignored,
    /// Another request is outstanding; nothing changed.
    Busy,
    /// The backend answered and its response was appended.
    Completed,
    /// The request failed and an error message was appended.
    Failed,
    /// The session was shut down before the backend answered.
    Cancelled,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The number of messages in the conversation, greeting included.
    pub message_count: usize,
    /// The number of messages typed by the user.
    pub user_turns: usize,
    /// Requests sent to the backend since the session started.
    pub total_requests: u64,
    /// Requests that ended in an error message.
    pub total_failures: u64,
    /// Whether agent logs are shown.
    pub show_logs: bool,
}

/// Raises the in-flight flag for as long as it lives.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A chat session with the agent backend.
///
/// Messages are only ever appended, except by [`clear_session`] and
/// [`cancel_proposal`].  The first message is always the greeting.
///
/// [`clear_session`]: ChatSession::clear_session
/// [`cancel_proposal`]: ChatSession::cancel_proposal
pub struct ChatSession<B: Backend> {
    backend: B,
    messages: Vec<ChatMessage>,
    pending_input: String,
    in_flight: Arc<AtomicBool>,
    show_suggestions: bool,
    show_logs: bool,
    utc_offset: UtcOffset,
    lifetime: CancellationToken,
    request_count: u64,
    failure_count: u64,
}

impl<B: Backend> ChatSession<B> {
    /// Creates a session that opens with the greeting.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            messages: vec![ChatMessage::greeting()],
            pending_input: String::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
            show_suggestions: true,
            show_logs: false,
            utc_offset: local_offset(),
            lifetime: CancellationToken::new(),
            request_count: 0,
            failure_count: 0,
        }
    }

    /// Sends `text` to the backend and appends the exchange.
    ///
    /// One user message is appended before the request and one assistant
    /// message after it, carrying either the response or `"Error: ..."`.
    /// Failures never escape; each message gets exactly one attempt.
    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Ignored;
        }
        if self.lifetime.is_cancelled() {
            return SendOutcome::Cancelled;
        }
        let Some(_in_flight) = InFlightGuard::acquire(&self.in_flight) else {
            return SendOutcome::Busy;
        };

        let request =
            ChatRequest::new(text).with_search_results(self.latest_results().map(<[Post]>::to_vec));
        self.messages.push(ChatMessage::user(text));
        self.pending_input.clear();
        self.show_suggestions = false;
        self.request_count += 1;
        SESSION_SENDS.click();
        tracing::debug!(prompt = %text, "sending message");

        let result = tokio::select! {
            biased;
            _ = self.lifetime.cancelled() => None,
            result = self.backend.chat(&request) => Some(result),
        };

        match result {
            Some(Ok(response)) => {
                self.messages.push(ChatMessage::from_response(response));
                SendOutcome::Completed
            }
            Some(Err(err)) => {
                tracing::info!(error = %err, "message failed");
                SESSION_FAILURES.click();
                self.failure_count += 1;
                self.messages.push(ChatMessage::error(&err));
                SendOutcome::Failed
            }
            None => {
                tracing::debug!("session shut down with a request outstanding");
                SESSION_CANCELLED.click();
                SendOutcome::Cancelled
            }
        }
    }

    /// Sends whatever is in the pending input line.
    pub async fn send_pending(&mut self) -> SendOutcome {
        let text = self.pending_input.clone();
        self.send_message(&text).await
    }

    /// Copies a suggestion into the input line without sending it.
    ///
    /// Only possible while the suggestions are showing.  Returns whether the
    /// suggestion was taken.
    pub fn select_suggestion(&mut self, text: &str) -> bool {
        if !self.suggestions_visible() {
            return false;
        }
        self.pending_input = text.to_string();
        self.show_suggestions = false;
        true
    }

    /// Asks for reply text and sends `"reply to post <id> with <text>"`.
    ///
    /// A dismissed or empty answer sends nothing.
    pub async fn request_reply(
        &mut self,
        post_id: &str,
        prompter: &mut dyn Prompter,
    ) -> SendOutcome {
        let answer = prompter
            .ask(&format!("Enter reply for post {post_id}:"), None)
            .await;
        let Some(reply) = answer.filter(|reply| !reply.is_empty()) else {
            return SendOutcome::Ignored;
        };
        self.pending_input = format!("reply to post {post_id} with {reply}");
        self.send_pending().await
    }

    /// Asks the backend to publish a drafted post as-is.
    pub async fn propose_post(&mut self, subreddit: &str, title: &str, text: &str) -> SendOutcome {
        self.pending_input = format!("post generated for {subreddit} with title {title} text: {text}");
        self.send_pending().await
    }

    /// Lets the user rewrite a draft's title and text, then publishes it.
    ///
    /// Empty or dismissed answers keep the drafted values.
    pub async fn edit_proposal(
        &mut self,
        subreddit: &str,
        title: &str,
        text: &str,
        prompter: &mut dyn Prompter,
    ) -> SendOutcome {
        let title = prompter
            .ask("Edit title:", Some(title))
            .await
            .filter(|answer| !answer.is_empty())
            .unwrap_or_else(|| title.to_string());
        let text = prompter
            .ask("Edit text:", Some(text))
            .await
            .filter(|answer| !answer.is_empty())
            .unwrap_or_else(|| text.to_string());
        self.propose_post(subreddit, &title, &text).await
    }

    /// Removes every message whose first result is a drafted post.
    ///
    /// Returns the number of messages removed.
    pub fn cancel_proposal(&mut self) -> usize {
        let before = self.messages.len();
        self.messages.retain(|message| !message.is_draft());
        let removed = before - self.messages.len();
        SESSION_DRAFTS_RETRACTED.count(removed as u64);
        removed
    }

    /// Drops everything but the greeting.
    pub fn clear_session(&mut self) {
        self.messages.truncate(1);
    }

    /// The conversation, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// True while a request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// A handle on the in-flight flag for observers such as a loading
    /// indicator.
    pub fn in_flight_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.in_flight)
    }

    /// True while the suggestion chips should be shown.
    pub fn suggestions_visible(&self) -> bool {
        self.show_suggestions && self.messages.len() == 1
    }

    /// The example commands.
    pub fn suggestions(&self) -> &'static [&'static str] {
        &SUGGESTIONS
    }

    /// The text waiting in the input line.
    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    /// Replaces the text in the input line.
    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Results of the most recent message that carries any.
    pub fn latest_results(&self) -> Option<&[Post]> {
        self.messages
            .iter()
            .rev()
            .find_map(|message| message.results.as_deref())
    }

    /// The `index`th post of the most recent draft message.
    pub fn latest_draft(&self, index: usize) -> Option<&DraftedPost> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.is_draft())
            .and_then(|message| message.results.as_ref())
            .and_then(|results| results.get(index))
            .and_then(Post::as_drafted)
    }

    /// The most recent downloadable artifact.
    pub fn latest_download(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find_map(|message| message.download_file.as_deref())
    }

    /// Where an artifact named by the backend can be fetched.
    pub fn download_url(&self, file_name: &str) -> Result<Url> {
        self.backend.download_url(file_name)
    }

    /// Whether agent logs are shown.
    pub fn show_logs(&self) -> bool {
        self.show_logs
    }

    /// Shows or hides agent logs.
    pub fn set_show_logs(&mut self, show: bool) {
        self.show_logs = show;
    }

    /// The offset timestamps are shown in.
    pub fn utc_offset(&self) -> UtcOffset {
        self.utc_offset
    }

    /// Shows timestamps in `offset`.
    pub fn set_utc_offset(&mut self, offset: UtcOffset) {
        self.utc_offset = offset;
    }

    /// A token that shuts the session down when cancelled.
    ///
    /// An outstanding request is abandoned and no further requests are made.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.lifetime.clone()
    }

    /// Shuts the session down.
    pub fn shutdown(&self) {
        self.lifetime.cancel();
    }

    /// The backend this session talks to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            message_count: self.messages.len(),
            user_turns: self
                .messages
                .iter()
                .filter(|message| message.role == MessageRole::User)
                .count(),
            total_requests: self.request_count,
            total_failures: self.failure_count,
            show_logs: self.show_logs,
        }
    }
}

impl<B: Backend> Drop for ChatSession<B> {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
