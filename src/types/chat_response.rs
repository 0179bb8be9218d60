use serde::{Deserialize, Serialize};

use crate::types::Post;

/// Body returned by `POST /chat`.
///
/// Only `message` is guaranteed; the agent fills in whichever of the other
/// fields apply to the command it ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Short status line, e.g. "Search results" or "Post created".
    pub message: String,

    /// Search results or a generated draft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Post>>,

    /// Ids of posts created by the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_ids: Option<Vec<String>>,

    /// Name of an artifact served under `/files/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_file: Option<String>,

    /// Help text describing follow-up commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// The agent's own log lines for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<String>>,
}

impl ChatResponse {
    /// Create a response carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Set the results.
    pub fn with_results(mut self, results: Vec<Post>) -> Self {
        self.results = Some(results);
        self
    }

    /// Set the created post ids.
    pub fn with_post_ids(mut self, post_ids: Vec<String>) -> Self {
        self.post_ids = Some(post_ids);
        self
    }

    /// Set the download file.
    pub fn with_download_file(mut self, download_file: impl Into<String>) -> Self {
        self.download_file = Some(download_file.into());
        self
    }

    /// Set the instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_response_deserialization() {
        let json = json!({
            "message": "Search results",
            "results": [
                {"Title": "A", "Subreddit": "startups", "URL": "http://x/a.jpg", "Post ID": "1"},
                {"Title": "B", "Subreddit": "startups", "URL": "http://x/b", "Post ID": "2"}
            ],
            "post_ids": null,
            "download_file": "reddit_results_20250101_120000.xlsx",
            "logs": ["Searching for 'ai agents' in r/startups", "Found 2 posts"],
            "instructions": "To reply to a post, use: 'reply to post <Post ID> with <text>'"
        });

        let response: ChatResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.message, "Search results");
        assert_eq!(response.results.as_ref().map(Vec::len), Some(2));
        assert!(response.post_ids.is_none());
        assert_eq!(
            response.download_file.as_deref(),
            Some("reddit_results_20250101_120000.xlsx")
        );
        assert_eq!(response.logs.as_ref().map(Vec::len), Some(2));
        assert!(response.instructions.is_some());
    }

    #[test]
    fn message_only_response() {
        let response: ChatResponse =
            serde_json::from_value(json!({"message": "Invalid prompt", "logs": []})).unwrap();
        assert_eq!(response, ChatResponse {
            logs: Some(Vec::new()),
            ..ChatResponse::new("Invalid prompt")
        });
    }

    #[test]
    fn missing_message_is_rejected() {
        let result = serde_json::from_value::<ChatResponse>(json!({"results": []}));
        assert!(result.is_err());
    }
}
