use serde::{Deserialize, Serialize};

use crate::types::Post;

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The natural-language command as typed by the user.
    pub prompt: String,

    /// Results of the most recent message that carried any, so the agent can
    /// act on "reply to all" style commands.  Sent as `null` when absent.
    pub search_results: Option<Vec<Post>>,
}

impl ChatRequest {
    /// Create a request without prior results.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            search_results: None,
        }
    }

    /// Attach prior results.
    pub fn with_search_results(mut self, results: Option<Vec<Post>>) -> Self {
        self.search_results = results;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RetrievedPost;
    use serde_json::{json, to_value};

    #[test]
    fn absent_results_serialize_as_null() {
        let request = ChatRequest::new("Search for AI agents in startups");
        assert_eq!(
            to_value(request).unwrap(),
            json!({
                "prompt": "Search for AI agents in startups",
                "search_results": null
            })
        );
    }

    #[test]
    fn prior_results_are_forwarded() {
        let request = ChatRequest::new("reply to all with thanks").with_search_results(Some(
            vec![RetrievedPost::new("A", "startups").with_post_id("1").into()],
        ));
        assert_eq!(
            to_value(request).unwrap(),
            json!({
                "prompt": "reply to all with thanks",
                "search_results": [
                    {"Title": "A", "Subreddit": "startups", "Post ID": "1"}
                ]
            })
        );
    }
}
