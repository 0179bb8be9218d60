//! The visual tree of a chat session.
//!
//! [`render`] is a pure function of session state: it decides what is on
//! screen (which result cards, which actions, whether the suggestions or the
//! loading indicator show) and leaves drawing to a [`Renderer`].
//!
//! [`Renderer`]: crate::chat::Renderer

use crate::chat::session::ChatSession;
use crate::client::Backend;
use crate::types::{ChatMessage, DraftedPost, MessageRole, Post, RetrievedPost};
use crate::utils::time::clock_label_at;

/// One node of the rendered session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode {
    /// Example commands, numbered from 1.
    Suggestions(Vec<String>),
    /// A conversation turn.
    Message(MessageView),
    /// The backend is working on a request.
    Loading,
}

/// A rendered conversation turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    /// Who wrote it.
    pub role: MessageRole,
    /// The message text.
    pub text: String,
    /// One card per result.
    pub cards: Vec<PostCard>,
    /// Link to the backend artifact.
    pub download: Option<DownloadLink>,
    /// Created post ids, comma separated.
    pub post_ids: Option<String>,
    /// The agent's help text, shown preformatted.
    pub instructions: Option<String>,
    /// Agent log lines, when the session shows them.
    pub logs: Vec<String>,
    /// Wall-clock creation time.
    pub timestamp: String,
}

/// A result card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCard {
    /// A draft awaiting confirmation.
    Drafted {
        /// The proposed title.
        title: String,
        /// `r/<subreddit>`.
        subreddit: String,
        /// The proposed body.
        body: String,
        /// Post to Reddit, Edit, Cancel.
        actions: Vec<CardAction>,
    },
    /// A search result.
    Retrieved {
        /// The post title.
        title: String,
        /// Where the title links to.
        link: Option<String>,
        /// `r/<subreddit>: <summary>`.
        byline: String,
        /// `Post ID: <id>`.
        footer: String,
        /// Image shown inline for `.jpg`/`.png` links.
        image: Option<String>,
        /// Reply.
        actions: Vec<CardAction>,
    },
}

/// A button on a result card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    /// Publish the draft as-is.
    PostToReddit,
    /// Rewrite the draft, then publish.
    Edit,
    /// Retract unconfirmed drafts.
    Cancel,
    /// Reply to a search result.
    Reply {
        /// The post to reply to.
        post_id: String,
    },
}

impl CardAction {
    /// The button label.
    pub fn label(&self) -> &'static str {
        match self {
            CardAction::PostToReddit => "Post to Reddit",
            CardAction::Edit => "Edit",
            CardAction::Cancel => "Cancel",
            CardAction::Reply { .. } => "Reply",
        }
    }
}

/// A download link for a backend artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    /// The backend's name for the file.
    pub file_name: String,
    /// Where to fetch it; `None` when the backend cannot serve it.
    pub url: Option<String>,
}

/// Renders the session into its visual tree.
pub fn render<B: Backend>(session: &ChatSession<B>) -> Vec<ViewNode> {
    let mut nodes = Vec::with_capacity(session.message_count() + 2);
    if session.suggestions_visible() {
        nodes.push(ViewNode::Suggestions(
            session.suggestions().iter().map(|s| s.to_string()).collect(),
        ));
    }
    for message in session.messages() {
        nodes.push(ViewNode::Message(message_view(session, message)));
    }
    if session.is_in_flight() {
        nodes.push(ViewNode::Loading);
    }
    nodes
}

fn message_view<B: Backend>(session: &ChatSession<B>, message: &ChatMessage) -> MessageView {
    MessageView {
        role: message.role,
        text: message.content.clone(),
        cards: message
            .results
            .iter()
            .flatten()
            .map(post_card)
            .collect(),
        download: message.download_file.as_ref().map(|file_name| DownloadLink {
            file_name: file_name.clone(),
            url: session.download_url(file_name).ok().map(String::from),
        }),
        post_ids: message.post_ids.as_ref().map(|ids| ids.join(", ")),
        instructions: message.instructions.clone(),
        logs: if session.show_logs() {
            message.logs.clone().unwrap_or_default()
        } else {
            Vec::new()
        },
        timestamp: clock_label_at(&message.timestamp(), session.utc_offset()),
    }
}

fn post_card(post: &Post) -> PostCard {
    match post {
        Post::Drafted(draft) => drafted_card(draft),
        Post::Retrieved(retrieved) => retrieved_card(retrieved),
    }
}

fn drafted_card(draft: &DraftedPost) -> PostCard {
    PostCard::Drafted {
        title: draft.title.clone(),
        subreddit: format!("r/{}", draft.subreddit),
        body: draft.text.clone(),
        actions: vec![CardAction::PostToReddit, CardAction::Edit, CardAction::Cancel],
    }
}

fn retrieved_card(post: &RetrievedPost) -> PostCard {
    let post_id = post.post_id.clone().unwrap_or_default();
    PostCard::Retrieved {
        title: post.title.clone(),
        link: post.url.clone(),
        byline: format!(
            "r/{}: {}",
            post.subreddit,
            post.summary.as_deref().unwrap_or_default()
        ),
        footer: format!("Post ID: {post_id}"),
        image: post
            .has_inline_image()
            .then(|| post.url.clone())
            .flatten(),
        actions: vec![CardAction::Reply { post_id }],
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use url::Url;

    use super::*;
    use crate::error::Result;
    use crate::types::{ChatRequest, ChatResponse};

    struct FixedBackend(ChatResponse);

    #[async_trait::async_trait]
    impl Backend for FixedBackend {
        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse> {
            Ok(self.0.clone())
        }

        fn download_url(&self, file_name: &str) -> Result<Url> {
            Ok(Url::parse("http://localhost:8000/files/")?.join(file_name)?)
        }
    }

    fn messages(nodes: &[ViewNode]) -> Vec<&MessageView> {
        nodes
            .iter()
            .filter_map(|node| match node {
                ViewNode::Message(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fresh_session_shows_suggestions_then_greeting() {
        let session = ChatSession::new(FixedBackend(ChatResponse::new("ok")));
        let nodes = render(&session);
        assert_eq!(nodes.len(), 2);
        assert!(matches!(&nodes[0], ViewNode::Suggestions(s) if s.len() == 6));
        assert!(matches!(&nodes[1], ViewNode::Message(m) if m.role == MessageRole::Assistant));
    }

    #[tokio::test]
    async fn search_results_render_as_cards() {
        let response = ChatResponse::new("Found 2 posts")
            .with_results(vec![
                RetrievedPost::new("A", "startups")
                    .with_url("http://x/a.jpg")
                    .with_post_id("1")
                    .into(),
                RetrievedPost::new("B", "startups")
                    .with_summary("agents")
                    .with_url("http://x/b")
                    .with_post_id("2")
                    .into(),
            ])
            .with_download_file("reddit_results.xlsx");
        let mut session = ChatSession::new(FixedBackend(response));
        session.send_message("Search for AI agents in startups").await;

        let nodes = render(&session);
        assert!(!nodes.iter().any(|n| matches!(n, ViewNode::Suggestions(_))));
        let views = messages(&nodes);
        assert_eq!(views.len(), 3);
        assert_eq!(views[1].role, MessageRole::User);

        let reply = views[2];
        assert_eq!(reply.text, "Found 2 posts");
        assert_eq!(reply.cards.len(), 2);
        assert_eq!(
            reply.cards[0],
            PostCard::Retrieved {
                title: "A".to_string(),
                link: Some("http://x/a.jpg".to_string()),
                byline: "r/startups: ".to_string(),
                footer: "Post ID: 1".to_string(),
                image: Some("http://x/a.jpg".to_string()),
                actions: vec![CardAction::Reply {
                    post_id: "1".to_string()
                }],
            }
        );
        assert!(matches!(
            &reply.cards[1],
            PostCard::Retrieved { image: None, byline, .. } if byline == "r/startups: agents"
        ));
        assert_eq!(
            reply.download,
            Some(DownloadLink {
                file_name: "reddit_results.xlsx".to_string(),
                url: Some("http://localhost:8000/files/reddit_results.xlsx".to_string()),
            })
        );
        assert_eq!(reply.timestamp.len(), 8);
    }

    #[tokio::test]
    async fn drafts_offer_post_edit_cancel() {
        let response = ChatResponse::new("Generated post preview")
            .with_results(vec![
                DraftedPost::new("startups", "AI Ideas", "Discuss AI").into(),
            ])
            .with_instructions("Review the generated post above.");
        let mut session = ChatSession::new(FixedBackend(response));
        session.send_message("Generate post for startups about AI agents").await;

        let nodes = render(&session);
        let reply = messages(&nodes)[2];
        assert_eq!(
            reply.cards,
            vec![PostCard::Drafted {
                title: "AI Ideas".to_string(),
                subreddit: "r/startups".to_string(),
                body: "Discuss AI".to_string(),
                actions: vec![CardAction::PostToReddit, CardAction::Edit, CardAction::Cancel],
            }]
        );
        assert_eq!(
            reply.instructions.as_deref(),
            Some("Review the generated post above.")
        );
    }

    #[tokio::test]
    async fn post_ids_and_logs() {
        let mut response =
            ChatResponse::new("Post created").with_post_ids(vec!["abc".into(), "def".into()]);
        response.logs = Some(vec!["[2025-04-22T10:00:00] Posted".to_string()]);
        let mut session = ChatSession::new(FixedBackend(response));
        session.send_message("Post to startups with title AI Ideas text: Discuss AI").await;

        let hidden = render(&session);
        let reply = messages(&hidden)[2];
        assert_eq!(reply.post_ids.as_deref(), Some("abc, def"));
        assert!(reply.logs.is_empty());

        session.set_show_logs(true);
        let shown = render(&session);
        assert_eq!(messages(&shown)[2].logs.len(), 1);
    }

    #[test]
    fn loading_node_follows_the_flag() {
        let session = ChatSession::new(FixedBackend(ChatResponse::new("ok")));
        let flag = session.in_flight_flag();
        flag.store(true, Ordering::Release);
        assert_eq!(render(&session).last(), Some(&ViewNode::Loading));
        flag.store(false, Ordering::Release);
        assert_ne!(render(&session).last(), Some(&ViewNode::Loading));
    }

    #[test]
    fn timestamps_follow_the_session_offset() {
        let mut session = ChatSession::new(FixedBackend(ChatResponse::new("ok")));
        let created = session.messages()[0].timestamp();

        session.set_utc_offset(time::macros::offset!(+5:30));
        let nodes = render(&session);
        let greeting = messages(&nodes)[0];
        let expected = created
            .to_offset(time::macros::offset!(+5:30))
            .format(time::macros::format_description!("[hour]:[minute]:[second]"))
            .unwrap();
        assert_eq!(greeting.timestamp, expected);

        session.set_utc_offset(time::UtcOffset::UTC);
        let utc = render(&session);
        assert_ne!(messages(&utc)[0].timestamp, expected);
    }

    #[test]
    fn action_labels() {
        assert_eq!(CardAction::PostToReddit.label(), "Post to Reddit");
        assert_eq!(
            CardAction::Reply {
                post_id: "1".to_string()
            }
            .label(),
            "Reply"
        );
    }
}
