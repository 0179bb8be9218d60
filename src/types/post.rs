use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A post returned by the agent backend.
///
/// The backend sends two shapes in the same `results` array: posts found by
/// a search and posts it drafted for the user to confirm. An explicit
/// `kind` tag decides when present; otherwise a non-empty `Text` field marks
/// a draft.
///
/// Wire fields the chosen variant does not model (the `kind` tag, unknown
/// keys, search fields on a draft) are kept and written back when the post
/// is sent to the backend again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WirePost", into = "WirePost")]
pub enum Post {
    /// A post found on Reddit.
    Retrieved(RetrievedPost),

    /// A post generated by the agent that has not been published yet.
    Drafted(DraftedPost),
}

/// A search result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievedPost {
    /// The post title.
    pub title: String,
    /// The subreddit name, without the `r/` prefix.
    pub subreddit: String,
    /// Agent-written summary of the post body.
    pub summary: Option<String>,
    /// Link to the post or its media.
    pub url: Option<String>,
    /// Reddit's id for the post, used when replying.
    pub post_id: Option<String>,
    extra: Map<String, Value>,
}

/// A generated post awaiting confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftedPost {
    /// The proposed title.
    pub title: String,
    /// The target subreddit, without the `r/` prefix.
    pub subreddit: String,
    /// The proposed body.
    pub text: String,
    extra: Map<String, Value>,
}

impl Post {
    /// Returns true for a generated post awaiting confirmation.
    pub fn is_drafted(&self) -> bool {
        matches!(self, Post::Drafted(_))
    }

    /// The post title, regardless of variant.
    pub fn title(&self) -> &str {
        match self {
            Post::Retrieved(post) => &post.title,
            Post::Drafted(post) => &post.title,
        }
    }

    /// The subreddit, regardless of variant.
    pub fn subreddit(&self) -> &str {
        match self {
            Post::Retrieved(post) => &post.subreddit,
            Post::Drafted(post) => &post.subreddit,
        }
    }

    /// Returns the draft, if this is one.
    pub fn as_drafted(&self) -> Option<&DraftedPost> {
        match self {
            Post::Drafted(post) => Some(post),
            Post::Retrieved(_) => None,
        }
    }

    /// Wire fields carried along without being interpreted.
    pub fn extra_fields(&self) -> &Map<String, Value> {
        match self {
            Post::Retrieved(post) => &post.extra,
            Post::Drafted(post) => &post.extra,
        }
    }

    /// Returns the search result, if this is one.
    pub fn as_retrieved(&self) -> Option<&RetrievedPost> {
        match self {
            Post::Retrieved(post) => Some(post),
            Post::Drafted(_) => None,
        }
    }
}

impl RetrievedPost {
    /// Create a search result with a title and subreddit.
    pub fn new(title: impl Into<String>, subreddit: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subreddit: subreddit.into(),
            ..Self::default()
        }
    }

    /// Set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the post id.
    pub fn with_post_id(mut self, post_id: impl Into<String>) -> Self {
        self.post_id = Some(post_id.into());
        self
    }

    /// True when the URL points straight at a `.jpg` or `.png` image.
    pub fn has_inline_image(&self) -> bool {
        self.url
            .as_deref()
            .is_some_and(|url| url.ends_with(".jpg") || url.ends_with(".png"))
    }
}

impl DraftedPost {
    /// Create a draft.
    pub fn new(
        subreddit: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            subreddit: subreddit.into(),
            text: text.into(),
            extra: Map::new(),
        }
    }
}

impl From<RetrievedPost> for Post {
    fn from(post: RetrievedPost) -> Self {
        Post::Retrieved(post)
    }
}

impl From<DraftedPost> for Post {
    fn from(post: DraftedPost) -> Self {
        Post::Drafted(post)
    }
}

/// The backend's field names.  Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WirePost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Subreddit", default)]
    subreddit: Option<String>,
    #[serde(rename = "Summary", default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(rename = "URL", default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(rename = "Post ID", default, skip_serializing_if = "Option::is_none")]
    post_id: Option<String>,
    #[serde(rename = "Text", default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl WirePost {
    fn is_drafted(&self) -> bool {
        match self.kind.as_deref() {
            Some(kind) if kind.eq_ignore_ascii_case("drafted") => true,
            Some(kind) if kind.eq_ignore_ascii_case("retrieved") => false,
            _ => self.text.as_deref().is_some_and(|text| !text.is_empty()),
        }
    }
}

fn keep(extra: &mut Map<String, Value>, name: &str, value: Option<String>) {
    if let Some(value) = value {
        extra.insert(name.to_string(), Value::String(value));
    }
}

impl From<WirePost> for Post {
    fn from(wire: WirePost) -> Self {
        let drafted = wire.is_drafted();
        let mut extra = wire.extra;
        keep(&mut extra, "kind", wire.kind);
        if drafted {
            keep(&mut extra, "Summary", wire.summary);
            keep(&mut extra, "URL", wire.url);
            keep(&mut extra, "Post ID", wire.post_id);
            Post::Drafted(DraftedPost {
                title: wire.title.unwrap_or_default(),
                subreddit: wire.subreddit.unwrap_or_default(),
                text: wire.text.unwrap_or_default(),
                extra,
            })
        } else {
            keep(&mut extra, "Text", wire.text);
            Post::Retrieved(RetrievedPost {
                title: wire.title.unwrap_or_default(),
                subreddit: wire.subreddit.unwrap_or_default(),
                summary: wire.summary,
                url: wire.url,
                post_id: wire.post_id,
                extra,
            })
        }
    }
}

impl From<Post> for WirePost {
    fn from(post: Post) -> Self {
        match post {
            Post::Retrieved(post) => WirePost {
                title: Some(post.title),
                subreddit: Some(post.subreddit),
                summary: post.summary,
                url: post.url,
                post_id: post.post_id,
                extra: post.extra,
                ..WirePost::default()
            },
            Post::Drafted(post) => WirePost {
                title: Some(post.title),
                subreddit: Some(post.subreddit),
                text: Some(post.text),
                extra: post.extra,
                ..WirePost::default()
            },
        }
    }
}
