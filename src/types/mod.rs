// Public modules
pub mod chat_message;
pub mod chat_request;
pub mod chat_response;
pub mod post;

// Re-exports
pub use chat_message::{ChatMessage, GREETING, MessageRole, MessageStatus};
pub use chat_request::ChatRequest;
pub use chat_response::ChatResponse;
pub use post::{DraftedPost, Post, RetrievedPost};
