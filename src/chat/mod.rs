//! Chat application module for conversations with the Reddit agent.
//!
//! This module provides the session controller and a terminal front-end
//! for it. It supports:
//!
//! - One request per message, with failures shown as error messages
//! - Result cards for search hits and generated drafts
//! - Slash commands standing in for the interface's buttons
//! - A loading indicator while the backend works
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`session`]: Conversation state and the operations that change it
//! - [`view`]: Pure rendering of a session into a visual tree
//! - [`render`]: Drawing that tree to a terminal
//! - [`prompter`]: Modal questions asked by reply and edit actions
//! - [`commands`]: Slash command parsing
//! - [`config`]: CLI argument parsing and configuration

mod commands;
mod config;
mod prompter;
mod render;
mod session;
mod view;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use prompter::{Prompter, ScriptedPrompter};
pub use render::{PlainTextRenderer, Renderer, Viewport, loading_indicator};
pub use session::{ChatSession, SUGGESTIONS, SendOutcome, SessionStats};
pub use view::{CardAction, DownloadLink, MessageView, PostCard, ViewNode, render};
