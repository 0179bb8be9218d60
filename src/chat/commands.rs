//! Slash command parsing for the chat application.
//!
//! In a terminal there is nothing to click, so every button of the chat
//! interface (suggestion chips, Reply, Post to Reddit, Edit, Cancel, Clear,
//! the download link) is reached through a command starting with `/`.
//! Anything else is sent to the agent as a prompt.

/// A parsed chat command.
///
/// These commands act on the session and are not sent to the backend as
/// prompts (though some of them build one).
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation back to the greeting.
    Clear,

    /// List the suggestions again.
    Suggestions,

    /// Copy the nth suggestion (1-based) into the input line.
    UseSuggestion(usize),

    /// Reply to a post by id.
    Reply(String),

    /// Publish the nth drafted post (1-based) of the latest draft.
    Post(usize),

    /// Edit, then publish, the nth drafted post (1-based) of the latest draft.
    Edit(usize),

    /// Retract unconfirmed drafts.
    Cancel,

    /// Save the latest downloadable artifact to disk.
    Download(Option<String>),

    /// Show or hide agent logs.
    Logs(bool),

    /// Check that the backend is reachable.
    Ping,

    /// Display session statistics.
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be sent to the agent.
///
/// # Examples
///
/// ```
/// # use snoochat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/reply 1jfxanf").is_some());
/// assert!(parse_command("Search for AI agents in startups").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "suggestions" | "suggest" => ChatCommand::Suggestions,
        "use" => parse_index(argument, ChatCommand::UseSuggestion, "/use", false),
        "reply" => match argument {
            Some(post_id) if !post_id.contains(char::is_whitespace) => {
                ChatCommand::Reply(post_id.to_string())
            }
            Some(_) => ChatCommand::Invalid("/reply takes a single post id".to_string()),
            None => ChatCommand::Invalid("/reply requires a post id".to_string()),
        },
        "post" => parse_index(argument, ChatCommand::Post, "/post", true),
        "edit" => parse_index(argument, ChatCommand::Edit, "/edit", true),
        "cancel" => ChatCommand::Cancel,
        "download" => ChatCommand::Download(argument.map(|s| s.to_string())),
        "logs" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::Logs(value),
            None => ChatCommand::Invalid("/logs expects 'on' or 'off'".to_string()),
        },
        "ping" => ChatCommand::Ping,
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Parses a 1-based index; `optional` commands default to the first entry.
fn parse_index<F>(argument: Option<&str>, constructor: F, name: &str, optional: bool) -> ChatCommand
where
    F: Fn(usize) -> ChatCommand,
{
    match argument {
        Some(arg) => match arg.parse::<usize>() {
            Ok(value) if value > 0 => constructor(value),
            _ => ChatCommand::Invalid(format!("{} expects a positive number", name)),
        },
        None if optional => constructor(1),
        None => ChatCommand::Invalid(format!("{} requires a number", name)),
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Anything not starting with '/' is sent to the agent, e.g.
  search for <topic> in <subreddit> limit <n>
  generate post for <subreddit> about <topic>
  post to <subreddit> with title <title> text: <text>

Available commands:
  /suggestions           List the example prompts
  /use <n>               Put example prompt <n> on the input line
  /reply <post-id>       Reply to a search result
  /post [n]              Post draft <n> of the latest preview to Reddit
  /edit [n]              Edit draft <n>, then post it
  /cancel                Discard unconfirmed drafts
  /download [file]       Save the latest results file to disk
  /logs on|off           Show or hide agent logs
  /ping                  Check that the agent backend is up
  /clear                 Clear conversation history
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
