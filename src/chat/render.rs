//! Output rendering for the chat application.
//!
//! This module draws the nodes produced by [`view::render`] to a terminal.
//! The default implementation uses ANSI escape codes to separate roles,
//! result cards and the agent's auxiliary output.
//!
//! [`view::render`]: crate::chat::view::render

use std::io::{self, Stderr, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::chat::view::{CardAction, MessageView, PostCard, ViewNode};
use crate::types::MessageRole;

/// ANSI escape code for dim text (timestamps, logs).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (titles).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (assistant label, actions).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (drafts).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for green text (user label, downloads).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for magenta text (instructions).
const ANSI_MAGENTA: &str = "\x1b[35m";

/// How long each frame of the loading indicator stays up.
const LOADING_FRAME: Duration = Duration::from_millis(300);

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Recording renderers in tests
pub trait Renderer: Send {
    /// Print the numbered suggestion chips.
    fn print_suggestions(&mut self, suggestions: &[String]);

    /// Print one conversation turn with everything attached to it.
    fn print_message(&mut self, message: &MessageView);

    /// Print a divider before the conversation is drawn again from the top.
    fn print_divider(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Keeps the terminal scrolled to the newest message.
///
/// Remembers how much of the conversation has been drawn.  When the
/// conversation grows only the new messages are printed; when it shrinks
/// (clear, cancelled drafts) it is drawn again in full.
#[derive(Debug, Default)]
pub struct Viewport {
    drawn: usize,
    suggestions_drawn: bool,
}

impl Viewport {
    /// Creates a viewport that has drawn nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages already on screen.
    pub fn drawn(&self) -> usize {
        self.drawn
    }

    /// Brings the screen up to date with `nodes`.
    pub fn sync(&mut self, nodes: &[ViewNode], renderer: &mut dyn Renderer) {
        let count = nodes
            .iter()
            .filter(|node| matches!(node, ViewNode::Message(_)))
            .count();
        if count < self.drawn {
            renderer.print_divider();
            self.drawn = 0;
            self.suggestions_drawn = false;
        }

        let mut index = 0;
        for node in nodes {
            match node {
                ViewNode::Suggestions(suggestions) => {
                    if !self.suggestions_drawn {
                        renderer.print_suggestions(suggestions);
                        self.suggestions_drawn = true;
                    }
                }
                ViewNode::Message(message) => {
                    if index >= self.drawn {
                        renderer.print_message(message);
                    }
                    index += 1;
                }
                ViewNode::Loading => {}
            }
        }
        self.drawn = count;
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// This renderer outputs the conversation to stdout and errors to stderr.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn print_card(&self, card: &PostCard) {
        match card {
            PostCard::Drafted {
                title,
                subreddit,
                body,
                actions,
            } => {
                println!("  {}", self.styled(ANSI_YELLOW, "[draft]"));
                println!("  {}", self.styled(ANSI_BOLD, title));
                println!("  {}", self.styled(ANSI_BOLD, subreddit));
                for line in body.lines() {
                    println!("  {line}");
                }
                let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
                println!(
                    "  {}",
                    self.styled(
                        ANSI_CYAN,
                        &format!("[{}]  (/post, /edit, /cancel)", labels.join("] ["))
                    )
                );
            }
            PostCard::Retrieved {
                title,
                link,
                byline,
                footer,
                image,
                actions,
            } => {
                println!("  {}", self.styled(ANSI_BOLD, title));
                if let Some(link) = link {
                    println!("  {link}");
                }
                println!("  {byline}");
                println!("  {}", self.styled(ANSI_DIM, footer));
                if let Some(image) = image {
                    println!("  [image] {image}");
                }
                for action in actions {
                    if let CardAction::Reply { post_id } = action {
                        println!(
                            "  {}",
                            self.styled(
                                ANSI_CYAN,
                                &format!("[{}]  (/reply {post_id})", action.label())
                            )
                        );
                    }
                }
            }
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_suggestions(&mut self, suggestions: &[String]) {
        println!("{}", self.styled(ANSI_DIM, "Try one of these (/use <n>):"));
        for (index, suggestion) in suggestions.iter().enumerate() {
            println!("  {}. {suggestion}", index + 1);
        }
        println!();
        self.flush();
    }

    fn print_message(&mut self, message: &MessageView) {
        let label = match message.role {
            MessageRole::User => self.styled(ANSI_GREEN, "You"),
            MessageRole::Assistant => self.styled(ANSI_CYAN, "Agent"),
        };
        println!(
            "{label} {}",
            self.styled(ANSI_DIM, &format!("({})", message.timestamp))
        );
        println!("{}", message.text);
        for (index, card) in message.cards.iter().enumerate() {
            println!("{}", self.styled(ANSI_DIM, &format!("  #{}", index + 1)));
            self.print_card(card);
        }
        if let Some(download) = &message.download {
            let target = download.url.as_deref().unwrap_or(&download.file_name);
            println!(
                "{} {target}",
                self.styled(ANSI_GREEN, "Download Results:")
            );
        }
        if let Some(post_ids) = &message.post_ids {
            println!("Post IDs: {post_ids}");
        }
        if let Some(instructions) = &message.instructions {
            println!("{}", self.styled(ANSI_BOLD, "Available Commands:"));
            for line in instructions.lines() {
                println!("{}", self.styled(ANSI_MAGENTA, &format!("    {line}")));
            }
        }
        for line in &message.logs {
            println!("{}", self.styled(ANSI_DIM, &format!("  | {line}")));
        }
        println!();
        self.flush();
    }

    fn print_divider(&mut self) {
        println!("{}", self.styled(ANSI_DIM, "----------------------------------------"));
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }
}

/// Animates three dots on stderr while `in_flight` is set, until `stop` is
/// cancelled.
pub async fn loading_indicator(in_flight: Arc<AtomicBool>, stop: CancellationToken) {
    let mut stderr: Stderr = io::stderr();
    let mut frame = 0usize;
    let mut shown = false;
    loop {
        if in_flight.load(Ordering::Acquire) {
            let dots = frame % 3 + 1;
            let _ = write!(stderr, "\r{:<3}", ".".repeat(dots));
            let _ = stderr.flush();
            frame += 1;
            shown = true;
        }
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = tokio::time::sleep(LOADING_FRAME) => {}
        }
    }
    if shown {
        let _ = write!(stderr, "\r   \r");
        let _ = stderr.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingRenderer {
        events: Vec<String>,
    }

    impl Renderer for RecordingRenderer {
        fn print_suggestions(&mut self, suggestions: &[String]) {
            self.events.push(format!("suggestions:{}", suggestions.len()));
        }

        fn print_message(&mut self, message: &MessageView) {
            self.events.push(format!("message:{}", message.text));
        }

        fn print_divider(&mut self) {
            self.events.push("divider".to_string());
        }

        fn print_error(&mut self, error: &str) {
            self.events.push(format!("error:{error}"));
        }

        fn print_info(&mut self, info: &str) {
            self.events.push(format!("info:{info}"));
        }
    }

    fn message(text: &str) -> ViewNode {
        ViewNode::Message(MessageView {
            role: MessageRole::Assistant,
            text: text.to_string(),
            cards: Vec::new(),
            download: None,
            post_ids: None,
            instructions: None,
            logs: Vec::new(),
            timestamp: "12:00:00".to_string(),
        })
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
        assert_eq!(renderer.styled(ANSI_BOLD, "title"), "title");
    }

    #[test]
    fn viewport_draws_only_new_messages() {
        let mut viewport = Viewport::new();
        let mut renderer = RecordingRenderer::default();

        let first = vec![ViewNode::Suggestions(vec!["a".into()]), message("hi")];
        viewport.sync(&first, &mut renderer);
        viewport.sync(&first, &mut renderer);
        assert_eq!(renderer.events, ["suggestions:1", "message:hi"]);

        let grown = vec![message("hi"), message("q"), message("a"), ViewNode::Loading];
        viewport.sync(&grown, &mut renderer);
        assert_eq!(
            renderer.events,
            ["suggestions:1", "message:hi", "message:q", "message:a"]
        );
        assert_eq!(viewport.drawn(), 3);
    }

    #[test]
    fn viewport_redraws_after_shrinking() {
        let mut viewport = Viewport::new();
        let mut renderer = RecordingRenderer::default();
        viewport.sync(&[message("hi"), message("q"), message("a")], &mut renderer);
        renderer.events.clear();

        viewport.sync(&[message("hi")], &mut renderer);
        assert_eq!(renderer.events, ["divider", "message:hi"]);
        assert_eq!(viewport.drawn(), 1);
    }

    #[tokio::test]
    async fn loading_indicator_stops_on_cancel() {
        let flag = Arc::new(AtomicBool::new(false));
        let stop = CancellationToken::new();
        let task = tokio::spawn(loading_indicator(flag.clone(), stop.clone()));
        stop.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("indicator did not stop")
            .unwrap();
    }
}
