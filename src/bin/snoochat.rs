//! Interactive chat front-end for the Reddit search agent.
//!
//! This binary talks to the agent backend over HTTP and draws the
//! conversation in the terminal: search results and drafted posts are
//! shown as numbered cards, and the cards' buttons are slash commands.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a backend on localhost:8000
//! snoochat
//!
//! # Talk to a backend elsewhere, giving up on requests after a minute
//! snoochat --base-url http://agent.internal:8000/ --timeout-secs 60
//!
//! # Disable colors (useful for piping output)
//! snoochat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/use <n>` - Take an example prompt
//! - `/reply <post-id>` - Reply to a search result
//! - `/post`, `/edit`, `/cancel` - Act on a drafted post
//! - `/download` - Save the latest results spreadsheet
//! - `/quit` - Exit the application

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use time::UtcOffset;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snoochat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Prompter, Renderer,
    SUGGESTIONS, SendOutcome, Viewport, help_text, loading_indicator, parse_command, render,
};
use snoochat::Gateway;
use snoochat::utils::files::save_new;
use snoochat::utils::time::init_local_offset;

/// Asks questions on the terminal with a throwaway line editor.
struct EditorPrompter;

#[async_trait::async_trait]
impl Prompter for EditorPrompter {
    async fn ask(&mut self, question: &str, initial: Option<&str>) -> Option<String> {
        let mut editor = DefaultEditor::new().ok()?;
        println!("{question}");
        match editor.readline_with_initial("> ", (initial.unwrap_or_default(), "")) {
            Ok(answer) => Some(answer.trim().to_string()),
            Err(_) => None,
        }
    }
}

/// Main entry point for the snoochat application.
///
/// The local UTC offset is read here, before the runtime spawns its worker
/// threads; `time` refuses to read it afterwards.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let offset = init_local_offset();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(offset))
}

async fn run(offset: UtcOffset) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snoochat=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("snoochat [OPTIONS]");
    let config = ChatConfig::from(args);

    let gateway = config.gateway()?;
    let mut session = ChatSession::new(gateway);
    session.set_show_logs(config.show_logs);
    session.set_utc_offset(offset);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut viewport = Viewport::new();
    let mut prompter = EditorPrompter;
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C outside the line editor abandons the outstanding request and
    // ends the session.
    let shutdown = session.shutdown_token();
    ctrlc::set_handler(move || {
        shutdown.cancel();
    })?;

    println!("Reddit Search Agent (backend: {})", session.backend().base_url());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        viewport.sync(&render(&session), &mut renderer);

        let readline = rl.readline_with_initial("You: ", (session.pending_input(), ""));

        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - drop the line
                session.set_pending_input("");
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        };
        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.trim());
        }

        let outcome = match parse_command(&line) {
            Some(cmd) => {
                session.set_pending_input("");
                match cmd {
                    ChatCommand::Quit => {
                        println!("Goodbye!");
                        break;
                    }
                    ChatCommand::Clear => {
                        session.clear_session();
                        renderer.print_info("Conversation cleared.");
                        None
                    }
                    ChatCommand::Suggestions => {
                        if session.suggestions_visible() {
                            let suggestions: Vec<String> =
                                SUGGESTIONS.iter().map(|s| s.to_string()).collect();
                            renderer.print_suggestions(&suggestions);
                        } else {
                            renderer.print_info("Suggestions are only offered before the first message.");
                        }
                        None
                    }
                    ChatCommand::UseSuggestion(n) => {
                        match SUGGESTIONS.get(n - 1) {
                            Some(suggestion) if session.select_suggestion(suggestion) => {}
                            Some(_) => renderer
                                .print_error("Suggestions are only offered before the first message."),
                            None => renderer.print_error(&format!(
                                "There are only {} suggestions.",
                                SUGGESTIONS.len()
                            )),
                        }
                        None
                    }
                    ChatCommand::Reply(post_id) => {
                        let flag = session.in_flight_flag();
                        Some(with_loading(flag, session.request_reply(&post_id, &mut prompter)).await)
                    }
                    ChatCommand::Post(n) => match session.latest_draft(n - 1).cloned() {
                        Some(draft) => {
                            let flag = session.in_flight_flag();
                            Some(
                                with_loading(
                                    flag,
                                    session.propose_post(&draft.subreddit, &draft.title, &draft.text),
                                )
                                .await,
                            )
                        }
                        None => {
                            renderer.print_error(&format!("No drafted post #{n} to post."));
                            None
                        }
                    },
                    ChatCommand::Edit(n) => match session.latest_draft(n - 1).cloned() {
                        Some(draft) => {
                            let flag = session.in_flight_flag();
                            Some(
                                with_loading(
                                    flag,
                                    session.edit_proposal(
                                        &draft.subreddit,
                                        &draft.title,
                                        &draft.text,
                                        &mut prompter,
                                    ),
                                )
                                .await,
                            )
                        }
                        None => {
                            renderer.print_error(&format!("No drafted post #{n} to edit."));
                            None
                        }
                    },
                    ChatCommand::Cancel => {
                        match session.cancel_proposal() {
                            0 => renderer.print_info("No drafts to cancel."),
                            1 => renderer.print_info("Draft cancelled."),
                            n => renderer.print_info(&format!("{n} drafts cancelled.")),
                        }
                        None
                    }
                    ChatCommand::Download(file_name) => {
                        let file_name =
                            file_name.or_else(|| session.latest_download().map(String::from));
                        match file_name {
                            Some(file_name) => {
                                download(session.backend(), &file_name, &mut renderer).await
                            }
                            None => renderer.print_error("Nothing to download yet."),
                        }
                        None
                    }
                    ChatCommand::Logs(show) => {
                        session.set_show_logs(show);
                        if show {
                            renderer.print_info("Agent logs shown for new messages.");
                        } else {
                            renderer.print_info("Agent logs hidden.");
                        }
                        None
                    }
                    ChatCommand::Ping => {
                        match session.backend().health().await {
                            Ok(banner) => renderer.print_info(&format!("Backend is up: {banner}")),
                            Err(err) => renderer.print_error(&err.to_string()),
                        }
                        None
                    }
                    ChatCommand::Stats => {
                        print_stats(&session);
                        None
                    }
                    ChatCommand::Help => {
                        for line in help_text().lines() {
                            println!("    {}", line);
                        }
                        None
                    }
                    ChatCommand::Invalid(message) => {
                        renderer.print_error(&message);
                        None
                    }
                }
            }
            None => {
                session.set_pending_input(line);
                let flag = session.in_flight_flag();
                Some(with_loading(flag, session.send_pending()).await)
            }
        };

        if outcome == Some(SendOutcome::Cancelled) {
            viewport.sync(&render(&session), &mut renderer);
            println!("\nGoodbye!");
            break;
        }
    }

    Ok(())
}

/// Runs `work` with the loading indicator animating on stderr.
async fn with_loading<F>(in_flight: Arc<AtomicBool>, work: F) -> SendOutcome
where
    F: Future<Output = SendOutcome>,
{
    let stop = CancellationToken::new();
    let indicator = tokio::spawn(loading_indicator(in_flight, stop.clone()));
    let outcome = work.await;
    stop.cancel();
    let _ = indicator.await;
    outcome
}

/// Saves a backend artifact into the working directory.
async fn download(gateway: &Gateway, file_name: &str, renderer: &mut PlainTextRenderer) {
    let bytes = match gateway.download(file_name).await {
        Ok(bytes) => bytes,
        Err(err) => {
            renderer.print_error(&err.to_string());
            return;
        }
    };
    match save_new(Path::new("."), file_name, &bytes).await {
        Ok(path) => renderer.print_info(&format!(
            "Saved {} ({} bytes)",
            path.display(),
            bytes.len()
        )),
        Err(err) => renderer.print_error(&format!("Failed to save {file_name}: {err}")),
    }
}

fn print_stats(session: &ChatSession<Gateway>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Backend: {}", session.backend().base_url());
    println!("      Messages: {}", stats.message_count);
    println!("      Your messages: {}", stats.user_turns);
    println!(
        "      Requests: {} ({} failed)",
        stats.total_requests, stats.total_failures
    );
    println!(
        "      Agent logs: {}",
        if stats.show_logs { "shown" } else { "hidden" }
    );
    if let Some(file_name) = session.latest_download() {
        println!("      Latest download: {}", file_name);
    }
    if let Some(results) = session.latest_results() {
        let drafts = results.iter().filter(|post| post.is_drafted()).count();
        println!(
            "      Latest results: {} ({} drafted)",
            results.len(),
            drafts
        );
    }
}
