//! Line-oriented chat REPL. Thin presentation over the session core:
//! questions go to the conversation store, slash commands cover attachments,
//! clearing, and the read-only session views.

mod config;
mod gateway;
mod session;
mod stream;

use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::gateway::types::SessionStats;
use crate::gateway::{Gateway, HttpGateway};
use crate::session::message::{Message, Role};
use crate::session::store::{ClearOutcome, Confirm, ConversationStore};

const HELP: &str = "\
Commands:
  /attach <path>    upload a file and stage it for the next question
  /detach <id>      remove a staged file by its id
  /files            list staged files
  /uploads          list files the backend is holding
  /transcript       replay this session's messages
  /dismiss          dismiss the current upload error banner
  /clear            clear the conversation (asks for confirmation)
  /stats            session statistics
  /history          server-side conversation history
  /source <id>      full text of a cited source document
  /methods          available hit-rate evaluation methods
  /evaluate         run the backend's retrieval evaluation
  /quit             exit
Anything else is sent as a question.";

/// Stdin-backed yes/no gate.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let gateway = match HttpGateway::new(&config) {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            eprintln!("failed to initialize gateway: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(base_url = %config.base_url, streaming = config.streaming, "admitchat starting");

    let store_gateway: Arc<dyn Gateway> = gateway.clone();
    let mut store = ConversationStore::new(store_gateway, config.use_memory);

    println!("admitchat — ask a question, or /help for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("input error: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if !run_command(command, &mut store, gateway.as_ref()).await {
                break;
            }
        } else {
            run_chat(&mut store, &config, line).await;
        }
    }
}

// =============================================================================
// CHAT
// =============================================================================

async fn run_chat(store: &mut ConversationStore, config: &Config, line: &str) {
    let before = store.messages().len();

    let mut printed_chunks = false;
    if config.streaming {
        store
            .submit_streamed(line, |fragment| {
                printed_chunks = true;
                print!("{fragment}");
                let _ = std::io::stdout().flush();
            })
            .await;
        if printed_chunks {
            println!();
        }
    } else {
        store.submit(line).await;
    }

    if store.messages().len() == before {
        // Gated or blank submit; nothing to show.
        return;
    }
    if let Some(reply) = store.messages().last() {
        if reply.is_error || !printed_chunks {
            println!("{}", reply.content);
        }
        print_reply_meta(reply);
    }
}

fn print_reply_meta(reply: &Message) {
    if reply.is_error {
        return;
    }
    if let Some(query) = &reply.enhanced_query {
        println!("(interpreted as: {query})");
    }
    if let Some(performance) = reply.performance {
        println!("({:.2}s, {} source(s))", performance.total_time, reply.sources.len());
    }
    for (index, source) in reply.sources.iter().enumerate() {
        match &source.source_url {
            Some(url) => println!("  [{}] {} — {url}", index + 1, source.source_name),
            None => println!("  [{}] {}", index + 1, source.source_name),
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Returns false when the REPL should exit.
async fn run_command(command: &str, store: &mut ConversationStore, gateway: &dyn Gateway) -> bool {
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "help" => println!("{HELP}"),
        "quit" | "exit" => return false,
        "attach" => attach(store, arg).await,
        "detach" => detach(store, arg).await,
        "files" => list_files(store),
        "uploads" => match gateway.uploaded_files().await {
            Ok(files) if files.is_empty() => println!("the backend holds no files"),
            Ok(files) => {
                for file in &files {
                    println!("{}  {} ({} bytes)", file.file_id, file.filename, file.size);
                }
            }
            Err(e) => eprintln!("could not list uploads: {e}"),
        },
        "transcript" => print_transcript(store),
        "dismiss" => store.dismiss_error(),
        "clear" => match store.clear(&StdinConfirm).await {
            ClearOutcome::Cleared => println!("Conversation cleared."),
            ClearOutcome::Cancelled => {}
            ClearOutcome::Failed(alert) => eprintln!("{alert}"),
        },
        "stats" => match gateway.session_stats("max_similarity", 0.5).await {
            Ok(stats) => print_stats(&stats),
            Err(e) => eprintln!("could not load statistics: {e}"),
        },
        "history" => match gateway.history().await {
            Ok(history) if history.is_empty() => println!("No conversation history yet."),
            Ok(history) => {
                for exchange in &history {
                    println!("you: {}", exchange.user_query);
                    println!("bot: {}\n", exchange.bot_response);
                }
            }
            Err(e) => eprintln!("could not load history: {e}"),
        },
        "source" => {
            if arg.is_empty() {
                eprintln!("usage: /source <id>");
            } else {
                match gateway.source(arg).await {
                    Ok(doc) => {
                        if let Some(section) = &doc.section {
                            println!("section: {section}");
                        }
                        if let Some(file) = &doc.source_file {
                            println!("file: {file}");
                        }
                        println!("{}", doc.content);
                        if let Some(chunks) = doc.total_chunks {
                            println!("(combined from {chunks} chunk(s))");
                        }
                    }
                    Err(e) => eprintln!("could not load source: {e}"),
                }
            }
        }
        "methods" => match gateway.evaluation_methods().await {
            Ok(methods) => {
                for method in &methods {
                    println!("{method}");
                }
            }
            Err(e) => eprintln!("could not load evaluation methods: {e}"),
        },
        "evaluate" => match gateway.evaluate("max_similarity", 0.5).await {
            Ok(stats) => print_stats(&stats),
            Err(e) => eprintln!("evaluation failed: {e}"),
        },
        other => eprintln!("unknown command: /{other} (try /help)"),
    }
    true
}

async fn attach(store: &mut ConversationStore, arg: &str) {
    if arg.is_empty() {
        eprintln!("usage: /attach <path>");
        return;
    }

    let path = Path::new(arg);
    let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
        eprintln!("not a file path: {arg}");
        return;
    };
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("could not read {arg}: {e}");
            return;
        }
    };

    if store.stage(filename, bytes).await {
        let staged = store.attachments().staged();
        if let Some(attachment) = staged.last() {
            println!("staged {} as {} ({} bytes)", attachment.filename, attachment.file_id, attachment.size);
        }
    } else if let Some(error) = store.attachments().error() {
        eprintln!("{error}");
    }
}

async fn detach(store: &mut ConversationStore, arg: &str) {
    if arg.is_empty() {
        eprintln!("usage: /detach <id>");
        return;
    }
    if store.unstage(arg).await {
        println!("removed {arg}");
    } else {
        eprintln!("could not remove {arg}; it is still staged");
    }
}

fn print_transcript(store: &ConversationStore) {
    if store.messages().is_empty() {
        println!("no messages yet");
        return;
    }
    for message in store.messages() {
        let ts_ms = message
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "bot",
        };
        println!("[{ts_ms}] {who}: {}", message.content);
        for file in &message.attached_files {
            println!("        attached: {} ({})", file.filename, file.file_id);
        }
    }
}

fn list_files(store: &ConversationStore) {
    let staged = store.attachments().staged();
    if staged.is_empty() {
        println!("no files staged");
        return;
    }
    for attachment in staged {
        println!(
            "{}  {} ({} bytes, {} chars extracted)",
            attachment.file_id, attachment.filename, attachment.size, attachment.text_length
        );
    }
}

fn print_stats(stats: &SessionStats) {
    if stats.total_queries == 0 {
        println!("No statistics available yet.");
        return;
    }
    println!("queries: {}", stats.total_queries);
    println!("hit rate: {:.1}%", stats.hit_rate);
    println!("avg response: {:.2}s", stats.avg_response_time);
    println!("avg similarity: {:.3}", stats.avg_similarity);

    for metric in stats.metrics.iter().rev().take(10) {
        let category = metric.category.as_deref().unwrap_or("uncategorized");
        println!(
            "  {} [{category}] {:.2}s, {} doc(s), {}",
            metric.query,
            metric.response_time,
            metric.num_docs,
            if metric.hit { "hit" } else { "miss" }
        );
    }
}
