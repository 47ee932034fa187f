use std::io::Stdout;
use std::time::Instant;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::chat::{ChatClient, ChatMessage, Conversation, ConversationView};
use crate::core::AppConfig;
use crate::openai::Role;
use crate::ui::{Dispatcher, Suggestion, SuggestionOutcome, TerminalUi, quick_suggestions};

/// Prints assistant messages as they land in the log. The user's own
/// messages are already on screen.
struct TranscriptPrinter;

impl ConversationView for TranscriptPrinter {
    fn scroll_to_bottom(&mut self, messages: &[ChatMessage]) {
        if let Some(last) = messages.last().filter(|m| m.role == Role::Assistant) {
            println!("\n{}\n", last.content);
        }
    }
}

struct TerminalChat {
    client: ChatClient,
    conversation: Conversation<TranscriptPrinter>,
    dispatcher: Dispatcher<TerminalUi<Stdout>>,
    resume_path: String,
}

impl TerminalChat {
    fn suggestions(&self) -> Vec<Suggestion> {
        quick_suggestions(self.dispatcher.ui().theme(), &self.resume_path)
    }

    async fn send(&mut self, text: &str) {
        if !self.conversation.begin_request() {
            return;
        }
        // History is the log before this message
        let history = self.conversation.history();
        self.conversation.append(ChatMessage::user(text));

        match self.client.send(text, history).await {
            Ok(resp) => {
                self.conversation
                    .append(ChatMessage::assistant(&resp.message));
                self.dispatcher.apply_all(&resp.events, Instant::now());
                if let Some(usage) = resp.usage {
                    println!(
                        "  ({} left this minute, {} today, est. ${})",
                        usage.remaining_per_minute, usage.remaining_daily, usage.estimated_cost
                    );
                }
            }
            Err(err) => {
                tracing::debug!("Chat request failed: {}", err);
                self.conversation.append(ChatMessage::assistant(&format!(
                    "Sorry, I'm having trouble responding right now: {}",
                    err
                )));
            }
        }
        self.conversation.finish_request();
    }

    async fn pick(&mut self, suggestion: &Suggestion) {
        match suggestion.outcome() {
            SuggestionOutcome::Local {
                event,
                user_message,
                reply,
            } => {
                self.dispatcher.apply(&event, Instant::now());
                if let Some(text) = user_message {
                    self.conversation.append(ChatMessage::user(&text));
                }
                if let Some(text) = reply {
                    self.conversation.append(ChatMessage::assistant(&text));
                }
            }
            SuggestionOutcome::Send(text) => self.send(&text).await,
        }
    }
}

// `/2` picks the second suggestion
fn suggestion_index(line: &str, count: usize) -> Option<usize> {
    let n: usize = line.strip_prefix('/')?.parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

pub async fn run(url: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=warn", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::default();
    let mut rl = DefaultEditor::new()?;
    let mut chat = TerminalChat {
        client: ChatClient::new(url),
        conversation: Conversation::new(TranscriptPrinter),
        dispatcher: Dispatcher::new(TerminalUi::stdout(&config.storage_path, url)),
        resume_path: config.resume_path.clone(),
    };

    loop {
        let suggestions = chat.suggestions();
        let menu: Vec<String> = suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| format!("/{} {}", i + 1, s.text))
            .collect();
        println!("  {}", menu.join("  "));

        let readline = rl.readline(">>> ");
        // Highlights wear off while waiting for input
        chat.dispatcher.expire(Instant::now());

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                match suggestion_index(line, suggestions.len()) {
                    Some(i) => chat.pick(&suggestions[i]).await,
                    None => chat.send(line).await,
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
