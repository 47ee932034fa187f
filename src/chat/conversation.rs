//! Client side conversation state: the bounded message log, the
//! in-flight flag and the currently highlighted element.

use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ai::chat::HistoryEntry;
use crate::openai::Role;

/// Most messages kept in the log, welcome message included.
pub const MAX_MESSAGES: usize = 20;

pub const WELCOME_MESSAGE: &str = "Hi! I'm an AI assistant for this portfolio. Ask me about the work, experience, or projects on this site and I can take you straight to them.";

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.to_string(),
            role,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Whatever renders the log. Told to scroll after every change.
pub trait ConversationView {
    fn scroll_to_bottom(&mut self, messages: &[ChatMessage]);
}

pub struct Conversation<V: ConversationView> {
    messages: Vec<ChatMessage>,
    view: V,
    busy: bool,
}

impl<V: ConversationView> Conversation<V> {
    pub fn new(view: V) -> Self {
        Self::with_welcome(view, WELCOME_MESSAGE)
    }

    pub fn with_welcome(view: V, welcome: &str) -> Self {
        let mut conversation = Self {
            messages: Vec::with_capacity(MAX_MESSAGES),
            view,
            busy: false,
        };
        conversation.append(ChatMessage::assistant(welcome));
        conversation
    }

    /// Add a message. Once the log is full the oldest messages after
    /// the welcome are dropped to make room.
    pub fn append(&mut self, message: ChatMessage) -> &[ChatMessage] {
        if self.messages.len() >= MAX_MESSAGES {
            let keep_from = self.messages.len() - (MAX_MESSAGES - 2);
            self.messages.drain(1..keep_from);
        }
        self.messages.push(message);
        self.view.scroll_to_bottom(&self.messages);
        &self.messages
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The log in the shape the chat endpoint expects.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .map(|m| HistoryEntry {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mark a request as in flight. Returns false if one already is,
    /// in which case nothing should be sent.
    pub fn begin_request(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub fn finish_request(&mut self) {
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

/// The element currently carrying a highlight marker and when the
/// marker should come off.
#[derive(Debug, Default)]
pub struct HighlightTarget {
    current: Option<(String, Instant)>,
}

impl HighlightTarget {
    /// Track a new target. Returns the previous one, which the caller
    /// must clear before highlighting the new one.
    pub fn replace(&mut self, element_id: &str, until: Instant) -> Option<String> {
        self.current
            .replace((element_id.to_string(), until))
            .map(|(id, _)| id)
    }

    /// Release the target if its time is up.
    pub fn expire(&mut self, now: Instant) -> Option<String> {
        if self.deadline().is_some_and(|until| until <= now) {
            return self.current.take().map(|(id, _)| id);
        }
        None
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.current.as_ref().map(|(_, until)| *until)
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(|(id, _)| id.as_str())
    }
}
