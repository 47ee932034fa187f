mod client;
mod conversation;

pub use client::ChatClient;
pub use conversation::{
    ChatMessage, Conversation, ConversationView, HighlightTarget, MAX_MESSAGES, WELCOME_MESSAGE,
};
