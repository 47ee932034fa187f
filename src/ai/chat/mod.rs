mod core;
mod models;

pub use self::core::{EMPTY_COMPLETION_REPLY, MODEL_FAILURE_REPLY, Responder, ResponderBuilder};
pub use self::models::{ChatError, ChatReply, ChatTurn, HistoryEntry};
