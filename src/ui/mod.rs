//! Applying interaction events on the client.

mod capabilities;
mod dispatcher;
mod suggestions;
mod terminal;

pub use capabilities::UiCapabilities;
pub use dispatcher::{DEFAULT_HIGHLIGHT_MS, Dispatcher};
pub use suggestions::{Suggestion, SuggestionOutcome, quick_suggestions};
pub use terminal::TerminalUi;
