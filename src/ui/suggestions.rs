//! Canned prompts offered after an assistant reply. Most of them are
//! handled on the client without a round trip to the model.

use crate::directives::{InteractionEvent, Theme};

const RESUME_REPLY: &str = "Great choice! I'll start the download of the resume for you. While it downloads, feel free to explore the projects or the professional experience sections.";

#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion {
    pub text: String,
    pub action: Option<InteractionEvent>,
}

/// What happens when a suggestion is picked.
#[derive(Clone, Debug, PartialEq)]
pub enum SuggestionOutcome {
    /// Apply `event` locally and add these messages to the log.
    Local {
        event: InteractionEvent,
        user_message: Option<String>,
        reply: Option<String>,
    },
    /// Send the text to the server as if it had been typed.
    Send(String),
}

impl Suggestion {
    fn new(text: &str, action: Option<InteractionEvent>) -> Self {
        Self {
            text: text.to_string(),
            action,
        }
    }

    pub fn outcome(&self) -> SuggestionOutcome {
        let Some(event) = self.action.clone() else {
            return SuggestionOutcome::Send(self.text.clone());
        };
        match &event {
            InteractionEvent::ToggleTheme { theme } => SuggestionOutcome::Local {
                reply: Some(format!(
                    "Theme updated to {} mode! If you're interested, I can show you some of the projects I've worked on. Just let me know!",
                    theme
                )),
                user_message: None,
                event,
            },
            InteractionEvent::Download { .. } => SuggestionOutcome::Local {
                user_message: Some(self.text.clone()),
                reply: Some(RESUME_REPLY.to_string()),
                event,
            },
            InteractionEvent::Navigate { .. } => SuggestionOutcome::Local {
                user_message: Some(self.text.clone()),
                reply: None,
                event,
            },
            _ => SuggestionOutcome::Send(self.text.clone()),
        }
    }
}

/// Suggestions to show given the current theme. The theme switch
/// only offers the theme that isn't already active.
pub fn quick_suggestions(current: Theme, resume_path: &str) -> Vec<Suggestion> {
    let mut suggestions = vec![
        Suggestion::new(
            "Show me your projects",
            Some(InteractionEvent::Navigate {
                section: "projects".to_string(),
            }),
        ),
        Suggestion::new(
            "Download Resume",
            Some(InteractionEvent::Download {
                url: resume_path.to_string(),
            }),
        ),
    ];
    for (text, theme) in [
        ("Switch to dark mode", Theme::Dark),
        ("Switch to light mode", Theme::Light),
    ] {
        if current != theme {
            suggestions.push(Suggestion::new(
                text,
                Some(InteractionEvent::ToggleTheme { theme }),
            ));
        }
    }
    suggestions
}
