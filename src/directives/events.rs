use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(anyhow::anyhow!("Unknown theme: {}", other)),
        }
    }
}

/// A UI action requested by the model. Serialized as
/// `{"type": "navigate", "data": {"section": "projects"}}`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InteractionEvent {
    Navigate {
        section: String,
    },
    Highlight {
        #[serde(rename = "elementId")]
        element_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u64>,
    },
    Focus {
        #[serde(rename = "elementId")]
        element_id: String,
    },
    Download {
        url: String,
    },
    OpenLink {
        url: String,
    },
    ScrollToTop {},
    ToggleTheme {
        theme: Theme,
    },
}

impl InteractionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            InteractionEvent::Navigate { .. } => "navigate",
            InteractionEvent::Highlight { .. } => "highlight",
            InteractionEvent::Focus { .. } => "focus",
            InteractionEvent::Download { .. } => "download",
            InteractionEvent::OpenLink { .. } => "open_link",
            InteractionEvent::ScrollToTop {} => "scroll_to_top",
            InteractionEvent::ToggleTheme { .. } => "toggle_theme",
        }
    }
}
