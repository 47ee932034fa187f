//! Extracts UI directives embedded in model output.
//!
//! The model is asked to annotate its replies with bracketed
//! commands such as `[[NAVIGATE:projects]]`. Model output is not
//! trusted input, so anything that doesn't exactly match one of the
//! known directives is left alone as plain text and parsing never
//! fails.
//!
//! Each directive kind is scanned independently in table order: all
//! occurrences of a kind become events (in the order they appear in
//! the text) and are then stripped before the next kind is scanned.

mod events;

pub use events::{InteractionEvent, Theme};

use regex::{Captures, Regex};

pub const DEFAULT_RESUME_PATH: &str = "/resume.pdf";

type Extractor = fn(&Captures, &str) -> Option<InteractionEvent>;

struct Directive {
    name: &'static str,
    pattern: Regex,
    extract: Extractor,
}

// (name, pattern, payload extractor). Order here is the order events
// are emitted in.
const DIRECTIVES: &[(&str, &str, Extractor)] = &[
    (
        "navigate",
        r"\[\[NAVIGATE:([A-Za-z0-9_]+)\]\]",
        |caps, _| {
            Some(InteractionEvent::Navigate {
                section: caps[1].to_string(),
            })
        },
    ),
    (
        "highlight",
        r"\[\[HIGHLIGHT:([^:\]]+):([0-9]+)\]\]",
        |caps, _| {
            Some(InteractionEvent::Highlight {
                element_id: caps[1].to_string(),
                duration: caps[2].parse().ok(),
            })
        },
    ),
    (
        "focus",
        r"\[\[FOCUS:([^:\]]+)\]\]",
        |caps, _| {
            Some(InteractionEvent::Focus {
                element_id: caps[1].to_string(),
            })
        },
    ),
    (
        "download",
        r"\[\[DOWNLOAD:([A-Za-z0-9_]+)\]\]",
        // Any token is stripped but only the resume is downloadable
        |caps, resume_path| {
            (&caps[1] == "resume").then(|| InteractionEvent::Download {
                url: resume_path.to_string(),
            })
        },
    ),
    (
        "link",
        r"\[\[LINK:([^\]]+)\]\]",
        |caps, _| {
            Some(InteractionEvent::OpenLink {
                url: caps[1].to_string(),
            })
        },
    ),
    (
        "theme",
        r"\[\[TOGGLE_THEME:(light|dark)\]\]",
        |caps, _| {
            caps[1]
                .parse()
                .ok()
                .map(|theme| InteractionEvent::ToggleTheme { theme })
        },
    ),
    (
        "scroll_to_top",
        r"\[\[SCROLL_TO_TOP\]\]",
        |_, _| Some(InteractionEvent::ScrollToTop {}),
    ),
];

/// Display text with directives removed and the events they encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub message: String,
    pub events: Vec<InteractionEvent>,
}

pub struct DirectiveParser {
    directives: Vec<Directive>,
    resume_path: String,
}

impl DirectiveParser {
    pub fn new(resume_path: &str) -> Self {
        let directives = DIRECTIVES
            .iter()
            .map(|&(name, pattern, extract)| Directive {
                name,
                pattern: Regex::new(pattern).expect("Built-in directive patterns are valid"),
                extract,
            })
            .collect();

        Self {
            directives,
            resume_path: resume_path.to_string(),
        }
    }

    pub fn parse(&self, raw: &str) -> Parsed {
        let mut message = raw.to_string();
        let mut events = Vec::new();

        // Stripping one directive can splice a new one together out
        // of the surrounding text so keep going until nothing matches.
        let mut changed = true;
        while changed {
            changed = false;
            for directive in self.directives.iter() {
                if !directive.pattern.is_match(&message) {
                    continue;
                }
                let found: Vec<InteractionEvent> = directive
                    .pattern
                    .captures_iter(&message)
                    .filter_map(|caps| (directive.extract)(&caps, &self.resume_path))
                    .collect();
                tracing::debug!("Found {} {} directive(s)", found.len(), directive.name);
                events.extend(found);
                message = directive.pattern.replace_all(&message, "").into_owned();
                changed = true;
            }
        }

        Parsed {
            message: message.trim().to_string(),
            events,
        }
    }
}

impl Default for DirectiveParser {
    fn default() -> Self {
        Self::new(DEFAULT_RESUME_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Parsed {
        DirectiveParser::default().parse(raw)
    }

    #[test]
    fn it_leaves_plain_text_alone() {
        let parsed = parse("  Israel has 5+ years of experience.\n");

        assert_eq!(parsed.message, "Israel has 5+ years of experience.");
        assert!(parsed.events.is_empty());
    }

    #[test]
    fn it_extracts_a_navigation() {
        let parsed = parse("Let me show you! [[NAVIGATE:projects]]");

        assert_eq!(parsed.message, "Let me show you!");
        assert_eq!(
            parsed.events,
            vec![InteractionEvent::Navigate {
                section: "projects".to_string()
            }]
        );
    }

    #[test]
    fn it_extracts_every_occurrence_of_a_kind() {
        let parsed = parse("[[NAVIGATE:about]] first, then [[NAVIGATE:contact]]");

        assert_eq!(parsed.message, "first, then");
        assert_eq!(
            parsed.events,
            vec![
                InteractionEvent::Navigate {
                    section: "about".to_string()
                },
                InteractionEvent::Navigate {
                    section: "contact".to_string()
                },
            ]
        );
    }

    #[test]
    fn it_extracts_mixed_directives_in_kind_order() {
        let raw = "[[TOGGLE_THEME:dark]] Dark mode on. [[SCROLL_TO_TOP]] \
                   Here is my work [[NAVIGATE:projects]] [[HIGHLIGHT:ever-jewelry:1500]] \
                   [[FOCUS:pair-eyewear]] [[DOWNLOAD:resume]] [[LINK:https://linkedin.com/in/israteneda]]";
        let parsed = parse(raw);

        assert_eq!(
            parsed.events,
            vec![
                InteractionEvent::Navigate {
                    section: "projects".to_string()
                },
                InteractionEvent::Highlight {
                    element_id: "ever-jewelry".to_string(),
                    duration: Some(1500)
                },
                InteractionEvent::Focus {
                    element_id: "pair-eyewear".to_string()
                },
                InteractionEvent::Download {
                    url: "/resume.pdf".to_string()
                },
                InteractionEvent::OpenLink {
                    url: "https://linkedin.com/in/israteneda".to_string()
                },
                InteractionEvent::ToggleTheme { theme: Theme::Dark },
                InteractionEvent::ScrollToTop {},
            ]
        );
        assert!(!parsed.message.contains("[["));
        assert!(parsed.message.starts_with("Dark mode on."));
    }

    #[test]
    fn it_only_downloads_the_resume() {
        let parsed = parse("Here you go [[DOWNLOAD:portfolio]] and [[DOWNLOAD:resume]]");

        assert_eq!(parsed.message, "Here you go  and");
        assert_eq!(
            parsed.events,
            vec![InteractionEvent::Download {
                url: "/resume.pdf".to_string()
            }]
        );
    }

    #[test]
    fn it_uses_the_configured_resume_path() {
        let parsed = DirectiveParser::new("/Israel_Teneda_CV.pdf").parse("[[DOWNLOAD:resume]]");

        assert_eq!(
            parsed.events,
            vec![InteractionEvent::Download {
                url: "/Israel_Teneda_CV.pdf".to_string()
            }]
        );
    }

    #[test]
    fn it_ignores_malformed_directives() {
        let raw = "[[HIGHLIGHT:skills]] [[HIGHLIGHT:skills:soon]] [[TOGGLE_THEME:sepia]] \
                   [[NAVIGATE:]] [[WIGGLE:logo]] [NAVIGATE:about]";
        let parsed = parse(raw);

        assert!(parsed.events.is_empty());
        assert_eq!(parsed.message, raw);
    }

    #[test]
    fn it_strips_highlights_with_oversized_durations() {
        let parsed = parse("Look [[HIGHLIGHT:skills:10000000000]] [[HIGHLIGHT:about:99999999999999999999999]]");

        assert_eq!(parsed.message, "Look");
        assert_eq!(
            parsed.events,
            vec![
                InteractionEvent::Highlight {
                    element_id: "skills".to_string(),
                    duration: Some(10_000_000_000),
                },
                // Too large for a u64 so the default duration applies
                InteractionEvent::Highlight {
                    element_id: "about".to_string(),
                    duration: None,
                },
            ]
        );
    }

    #[test]
    fn it_emits_one_scroll_per_occurrence() {
        let parsed = parse("[[SCROLL_TO_TOP]] up [[SCROLL_TO_TOP]]");

        assert_eq!(parsed.message, "up");
        assert_eq!(
            parsed.events,
            vec![InteractionEvent::ScrollToTop {}, InteractionEvent::ScrollToTop {}]
        );
    }

    #[test]
    fn it_is_idempotent() {
        let inputs = [
            "Let me show you! [[NAVIGATE:projects]]",
            "[[HIGHLIGHT:a]] x [[HIGHLIGHT:b:100]]",
            "[[NAV[[SCROLL_TO_TOP]]IGATE:about]]",
            "[[[[LINK:x]]LINK:y]]",
            "nothing to see",
        ];
        let parser = DirectiveParser::default();
        for input in inputs {
            let once = parser.parse(input);
            let twice = parser.parse(&once.message);
            assert!(twice.events.is_empty(), "Not idempotent for {:?}", input);
            assert_eq!(twice.message, once.message);
        }
    }

    #[test]
    fn it_extracts_spliced_directives() {
        let parsed = parse("[[NAV[[SCROLL_TO_TOP]]IGATE:about]]");

        assert_eq!(parsed.message, "");
        assert_eq!(
            parsed.events,
            vec![
                InteractionEvent::ScrollToTop {},
                InteractionEvent::Navigate {
                    section: "about".to_string()
                },
            ]
        );
    }
}
