use std::time::{Duration, Instant};

use super::capabilities::UiCapabilities;
use crate::chat::HighlightTarget;
use crate::directives::InteractionEvent;

pub const DEFAULT_HIGHLIGHT_MS: u64 = 2000;

/// Turns interaction events into calls on a host's capabilities.
///
/// Highlights are timed: the marker goes on when the event is applied
/// and comes off when the host calls `expire` at or after
/// `next_deadline`.
pub struct Dispatcher<U: UiCapabilities> {
    ui: U,
    highlight: HighlightTarget,
}

impl<U: UiCapabilities> Dispatcher<U> {
    pub fn new(ui: U) -> Self {
        Self {
            ui,
            highlight: HighlightTarget::default(),
        }
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn apply(&mut self, event: &InteractionEvent, now: Instant) {
        tracing::debug!("Applying {} event", event.kind());
        match event {
            InteractionEvent::Navigate { section } => {
                self.ui.navigate(section);
                if self.ui.is_narrow_viewport() {
                    self.ui.close_overlay();
                }
            }
            InteractionEvent::Highlight {
                element_id,
                duration,
            } => {
                let millis = match duration {
                    Some(ms) if *ms > 0 => *ms,
                    _ => DEFAULT_HIGHLIGHT_MS,
                };
                // Durations past what the clock can represent get the default
                let until = now
                    .checked_add(Duration::from_millis(millis))
                    .unwrap_or_else(|| now + Duration::from_millis(DEFAULT_HIGHLIGHT_MS));
                if let Some(previous) = self.highlight.replace(element_id, until) {
                    self.ui.clear_highlight(&previous);
                }
                self.ui.highlight_element(element_id);
            }
            InteractionEvent::Focus { element_id } => self.ui.focus_element(element_id),
            InteractionEvent::Download { url } => self.ui.trigger_download(url),
            InteractionEvent::OpenLink { url } => self.ui.open_external(url),
            InteractionEvent::ScrollToTop {} => self.ui.scroll_to_top(),
            InteractionEvent::ToggleTheme { theme } => {
                self.ui.set_theme(*theme);
                if let Err(err) = self.ui.persist_theme(*theme) {
                    tracing::warn!("Failed to persist theme {}: {}", theme, err);
                }
            }
        }
    }

    /// Apply events in the order given.
    pub fn apply_all<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a InteractionEvent>,
        now: Instant,
    ) {
        for event in events {
            self.apply(event, now);
        }
    }

    /// Clear a highlight whose time is up.
    pub fn expire(&mut self, now: Instant) {
        if let Some(element_id) = self.highlight.expire(now) {
            self.ui.clear_highlight(&element_id);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.highlight.deadline()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::directives::Theme;

    #[derive(Default)]
    struct Recorder {
        narrow: bool,
        fail_persist: bool,
        calls: Vec<String>,
    }

    impl UiCapabilities for Recorder {
        fn navigate(&mut self, section: &str) {
            self.calls.push(format!("navigate:{}", section));
        }
        fn is_narrow_viewport(&self) -> bool {
            self.narrow
        }
        fn close_overlay(&mut self) {
            self.calls.push("close_overlay".to_string());
        }
        fn highlight_element(&mut self, element_id: &str) {
            self.calls.push(format!("highlight:{}", element_id));
        }
        fn clear_highlight(&mut self, element_id: &str) {
            self.calls.push(format!("clear:{}", element_id));
        }
        fn focus_element(&mut self, element_id: &str) {
            self.calls.push(format!("focus:{}", element_id));
        }
        fn trigger_download(&mut self, url: &str) {
            self.calls.push(format!("download:{}", url));
        }
        fn open_external(&mut self, url: &str) {
            self.calls.push(format!("open:{}", url));
        }
        fn scroll_to_top(&mut self) {
            self.calls.push("scroll_to_top".to_string());
        }
        fn set_theme(&mut self, theme: Theme) {
            self.calls.push(format!("theme:{}", theme));
        }
        fn persist_theme(&mut self, theme: Theme) -> anyhow::Result<()> {
            if self.fail_persist {
                return Err(anyhow!("read only"));
            }
            self.calls.push(format!("persist:{}", theme));
            Ok(())
        }
    }

    fn highlight(id: &str, duration: Option<u64>) -> InteractionEvent {
        InteractionEvent::Highlight {
            element_id: id.to_string(),
            duration,
        }
    }

    #[test]
    fn it_applies_events_in_order() {
        let mut dispatcher = Dispatcher::new(Recorder::default());
        let events = vec![
            InteractionEvent::Navigate {
                section: "projects".to_string(),
            },
            InteractionEvent::Focus {
                element_id: "pair-eyewear".to_string(),
            },
            InteractionEvent::Download {
                url: "/resume.pdf".to_string(),
            },
            InteractionEvent::OpenLink {
                url: "https://example.com".to_string(),
            },
            InteractionEvent::ScrollToTop {},
            InteractionEvent::ToggleTheme { theme: Theme::Dark },
        ];

        dispatcher.apply_all(&events, Instant::now());

        assert_eq!(
            dispatcher.ui().calls,
            vec![
                "navigate:projects",
                "focus:pair-eyewear",
                "download:/resume.pdf",
                "open:https://example.com",
                "scroll_to_top",
                "theme:dark",
                "persist:dark",
            ]
        );
    }

    #[test]
    fn it_closes_the_overlay_on_narrow_viewports() {
        let mut dispatcher = Dispatcher::new(Recorder {
            narrow: true,
            ..Default::default()
        });

        dispatcher.apply(
            &InteractionEvent::Navigate {
                section: "contact".to_string(),
            },
            Instant::now(),
        );

        assert_eq!(dispatcher.ui().calls, vec!["navigate:contact", "close_overlay"]);
    }

    #[test]
    fn it_clears_highlights_after_their_duration() {
        let now = Instant::now();
        let mut dispatcher = Dispatcher::new(Recorder::default());

        dispatcher.apply(&highlight("skills", Some(1500)), now);
        assert_eq!(
            dispatcher.next_deadline(),
            Some(now + Duration::from_millis(1500))
        );

        dispatcher.expire(now + Duration::from_millis(1499));
        assert_eq!(dispatcher.ui().calls, vec!["highlight:skills"]);

        dispatcher.expire(now + Duration::from_millis(1500));
        assert_eq!(dispatcher.ui().calls, vec!["highlight:skills", "clear:skills"]);
        assert_eq!(dispatcher.next_deadline(), None);
    }

    #[test]
    fn it_defaults_missing_or_zero_durations() {
        let now = Instant::now();
        let mut dispatcher = Dispatcher::new(Recorder::default());

        dispatcher.apply(&highlight("a", None), now);
        assert_eq!(
            dispatcher.next_deadline(),
            Some(now + Duration::from_millis(DEFAULT_HIGHLIGHT_MS))
        );

        dispatcher.apply(&highlight("b", Some(0)), now);
        assert_eq!(
            dispatcher.next_deadline(),
            Some(now + Duration::from_millis(DEFAULT_HIGHLIGHT_MS))
        );
    }

    #[test]
    fn it_accepts_very_long_durations() {
        let now = Instant::now();
        let mut dispatcher = Dispatcher::new(Recorder::default());

        dispatcher.apply(&highlight("skills", Some(u64::MAX)), now);

        assert_eq!(dispatcher.ui().calls, vec!["highlight:skills"]);
        assert!(dispatcher.next_deadline().is_some_and(|deadline| deadline > now));
    }

    #[test]
    fn it_clears_the_previous_highlight_first() {
        let now = Instant::now();
        let mut dispatcher = Dispatcher::new(Recorder::default());

        dispatcher.apply(&highlight("skills", Some(5000)), now);
        dispatcher.apply(&highlight("projects", Some(1000)), now);
        dispatcher.expire(now + Duration::from_secs(10));

        assert_eq!(
            dispatcher.ui().calls,
            vec![
                "highlight:skills",
                "clear:skills",
                "highlight:projects",
                "clear:projects"
            ]
        );
    }

    #[test]
    fn it_keeps_the_theme_when_persisting_fails() {
        let mut dispatcher = Dispatcher::new(Recorder {
            fail_persist: true,
            ..Default::default()
        });

        dispatcher.apply(
            &InteractionEvent::ToggleTheme {
                theme: Theme::Light,
            },
            Instant::now(),
        );

        assert_eq!(dispatcher.ui().calls, vec!["theme:light"]);
    }
}
