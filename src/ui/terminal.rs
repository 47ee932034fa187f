//! Capabilities for the terminal chat client. There's no page to act
//! on, so effects are described to the user instead and the theme
//! preference is kept in a file under the storage path.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::capabilities::UiCapabilities;
use crate::directives::Theme;

const THEME_FILE: &str = "theme";

pub struct TerminalUi<W: Write> {
    out: W,
    base_url: String,
    theme_path: PathBuf,
    theme: Theme,
    highlighted: Option<String>,
}

impl TerminalUi<io::Stdout> {
    pub fn stdout(storage_path: &str, base_url: &str) -> Self {
        Self::new(io::stdout(), storage_path, base_url)
    }
}

impl<W: Write> TerminalUi<W> {
    pub fn new(out: W, storage_path: &str, base_url: &str) -> Self {
        let theme_path = Path::new(storage_path).join(THEME_FILE);
        let theme = load_theme(&theme_path).unwrap_or(Theme::Light);
        Self {
            out,
            base_url: base_url.trim_end_matches('/').to_string(),
            theme_path,
            theme,
            highlighted: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn say(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "  {}", line) {
            tracing::warn!("Failed to write to terminal: {}", err);
        }
    }

    // Relative paths are served by the chat server
    fn absolute(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }
}

fn load_theme(path: &Path) -> Option<Theme> {
    let raw = fs::read_to_string(path).ok()?;
    match raw.trim().parse() {
        Ok(theme) => Some(theme),
        Err(err) => {
            tracing::warn!("Ignoring saved theme in {}: {}", path.display(), err);
            None
        }
    }
}

impl<W: Write> UiCapabilities for TerminalUi<W> {
    fn navigate(&mut self, section: &str) {
        self.say(&format!("-> Navigating to #{}", section));
    }

    fn is_narrow_viewport(&self) -> bool {
        false
    }

    fn close_overlay(&mut self) {}

    fn highlight_element(&mut self, element_id: &str) {
        self.highlighted = Some(element_id.to_string());
        self.say(&format!("* Highlighting #{}", element_id));
    }

    fn clear_highlight(&mut self, element_id: &str) {
        if self.highlighted.as_deref() == Some(element_id) {
            self.highlighted = None;
        }
    }

    fn focus_element(&mut self, element_id: &str) {
        self.say(&format!("-> Focusing #{}", element_id));
    }

    fn trigger_download(&mut self, url: &str) {
        let url = self.absolute(url);
        self.say(&format!("Download: {}", url));
    }

    fn open_external(&mut self, url: &str) {
        self.say(&format!("Link: {}", url));
    }

    fn scroll_to_top(&mut self) {
        self.say("^ Back to the top");
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.say(&format!("Theme set to {}", theme));
    }

    fn persist_theme(&mut self, theme: Theme) -> Result<()> {
        fs::write(&self.theme_path, theme.to_string())
            .with_context(|| format!("Failed to write {}", self.theme_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(ui: TerminalUi<Vec<u8>>) -> String {
        String::from_utf8(ui.into_inner()).unwrap()
    }

    #[test]
    fn it_persists_the_theme_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().to_str().unwrap();

        let mut ui = TerminalUi::new(Vec::new(), storage, "http://localhost:2222");
        assert_eq!(ui.theme(), Theme::Light);
        ui.set_theme(Theme::Dark);
        ui.persist_theme(Theme::Dark).unwrap();

        let reopened = TerminalUi::new(Vec::new(), storage, "http://localhost:2222");
        assert_eq!(reopened.theme(), Theme::Dark);
        assert_eq!(
            fs::read_to_string(dir.path().join(THEME_FILE)).unwrap(),
            "dark"
        );
    }

    #[test]
    fn it_ignores_a_corrupt_theme_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(THEME_FILE), "sepia").unwrap();

        let ui = TerminalUi::new(Vec::new(), dir.path().to_str().unwrap(), "");

        assert_eq!(ui.theme(), Theme::Light);
    }

    #[test]
    fn it_reports_persistence_failures() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let mut ui = TerminalUi::new(Vec::new(), missing.to_str().unwrap(), "");

        assert!(ui.persist_theme(Theme::Dark).is_err());
    }

    #[test]
    fn it_describes_effects() {
        let dir = tempfile::tempdir().unwrap();
        let mut ui = TerminalUi::new(
            Vec::new(),
            dir.path().to_str().unwrap(),
            "http://localhost:2222/",
        );

        ui.navigate("projects");
        ui.highlight_element("skills");
        ui.trigger_download("/resume.pdf");
        ui.open_external("https://linkedin.com/in/someone");

        assert_eq!(ui.highlighted(), Some("skills"));
        ui.clear_highlight("skills");
        assert_eq!(ui.highlighted(), None);
        assert_eq!(
            output(ui),
            "  -> Navigating to #projects\n  \
             * Highlighting #skills\n  \
             Download: http://localhost:2222/resume.pdf\n  \
             Link: https://linkedin.com/in/someone\n"
        );
    }
}
