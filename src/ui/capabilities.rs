use anyhow::Result;

use crate::directives::Theme;

/// The effects a host environment can perform on behalf of the
/// assistant. A browser implements these against the page, the
/// terminal client prints them.
pub trait UiCapabilities {
    fn navigate(&mut self, section: &str);
    /// True below 640px wide, where the chat overlay covers the page
    /// and has to close for a navigation to be visible.
    fn is_narrow_viewport(&self) -> bool;
    fn close_overlay(&mut self);
    fn highlight_element(&mut self, element_id: &str);
    fn clear_highlight(&mut self, element_id: &str);
    /// Bring an element into view without marking it.
    fn focus_element(&mut self, element_id: &str);
    fn trigger_download(&mut self, url: &str);
    fn open_external(&mut self, url: &str);
    fn scroll_to_top(&mut self);
    fn set_theme(&mut self, theme: Theme);
    fn persist_theme(&mut self, theme: Theme) -> Result<()>;
}
