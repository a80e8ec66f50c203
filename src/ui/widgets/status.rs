use postergrid::VisibleWindow;
use ratatui::{
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::config::Config;
use crate::app::poster_cache::CacheStats;

/// Everything shown on the status line
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    pub item_count: usize,
    pub column_count: usize,
    pub row_count: usize,
    pub window: Option<VisibleWindow>,
    pub cache: CacheStats,
    pub hints: usize,
    /// Posters queued for decoding
    pub loading: usize,
    pub remounts: u32,
    pub graphics_ready: bool,
    /// e.g. "q quit"
    pub key_help: String,
}

impl StatusInfo {
    pub fn text(&self) -> String {
        let mut parts = vec![format!("{} posters", self.item_count)];

        if self.column_count > 0 && self.item_count > 0 {
            parts.push(format!("{}×{}", self.column_count, self.row_count));
        }
        if let Some(window) = self.window {
            parts.push(format!(
                "rows {}-{}",
                window.first_row + 1,
                window.last_row + 1
            ));
        }

        parts.push(format!(
            "cache {}/{} ({:.0}% hits)",
            self.cache.entries,
            self.cache.entries + self.cache.pending,
            self.cache.hit_rate()
        ));
        parts.push(format!("{} preloads", self.hints));
        if self.loading > 0 {
            parts.push(format!("{} decoding", self.loading));
        }

        if self.remounts > 0 {
            parts.push(format!("remounted {}×", self.remounts));
        }
        if !self.graphics_ready {
            parts.push("graphics: probing".to_string());
        }

        parts.join(" │ ")
    }
}

pub fn create_status_line<'a>(info: &StatusInfo, config: &Config) -> Paragraph<'a> {
    let status_color = config.colors.status_color();
    let accent = config.colors.border_title_color();

    let mut spans = vec![Span::styled(
        format!(" {}", info.text()),
        Style::default().fg(status_color),
    )];
    if !info.key_help.is_empty() {
        spans.push(Span::styled(
            format!("  {}", info.key_help),
            Style::default().fg(accent),
        ));
    }

    Paragraph::new(Line::from(spans))
}
