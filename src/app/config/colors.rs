use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ColorsConfig {
    #[serde(default = "ColorsConfig::default_border")]
    pub border: String,
    #[serde(default = "ColorsConfig::default_border_title")]
    pub border_title: String,
    #[serde(default = "ColorsConfig::default_poster_title")]
    pub poster_title: String,
    #[serde(default = "ColorsConfig::default_poster_meta")]
    pub poster_meta: String,
    #[serde(default = "ColorsConfig::default_priority_accent")]
    pub priority_accent: String,
    #[serde(default = "ColorsConfig::default_placeholder")]
    pub placeholder: String,
    #[serde(default = "ColorsConfig::default_status")]
    pub status: String,
    #[serde(default = "ColorsConfig::default_popup_highlight")]
    pub popup_highlight: String,
}

impl ColorsConfig {
    /// Parse a hex color string like "#FF5500" into RGB values
    pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }

    fn color_or(hex: &str, fallback: Color) -> Color {
        Self::parse_hex(hex)
            .map(|(r, g, b)| Color::Rgb(r, g, b))
            .unwrap_or(fallback)
    }

    pub fn border_color(&self) -> Color {
        Self::color_or(&self.border, Color::White)
    }

    pub fn border_title_color(&self) -> Color {
        Self::color_or(&self.border_title, Color::White)
    }

    pub fn poster_title_color(&self) -> Color {
        Self::color_or(&self.poster_title, Color::White)
    }

    pub fn poster_meta_color(&self) -> Color {
        Self::color_or(&self.poster_meta, Color::Gray)
    }

    pub fn priority_accent_color(&self) -> Color {
        Self::color_or(&self.priority_accent, Color::Yellow)
    }

    pub fn placeholder_color(&self) -> Color {
        Self::color_or(&self.placeholder, Color::DarkGray)
    }

    pub fn status_color(&self) -> Color {
        Self::color_or(&self.status, Color::Gray)
    }

    pub fn popup_highlight_color(&self) -> Color {
        Self::color_or(&self.popup_highlight, Color::Yellow)
    }

    fn default_border() -> String {
        "#5C6370".to_string()
    }

    fn default_border_title() -> String {
        "#FAE280".to_string()
    }

    fn default_poster_title() -> String {
        "#E5E9F0".to_string()
    }

    fn default_poster_meta() -> String {
        "#8A93A6".to_string()
    }

    fn default_priority_accent() -> String {
        "#FAE280".to_string()
    }

    fn default_placeholder() -> String {
        "#3B4048".to_string()
    }

    fn default_status() -> String {
        "#8A93A6".to_string()
    }

    fn default_popup_highlight() -> String {
        "#FAE280".to_string()
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            border: Self::default_border(),
            border_title: Self::default_border_title(),
            poster_title: Self::default_poster_title(),
            poster_meta: Self::default_poster_meta(),
            priority_accent: Self::default_priority_accent(),
            placeholder: Self::default_placeholder(),
            status: Self::default_status(),
            popup_highlight: Self::default_popup_highlight(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(ColorsConfig::parse_hex("#FF5500"), Some((255, 85, 0)));
        assert_eq!(ColorsConfig::parse_hex("00ff00"), Some((0, 255, 0)));
        assert_eq!(ColorsConfig::parse_hex("#FFF"), None);
        assert_eq!(ColorsConfig::parse_hex("#GG0000"), None);
    }

    #[test]
    fn test_invalid_color_falls_back() {
        let colors = ColorsConfig {
            border: "nope".to_string(),
            ..Default::default()
        };
        assert_eq!(colors.border_color(), Color::White);
    }
}
