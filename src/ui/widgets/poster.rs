use image::imageops::FilterType;
use postergrid::PosterItem;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use ratatui_image::{Resize, StatefulImage, picker::Picker};

use crate::app::config::Config;
use crate::app::poster_cache::CachedPoster;
use crate::ui::utils::{CellPlacement, center_image, truncate_by_width};

/// Smallest inner area worth drawing an image into
const MIN_IMAGE_WIDTH: u16 = 4;
const MIN_IMAGE_HEIGHT: u16 = 3;

/// What the grid's cell factory hands back for one visible item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PosterCell {
    pub index: usize,
    pub priority: bool,
}

/// How far along a poster's art is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtState {
    NoArt,
    Loading,
    Missing,
    Ready,
}

impl ArtState {
    pub fn of(item: &PosterItem, poster: Option<&CachedPoster>) -> Self {
        match (item.image.as_deref(), poster) {
            (None | Some(""), _) => ArtState::NoArt,
            (Some(_), None) => ArtState::Loading,
            (Some(_), Some(p)) if p.is_missing() => ArtState::Missing,
            (Some(_), Some(_)) => ArtState::Ready,
        }
    }

    fn label(self) -> Option<&'static str> {
        match self {
            ArtState::NoArt => Some("no art"),
            ArtState::Loading => Some("loading…"),
            ArtState::Missing => Some("art unavailable"),
            ArtState::Ready => None,
        }
    }
}

/// Draw one poster: the image when it can be shown, a text card otherwise
#[allow(clippy::too_many_arguments)]
pub fn render_poster(
    frame: &mut Frame<'_>,
    placement: CellPlacement,
    item: &PosterItem,
    cell: PosterCell,
    poster: Option<&mut CachedPoster>,
    picker: &Picker,
    config: &Config,
    images_enabled: bool,
) {
    let border_color = if cell.priority {
        config.colors.priority_accent_color()
    } else {
        config.colors.border_color()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(placement.rect);
    frame.render_widget(block, placement.rect);

    let state = ArtState::of(item, poster.as_deref());
    let can_draw_image = images_enabled
        && !placement.clipped
        && state == ArtState::Ready
        && inner.width >= MIN_IMAGE_WIDTH
        && inner.height > MIN_IMAGE_HEIGHT;

    if can_draw_image && let Some(protocol) = poster.and_then(|p| p.protocol(picker)) {
        let [image_area, title_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        let resize = Resize::Scale(Some(FilterType::Lanczos3));
        let img_rect = protocol.size_for(resize.clone(), image_area);
        let centered_area = center_image(img_rect, image_area);
        let image = StatefulImage::default().resize(resize);
        frame.render_stateful_widget(image, centered_area, &mut *protocol);

        if let Some(Err(e)) = protocol.last_encoding_result() {
            log::warn!("Failed to encode poster {}: {:?}", cell.index, e);
        }

        let title = truncate_by_width(item.display_title(), title_area.width as usize);
        frame.render_widget(
            Paragraph::new(title)
                .style(Style::default().fg(config.colors.poster_title_color()))
                .centered(),
            title_area,
        );
        return;
    }

    frame.render_widget(poster_card(item, state, inner.width, config), inner);
}

fn poster_card<'a>(item: &PosterItem, state: ArtState, width: u16, config: &Config) -> Paragraph<'a> {
    let width = width as usize;
    let title_style = Style::default().fg(config.colors.poster_title_color()).bold();
    let meta_style = Style::default().fg(config.colors.poster_meta_color());

    let mut lines = vec![Line::from(Span::styled(
        truncate_by_width(item.display_title(), width),
        title_style,
    ))];

    let meta = poster_meta(item);
    if !meta.is_empty() {
        lines.push(Line::from(Span::styled(truncate_by_width(&meta, width), meta_style)));
    }

    if let Some(label) = state.label() {
        lines.push(Line::from(""));
        lines.push(
            Line::from(truncate_by_width(label, width))
                .style(Style::default().fg(config.colors.placeholder_color())),
        );
    }

    Paragraph::new(lines).centered()
}

/// "1995 · ★ 8.3"
pub fn poster_meta(item: &PosterItem) -> String {
    let mut parts = Vec::new();
    if let Some(year) = item.year {
        parts.push(year.to_string());
    }
    if let Some(rating) = item.rating.filter(|r| r.is_finite()) {
        parts.push(format!("★ {:.1}", rating));
    }
    parts.join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_meta() {
        let mut item = PosterItem::default();
        assert_eq!(poster_meta(&item), "");

        item.year = Some(1995);
        assert_eq!(poster_meta(&item), "1995");

        item.rating = Some(8.3);
        assert_eq!(poster_meta(&item), "1995 · ★ 8.3");
    }

    #[test]
    fn test_art_state_without_image() {
        let item = PosterItem::default();
        assert_eq!(ArtState::of(&item, None), ArtState::NoArt);

        let item = PosterItem {
            image: Some("/p/a.png".to_string()),
            ..Default::default()
        };
        assert_eq!(ArtState::of(&item, None), ArtState::Loading);
    }
}
