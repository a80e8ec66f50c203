use postergrid::{GridCell, GridItem, GridOutput};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::app::binds::{GridAction, describe_key};
use crate::app::config::Config;
use crate::ui::utils::{center_area, place_cell, truncate_by_width};
use crate::ui::widgets::{PosterCell, StatusInfo, create_status_line, render_poster};

const DEFAULT_TITLE: &str = "Posters";

/// Render config warnings popup centered on screen
fn render_config_warnings_popup(frame: &mut Frame, warnings: &[String], config: &Config) {
    let area = frame.area();

    let title = " Config Warnings ";
    let footer = "Press any key to close";

    let max_content_width = warnings
        .iter()
        .map(|w| w.width())
        .max()
        .unwrap_or(20)
        .max(title.width())
        .max(footer.width());

    // content + padding (2 on each side) + borders
    let popup_width = (max_content_width + 6).min(area.width.saturating_sub(4) as usize) as u16;
    let text_width = popup_width.saturating_sub(4) as usize;

    // warnings + blank after title + blank before footer + footer + borders
    let popup_height = (warnings.len() + 5).min(area.height.saturating_sub(4) as usize) as u16;

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let mut lines: Vec<Line> = vec![Line::from("")];
    for warning in warnings {
        lines.push(Line::from(Span::styled(
            format!(" {}", truncate_by_width(warning, text_width)),
            Style::default().fg(config.colors.poster_title_color()),
        )));
    }
    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            footer,
            Style::default().fg(config.colors.popup_highlight_color()),
        ))
        .centered(),
    );

    let popup_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(config.colors.popup_highlight_color()))
        .title(Line::from(title).fg(config.colors.border_title_color()))
        .style(Style::default().bg(ratatui::style::Color::Black));

    let popup_text = Paragraph::new(lines)
        .block(popup_block)
        .alignment(Alignment::Left);

    frame.render_widget(popup_text, popup_area);
}

fn render_centered_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let width = (text.width() as u16).min(area.width);
    let text_area = center_area(area, Constraint::Length(width), Constraint::Length(1));
    frame.render_widget(Paragraph::new(text.to_string()).style(style), text_area);
}

fn key_help(app: &App) -> String {
    [
        (GridAction::ScrollDown, "scroll"),
        (GridAction::Remount, "remount"),
        (GridAction::Quit, "quit"),
    ]
    .iter()
    .filter_map(|(action, label)| {
        let (modifiers, code) = *app.key_binds.keys_for(*action).first()?;
        Some(format!("{} {}", describe_key(modifiers, code), label))
    })
    .collect::<Vec<_>>()
    .join("  ")
}

/// Renders the user interface.
///
/// Returns the image paths of on-screen posters that are not cached yet, for
/// the caller to queue.
pub fn render(frame: &mut Frame<'_>, app: &mut App) -> Vec<String> {
    let [grid_area, status_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    let config = &app.config;
    let directory_name = app
        .library
        .root
        .as_deref()
        .and_then(|root| root.file_name())
        .map(|name| name.to_string_lossy());
    let title = format!(
        " {} ",
        config
            .grid
            .class_name
            .as_deref()
            .or(directory_name.as_deref())
            .unwrap_or(DEFAULT_TITLE)
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(config.colors.border_color()))
        .title(Line::from(title).fg(config.colors.border_title_color()));
    let inner = block.inner(grid_area);
    frame.render_widget(block, grid_area);

    app.observe_area(inner, inner.height);
    let cell_size = app.cell_size();

    // The grid may be shorter than the pane when its height is a percentage or fixed
    let grid_height_px = app.controller.viewport(app.viewport_height).height;
    let grid_rows = ((grid_height_px / f64::from(cell_size.1)).floor() as u16).min(inner.height);
    let grid_rect = Rect {
        height: grid_rows,
        ..inner
    };

    let output = app.controller.render(
        &app.library.items,
        &app.capability,
        app.viewport_height,
        app.scroll,
        |_picker, _item, priority, index| PosterCell { index, priority },
    );

    let mut missing = Vec::new();
    let mut window = None;
    let placeholder_style = Style::default().fg(app.config.colors.placeholder_color());

    match output {
        GridOutput::Loading { .. } => {
            render_centered_text(frame, grid_rect, "Loading terminal graphics…", placeholder_style);
        }
        // Nothing measured yet; the empty pane keeps its size
        GridOutput::Uninitialized { .. } => {}
        GridOutput::Empty { message } => {
            render_centered_text(frame, grid_rect, message, placeholder_style);
        }
        GridOutput::Populated(grid) => {
            app.scroll = grid.scroll;
            window = Some(grid.window);
            let images_enabled = !app.show_config_warnings_popup;

            for cell in &grid.cells {
                let GridCell::Item { index, style, content } = cell else {
                    // Past the last item; left blank
                    continue;
                };
                let item = &app.library.items[*index];
                if let Some(path) = item.image_url()
                    && !app.posters.contains(path)
                {
                    missing.push(path.to_string());
                }

                let Some(placement) = place_cell(style, grid.scroll, grid_rect, cell_size) else {
                    continue;
                };
                let Some(picker) = app.capability.get() else {
                    continue;
                };
                let poster = item.image_url().and_then(|path| app.posters.get_mut(path));
                render_poster(
                    frame,
                    placement,
                    item,
                    *content,
                    poster,
                    picker,
                    &app.config,
                    images_enabled,
                );
            }
        }
    }

    let derived = app.controller.derived();
    let status = StatusInfo {
        item_count: app.library.items.len(),
        column_count: if app.controller.geometry().is_ready() {
            derived.column_count
        } else {
            0
        },
        row_count: derived.row_count,
        window,
        cache: app.posters.stats(),
        hints: app.head.len(),
        loading: app.loader.queued_len(),
        remounts: app.remounts,
        graphics_ready: app.capability.is_ready(),
        key_help: key_help(app),
    };
    frame.render_widget(create_status_line(&status, &app.config), status_area);

    if app.show_config_warnings_popup && !app.config_warnings.is_empty() {
        render_config_warnings_popup(frame, &app.config_warnings, &app.config);
    }

    missing
}
