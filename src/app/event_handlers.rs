use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseEventKind};
use postergrid::ScrollOffset;

use super::App;
use crate::app::binds::GridAction;

/// Rows moved per mouse wheel notch
const WHEEL_ROWS: isize = 1;

/// Trait for event handling
pub trait EventHandlers {
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()>;
    fn on_key_event(&mut self, key: KeyEvent);
    fn apply_action(&mut self, action: GridAction);
    fn quit(&mut self);
}

impl EventHandlers for App {
    /// Read one pending terminal event and update the state of [`App`].
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        match crossterm::event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => self.scroll_rows(WHEEL_ROWS),
                MouseEventKind::ScrollUp => self.scroll_rows(-WHEEL_ROWS),
                _ => {}
            },
            Event::Resize(columns, rows) => {
                log::debug!("Terminal resized to {}x{}", columns, rows);
                // Re-observed on the next draw
                self.observed = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_key_event(&mut self, key: KeyEvent) {
        if self.show_config_warnings_popup {
            self.show_config_warnings_popup = false;
            return;
        }

        if let Some(action) = self.key_binds.handle_key(key) {
            log::debug!("User action: {:?}", action);
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: GridAction) {
        let height = self.viewport_height;
        match action {
            GridAction::ScrollUp => self.scroll_rows(-1),
            GridAction::ScrollDown => self.scroll_rows(1),
            GridAction::PageUp => {
                let rows = self.controller.rows_per_page(height) as isize;
                self.scroll_rows(-rows);
            }
            GridAction::PageDown => {
                let rows = self.controller.rows_per_page(height) as isize;
                self.scroll_rows(rows);
            }
            GridAction::GoToTop => self.scroll = ScrollOffset::default(),
            GridAction::GoToBottom => {
                let last = self.library.items.len().saturating_sub(1);
                self.scroll = self.controller.scroll_to_index(self.scroll, last, height);
            }
            GridAction::Remount => self.remount(),
            GridAction::Quit => self.quit(),
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

impl App {
    fn scroll_rows(&mut self, rows: isize) {
        self.scroll = self
            .controller
            .scroll_by_rows(self.scroll, rows, self.viewport_height);
    }
}
