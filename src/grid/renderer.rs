//! Virtualized grid renderer.
//!
//! Only the cells inside the visible window (overscan included) are handed to
//! the cell factory. Cells past the end of the item list inside the window
//! come back as placeholders with the same geometry, so a partially filled
//! last row keeps its shape.

use super::window::{CellStyle, GridSpec, ScrollOffset, Viewport, VisibleWindow};

/// Text shown when there is nothing to render
pub const EMPTY_STATE_TEXT: &str = "No items to display";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    /// Container not measured yet; render a stably sized empty container
    #[default]
    Uninitialized,
    /// No items; render the empty-state text
    Empty,
    Populated,
}

impl RenderState {
    /// Empty wins over everything else, then measurement decides
    pub fn resolve(item_count: usize, measured: bool) -> Self {
        if item_count == 0 {
            RenderState::Empty
        } else if !measured {
            RenderState::Uninitialized
        } else {
            RenderState::Populated
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridCell<R> {
    Item {
        index: usize,
        style: CellStyle,
        content: R,
    },
    /// Inside the window but past the last item
    Placeholder { index: usize, style: CellStyle },
}

impl<R> GridCell<R> {
    pub fn index(&self) -> usize {
        match self {
            GridCell::Item { index, .. } | GridCell::Placeholder { index, .. } => *index,
        }
    }

    pub fn style(&self) -> &CellStyle {
        match self {
            GridCell::Item { style, .. } | GridCell::Placeholder { style, .. } => style,
        }
    }

    pub fn content(&self) -> Option<&R> {
        match self {
            GridCell::Item { content, .. } => Some(content),
            GridCell::Placeholder { .. } => None,
        }
    }
}

/// Result of one populated render pass
#[derive(Debug, Clone, PartialEq)]
pub struct GridFrame<R> {
    pub window: VisibleWindow,
    pub cells: Vec<GridCell<R>>,
    pub content_width: f64,
    pub content_height: f64,
    pub scroll: ScrollOffset,
}

impl<R> GridFrame<R> {
    pub fn items(&self) -> impl Iterator<Item = (usize, &CellStyle, &R)> {
        self.cells.iter().filter_map(|cell| match cell {
            GridCell::Item {
                index,
                style,
                content,
            } => Some((*index, style, content)),
            GridCell::Placeholder { .. } => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridRender<R> {
    Uninitialized,
    Empty { message: &'static str },
    Populated(GridFrame<R>),
}

/// Stateful renderer; remembers which [`RenderState`] it is in
#[derive(Debug, Default)]
pub struct VirtualGrid {
    state: RenderState,
    transitions: u64,
}

impl VirtualGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Number of state changes since creation
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Render the visible window, calling `factory(linear_index, style)` once
    /// per in-bounds cell.
    pub fn render<R, F>(
        &mut self,
        spec: &GridSpec,
        viewport: Viewport,
        scroll: ScrollOffset,
        mut factory: F,
    ) -> GridRender<R>
    where
        F: FnMut(usize, CellStyle) -> R,
    {
        let measured = spec.column_count > 0 && viewport.width > 0.0;
        self.set_state(RenderState::resolve(spec.item_count, measured));

        match self.state {
            RenderState::Empty => {
                return GridRender::Empty {
                    message: EMPTY_STATE_TEXT,
                };
            }
            RenderState::Uninitialized => return GridRender::Uninitialized,
            RenderState::Populated => {}
        }

        let Some(window) = VisibleWindow::compute(spec, viewport, scroll) else {
            return GridRender::Uninitialized;
        };

        let mut cells = Vec::with_capacity(window.cell_count());
        for row in window.rows() {
            for column in window.columns() {
                let index = spec.linear_index(row, column);
                let style = spec.cell_style(row, column);
                if index >= spec.item_count {
                    cells.push(GridCell::Placeholder { index, style });
                } else {
                    cells.push(GridCell::Item {
                        index,
                        style,
                        content: factory(index, style),
                    });
                }
            }
        }

        GridRender::Populated(GridFrame {
            window,
            cells,
            content_width: spec.content_width(),
            content_height: spec.content_height(),
            scroll,
        })
    }

    fn set_state(&mut self, next: RenderState) {
        if next != self.state {
            log::debug!("Grid state {:?} -> {:?}", self.state, next);
            self.state = next;
            self.transitions += 1;
        }
    }
}
