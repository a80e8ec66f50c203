//! Visible-window arithmetic for a fixed-size cell grid.

/// Size of the scrolling viewport, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Current scroll position of the viewport, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOffset {
    pub left: f64,
    pub top: f64,
}

impl ScrollOffset {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Position and size of one cell relative to the grid content origin
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellStyle {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CellStyle {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Everything the window computation needs to know about the grid
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridSpec {
    pub column_count: usize,
    pub row_count: usize,
    pub item_count: usize,
    pub item_width: f64,
    pub item_height: f64,
    pub gap: f64,
    pub overscan_count: usize,
}

impl GridSpec {
    pub fn column_stride(&self) -> f64 {
        self.item_width + self.gap
    }

    pub fn row_stride(&self) -> f64 {
        self.item_height + self.gap
    }

    /// Total scrollable width, gaps between columns included
    pub fn content_width(&self) -> f64 {
        span(self.column_count, self.item_width, self.gap)
    }

    /// Total scrollable height, gaps between rows included
    pub fn content_height(&self) -> f64 {
        span(self.row_count, self.item_height, self.gap)
    }

    pub fn linear_index(&self, row: usize, column: usize) -> usize {
        row * self.column_count + column
    }

    /// Style for the cell at (`row`, `column`).
    ///
    /// The fixed-size base position has no notion of gaps, so every cell is
    /// shifted by its index along each axis times the gap. Both axes get the
    /// same correction; otherwise cells drift further apart as the index grows.
    pub fn cell_style(&self, row: usize, column: usize) -> CellStyle {
        let base_left = column as f64 * self.item_width;
        let base_top = row as f64 * self.item_height;
        CellStyle {
            left: base_left + column as f64 * self.gap,
            top: base_top + row as f64 * self.gap,
            width: self.item_width,
            height: self.item_height,
        }
    }
}

fn span(count: usize, size: f64, gap: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    count as f64 * size + (count - 1) as f64 * gap
}

/// Inclusive (row, column) range of cells to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    pub first_row: usize,
    pub last_row: usize,
    pub first_column: usize,
    pub last_column: usize,
}

impl VisibleWindow {
    /// Window for the given scroll position, overscan band included.
    ///
    /// Returns `None` when the grid has no rows or columns.
    pub fn compute(spec: &GridSpec, viewport: Viewport, scroll: ScrollOffset) -> Option<Self> {
        let (first_row, last_row) = visible_range(
            scroll.top,
            viewport.height,
            spec.row_stride(),
            spec.row_count,
            spec.overscan_count,
        )?;
        let (first_column, last_column) = visible_range(
            scroll.left,
            viewport.width,
            spec.column_stride(),
            spec.column_count,
            spec.overscan_count,
        )?;

        Some(Self {
            first_row,
            last_row,
            first_column,
            last_column,
        })
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.first_row..=self.last_row
    }

    pub fn columns(&self) -> std::ops::RangeInclusive<usize> {
        self.first_column..=self.last_column
    }

    pub fn cell_count(&self) -> usize {
        (self.last_row - self.first_row + 1) * (self.last_column - self.first_column + 1)
    }

    pub fn contains(&self, row: usize, column: usize) -> bool {
        self.rows().contains(&row) && self.columns().contains(&column)
    }
}

/// Inclusive index range along one axis intersecting `[offset, offset + extent)`,
/// widened by `overscan` on both sides
fn visible_range(
    offset: f64,
    extent: f64,
    stride: f64,
    count: usize,
    overscan: usize,
) -> Option<(usize, usize)> {
    if count == 0 {
        return None;
    }

    let stride = if stride.is_finite() && stride > 0.0 {
        stride
    } else {
        1.0
    };
    let offset = if offset.is_finite() { offset.max(0.0) } else { 0.0 };
    let extent = if extent.is_finite() { extent.max(0.0) } else { 0.0 };
    let max_index = count - 1;

    let first = ((offset / stride).floor() as usize).min(max_index);
    let end = ((offset + extent) / stride).ceil() as usize;
    let last = end.saturating_sub(1).max(first).min(max_index);

    Some((
        first.saturating_sub(overscan),
        last.saturating_add(overscan).min(max_index),
    ))
}
