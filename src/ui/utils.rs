use postergrid::{CellStyle, ScrollOffset};
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate a string to fit within the given display width, handling Unicode properly.
/// Adds an ellipsis when something was cut.
pub fn truncate_by_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let budget = max_width - 1;

    for ch in s.chars() {
        let char_width = ch.width().unwrap_or(0);
        if current_width + char_width > budget {
            break;
        }
        result.push(ch);
        current_width += char_width;
    }

    result.push('…');
    result
}

/// Helper function to center a rect within another rect
pub fn center_area(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
    let [area] = Layout::horizontal([horizontal])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
    area
}

pub fn center_image(image_dimensions: Rect, available_area: Rect) -> Rect {
    let width = image_dimensions.width.min(available_area.width);
    let height = image_dimensions.height.min(available_area.height);
    Rect {
        x: available_area.x + (available_area.width - width) / 2,
        y: available_area.y + (available_area.height - height) / 2,
        width,
        height,
    }
}

/// Where a grid cell lands on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPlacement {
    pub rect: Rect,
    /// Part of the cell is outside the grid area
    pub clipped: bool,
}

/// Map a cell's pixel box to terminal cells inside `area`.
///
/// Both edges are rounded independently so neighbouring cells never overlap.
/// Returns None when nothing of the cell is visible.
pub fn place_cell(
    style: &CellStyle,
    scroll: ScrollOffset,
    area: Rect,
    cell_size: (u16, u16),
) -> Option<CellPlacement> {
    let cw = f64::from(cell_size.0.max(1));
    let ch = f64::from(cell_size.1.max(1));

    let left = ((style.left - scroll.left) / cw).round() as i64;
    let right = ((style.right() - scroll.left) / cw).round() as i64;
    let top = ((style.top - scroll.top) / ch).round() as i64;
    let bottom = ((style.bottom() - scroll.top) / ch).round() as i64;

    let (x0, x1) = (left.max(0), right.min(i64::from(area.width)));
    let (y0, y1) = (top.max(0), bottom.min(i64::from(area.height)));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(CellPlacement {
        rect: Rect {
            x: area.x + x0 as u16,
            y: area.y + y0 as u16,
            width: (x1 - x0) as u16,
            height: (y1 - y0) as u16,
        },
        clipped: x0 != left || x1 != right || y0 != top || y1 != bottom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_by_width() {
        assert_eq!(truncate_by_width("Heat", 10), "Heat");
        assert_eq!(truncate_by_width("The Godfather", 8), "The God…");
        assert_eq!(truncate_by_width("千と千尋の神隠し", 5), "千と…");
        assert_eq!(truncate_by_width("abc", 0), "");
    }

    #[test]
    fn test_place_cell_inside_area() {
        let area = Rect::new(1, 1, 80, 40);
        let style = CellStyle {
            left: 80.0,
            top: 32.0,
            width: 160.0,
            height: 240.0,
        };
        let placement = place_cell(&style, ScrollOffset::default(), area, (8, 16)).unwrap();
        assert_eq!(placement.rect, Rect::new(11, 3, 20, 15));
        assert!(!placement.clipped);
    }

    #[test]
    fn test_place_cell_clipped_and_hidden() {
        let area = Rect::new(0, 0, 40, 10);
        let style = CellStyle {
            left: 0.0,
            top: 0.0,
            width: 80.0,
            height: 240.0,
        };
        let scrolled = place_cell(&style, ScrollOffset::new(0.0, 160.0), area, (8, 16)).unwrap();
        assert_eq!(scrolled.rect, Rect::new(0, 0, 10, 5));
        assert!(scrolled.clipped);

        assert!(place_cell(&style, ScrollOffset::new(0.0, 240.0), area, (8, 16)).is_none());
    }

    #[test]
    fn test_neighbours_do_not_overlap() {
        let area = Rect::new(0, 0, 200, 50);
        let a = CellStyle {
            left: 0.0,
            top: 0.0,
            width: 101.5,
            height: 150.0,
        };
        let b = CellStyle {
            left: 101.5 + 12.0,
            ..a
        };
        let pa = place_cell(&a, ScrollOffset::default(), area, (8, 16)).unwrap();
        let pb = place_cell(&b, ScrollOffset::default(), area, (8, 16)).unwrap();
        assert!(pa.rect.right() <= pb.rect.x);
    }
}
