//! Grid controller: wires layout, preloading and the virtual renderer together.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::capability::Capability;
use super::item::GridItem;
use super::layout::{LayoutEngine, LayoutGeometry};
use super::preload::PreloadScheduler;
use super::renderer::{EMPTY_STATE_TEXT, GridFrame, GridRender, VirtualGrid};
use super::window::{GridSpec, ScrollOffset, Viewport};

pub const DEFAULT_PRIORITY_COUNT: usize = 12;
pub const DEFAULT_OVERSCAN_COUNT: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeightParseError {
    #[error("invalid grid height '{0}': expected a number, '<n>px' or '<n>vh'")]
    Invalid(String),
}

/// Height of the grid viewport
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawHeight", into = "String")]
pub enum GridHeight {
    Pixels(f64),
    /// Percentage of the host viewport height
    ViewportPercent(f64),
}

impl GridHeight {
    /// Height in pixels for a host viewport of `viewport_height` pixels
    pub fn resolve(&self, viewport_height: f64) -> f64 {
        let height = match *self {
            GridHeight::Pixels(px) => px,
            GridHeight::ViewportPercent(pct) => viewport_height * pct / 100.0,
        };
        if height.is_finite() { height.max(0.0) } else { 0.0 }
    }
}

impl Default for GridHeight {
    fn default() -> Self {
        GridHeight::ViewportPercent(100.0)
    }
}

impl FromStr for GridHeight {
    type Err = HeightParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let invalid = || HeightParseError::Invalid(s.to_string());

        let (number, unit): (&str, fn(f64) -> GridHeight) =
            if let Some(n) = trimmed.strip_suffix("vh").or_else(|| trimmed.strip_suffix('%')) {
                (n, GridHeight::ViewportPercent)
            } else if let Some(n) = trimmed.strip_suffix("px") {
                (n, GridHeight::Pixels)
            } else {
                (trimmed.as_str(), GridHeight::Pixels)
            };

        let value: f64 = number.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }
        Ok(unit(value))
    }
}

impl fmt::Display for GridHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridHeight::Pixels(px) => write!(f, "{}px", px),
            GridHeight::ViewportPercent(pct) => write!(f, "{}vh", pct),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHeight {
    Number(f64),
    Text(String),
}

impl TryFrom<RawHeight> for GridHeight {
    type Error = HeightParseError;

    fn try_from(raw: RawHeight) -> Result<Self, Self::Error> {
        match raw {
            RawHeight::Number(px) if px.is_finite() && px >= 0.0 => Ok(GridHeight::Pixels(px)),
            RawHeight::Number(px) => Err(HeightParseError::Invalid(px.to_string())),
            RawHeight::Text(text) => text.parse(),
        }
    }
}

impl From<GridHeight> for String {
    fn from(height: GridHeight) -> Self {
        height.to_string()
    }
}

/// Options recognized by the grid
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridOptions {
    pub height: GridHeight,
    /// Styling passthrough for the host
    pub class_name: Option<String>,
    /// Leading items rendered with priority and preloaded
    pub priority_count: usize,
    /// Extra rows/columns rendered outside the viewport
    pub overscan_count: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            height: GridHeight::default(),
            class_name: None,
            priority_count: DEFAULT_PRIORITY_COUNT,
            overscan_count: DEFAULT_OVERSCAN_COUNT,
        }
    }
}

/// Values derived from the items, the column count and the priority count
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Derived {
    pub item_count: usize,
    /// Always at least 1
    pub column_count: usize,
    pub row_count: usize,
    pub grid_width: f64,
    pub priority_count: usize,
}

impl Derived {
    pub fn compute(item_count: usize, geometry: &LayoutGeometry, priority_count: usize) -> Self {
        let column_count = geometry.column_count.max(1);
        Self {
            item_count,
            column_count,
            row_count: item_count.div_ceil(column_count),
            grid_width: geometry.grid_width(),
            priority_count,
        }
    }

    pub fn is_priority(&self, index: usize) -> bool {
        index < self.priority_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MemoKey {
    items: u64,
    item_count: usize,
    geometry: LayoutGeometry,
    priority_count: usize,
}

/// What the host should draw this frame
#[derive(Debug, Clone, PartialEq)]
pub enum GridOutput<R> {
    /// Rendering capability still loading; draw a placeholder of this size
    Loading { width: f64, height: f64 },
    /// Container not measured; draw an empty container of this height
    Uninitialized { height: f64 },
    Empty { message: &'static str },
    Populated(GridFrame<R>),
}

/// Composition root for one grid instance
#[derive(Debug)]
pub struct GridController {
    options: GridOptions,
    layout: LayoutEngine,
    renderer: VirtualGrid,
    scheduler: PreloadScheduler,
    derived: Derived,
    memo: Option<MemoKey>,
}

impl GridController {
    pub fn new(options: GridOptions, layout: LayoutEngine, scheduler: PreloadScheduler) -> Self {
        Self {
            options,
            layout,
            renderer: VirtualGrid::new(),
            scheduler,
            derived: Derived::default(),
            memo: None,
        }
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn set_priority_count(&mut self, priority_count: usize) {
        self.options.priority_count = priority_count;
    }

    pub fn geometry(&self) -> LayoutGeometry {
        self.layout.geometry()
    }

    pub fn renderer(&self) -> &VirtualGrid {
        &self.renderer
    }

    pub fn scheduler(&self) -> &PreloadScheduler {
        &self.scheduler
    }

    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    /// Report the container width. Call on every resize.
    pub fn observe_width(&mut self, width: f64) -> LayoutGeometry {
        self.layout.observe(width)
    }

    /// Bring derived values and preloads in line with `items`.
    ///
    /// Cheap when nothing changed since the last call.
    pub fn sync<I: GridItem>(&mut self, items: &[I]) -> &Derived {
        let priority_count = self.options.priority_count;
        let geometry = self.layout.geometry();
        let key = MemoKey {
            items: fingerprint(items, priority_count),
            item_count: items.len(),
            geometry,
            priority_count,
        };

        if self.memo != Some(key) {
            self.derived = Derived::compute(items.len(), &geometry, priority_count);

            let items_changed = self.memo.is_none_or(|memo| {
                memo.items != key.items || memo.priority_count != key.priority_count
            });
            if items_changed {
                let urls = items.iter().filter_map(|item| item.image_url());
                let issued = self.scheduler.schedule(urls, priority_count);
                if issued > 0 {
                    log::debug!("Scheduled {} poster preloads", issued);
                }
            }

            self.memo = Some(key);
        }

        &self.derived
    }

    /// Spec for the window computation, with the current geometry
    pub fn spec(&self) -> GridSpec {
        let geometry = self.layout.geometry();
        GridSpec {
            column_count: if geometry.is_ready() {
                self.derived.column_count
            } else {
                0
            },
            row_count: self.derived.row_count,
            item_count: self.derived.item_count,
            item_width: geometry.item_width,
            item_height: geometry.item_height,
            gap: geometry.gap,
            overscan_count: self.options.overscan_count,
        }
    }

    /// Viewport for a host viewport `viewport_height` pixels tall
    pub fn viewport(&self, viewport_height: f64) -> Viewport {
        Viewport::new(
            self.layout.geometry().container_width,
            self.options.height.resolve(viewport_height),
        )
    }

    /// Render one frame.
    ///
    /// `render_item(capability, item, priority, index)` runs once per visible
    /// item; `priority` is true for the first `priority_count` items.
    pub fn render<I, C, R, F>(
        &mut self,
        items: &[I],
        capability: &Capability<C>,
        viewport_height: f64,
        scroll: ScrollOffset,
        mut render_item: F,
    ) -> GridOutput<R>
    where
        I: GridItem,
        F: FnMut(&C, &I, bool, usize) -> R,
    {
        self.sync(items);
        let viewport = self.viewport(viewport_height);

        // The empty state needs no capability, so it is not held back behind Loading
        if items.is_empty() && !capability.is_ready() {
            return GridOutput::Empty {
                message: EMPTY_STATE_TEXT,
            };
        }

        let Some(primitive) = capability.get() else {
            return GridOutput::Loading {
                width: viewport.width,
                height: viewport.height,
            };
        };

        let spec = self.spec();
        let scroll = self.clamp_scroll(scroll, viewport_height);
        let derived = self.derived;

        let render = self.renderer.render(&spec, viewport, scroll, |index, _style| {
            render_item(primitive, &items[index], derived.is_priority(index), index)
        });

        match render {
            GridRender::Uninitialized => GridOutput::Uninitialized {
                height: viewport.height,
            },
            GridRender::Empty { message } => GridOutput::Empty { message },
            GridRender::Populated(frame) => GridOutput::Populated(frame),
        }
    }

    /// Keep `scroll` inside the scrollable content
    pub fn clamp_scroll(&self, scroll: ScrollOffset, viewport_height: f64) -> ScrollOffset {
        let spec = self.spec();
        let viewport = self.viewport(viewport_height);
        let max_left = (spec.content_width() - viewport.width).max(0.0);
        let max_top = (spec.content_height() - viewport.height).max(0.0);
        ScrollOffset::new(
            clamp(scroll.left, max_left),
            clamp(scroll.top, max_top),
        )
    }

    /// Move `rows` rows down (negative: up)
    pub fn scroll_by_rows(
        &self,
        scroll: ScrollOffset,
        rows: isize,
        viewport_height: f64,
    ) -> ScrollOffset {
        let stride = self.spec().row_stride();
        let top = scroll.top + rows as f64 * stride;
        self.clamp_scroll(ScrollOffset::new(scroll.left, top), viewport_height)
    }

    /// Scroll just far enough that item `index` is fully visible
    pub fn scroll_to_index(
        &self,
        scroll: ScrollOffset,
        index: usize,
        viewport_height: f64,
    ) -> ScrollOffset {
        let spec = self.spec();
        if spec.column_count == 0 || spec.item_count == 0 {
            return scroll;
        }
        let index = index.min(spec.item_count - 1);
        let style = spec.cell_style(index / spec.column_count, index % spec.column_count);
        let height = self.viewport(viewport_height).height;

        let top = if style.top < scroll.top {
            style.top
        } else if style.bottom() > scroll.top + height {
            style.bottom() - height
        } else {
            scroll.top
        };
        self.clamp_scroll(ScrollOffset::new(scroll.left, top), viewport_height)
    }

    /// Number of rows that fit in the viewport, at least 1
    pub fn rows_per_page(&self, viewport_height: f64) -> usize {
        let stride = self.spec().row_stride();
        if stride <= 0.0 {
            return 1;
        }
        ((self.viewport(viewport_height).height / stride).floor() as usize).max(1)
    }
}

fn clamp(value: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

/// Hash of the image URLs that drive preloading
fn fingerprint<I: GridItem>(items: &[I], priority_count: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    items.len().hash(&mut hasher);
    for item in items.iter().take(priority_count) {
        item.image_url().hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::item::PosterItem;
    use crate::grid::layout::{Breakpoint, Breakpoints, DEFAULT_ASPECT_RATIO};
    use crate::grid::preload::{HintError, HintPriority, HintSink, PreloadRegistry};
    use crate::grid::renderer::{EMPTY_STATE_TEXT, RenderState};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeHead {
        appended: Mutex<Vec<String>>,
        hints: Mutex<Vec<String>>,
    }

    impl HintSink for FakeHead {
        fn contains(&self, url: &str) -> bool {
            self.hints.lock().unwrap().iter().any(|h| h == url)
        }

        fn append(&self, url: &str, _priority: HintPriority) {
            self.appended.lock().unwrap().push(url.to_string());
            self.hints.lock().unwrap().push(url.to_string());
        }

        fn remove(&self, url: &str) -> Result<(), HintError> {
            let mut hints = self.hints.lock().unwrap();
            let before = hints.len();
            hints.retain(|h| h != url);
            if hints.len() == before {
                return Err(HintError::AlreadyRemoved(url.to_string()));
            }
            Ok(())
        }
    }

    fn posters(n: usize) -> Vec<PosterItem> {
        (0..n)
            .map(|i| PosterItem {
                key: Some(format!("item-{i}")),
                image: Some(format!("/posters/{i}.jpg")),
                ..Default::default()
            })
            .collect()
    }

    fn five_columns() -> LayoutEngine {
        LayoutEngine::new(
            Breakpoints::new(vec![Breakpoint::new(0.0, 5, 16.0, 0.0)]),
            DEFAULT_ASPECT_RATIO,
        )
    }

    fn controller(head: &Arc<FakeHead>, options: GridOptions) -> GridController {
        let scheduler = PreloadScheduler::with_registry(head.clone(), PreloadRegistry::shared());
        GridController::new(options, five_columns(), scheduler)
    }

    #[test]
    fn test_row_count_is_ceiling() {
        for n in 0..40 {
            for c in 1..8 {
                let geometry = LayoutGeometry {
                    column_count: c,
                    item_width: 10.0,
                    item_height: 15.0,
                    container_width: 100.0,
                    gap: 0.0,
                };
                let derived = Derived::compute(n, &geometry, 12);
                assert_eq!(derived.row_count, n.div_ceil(c));
            }
        }
    }

    #[test]
    fn test_zero_columns_are_clamped() {
        let derived = Derived::compute(9, &LayoutGeometry::unmeasured(), 12);
        assert_eq!(derived.column_count, 1);
        assert_eq!(derived.row_count, 9);
    }

    #[test]
    fn test_hundred_items_five_columns() {
        let head = Arc::new(FakeHead::default());
        let mut grid = controller(&head, GridOptions::default());
        let items = posters(100);
        grid.observe_width(1064.0);

        let output = grid.render(
            &items,
            &Capability::Ready(()),
            100_000.0,
            ScrollOffset::default(),
            |_, _, priority, index| (index, priority),
        );

        assert_eq!(grid.derived().row_count, 20);
        let GridOutput::Populated(frame) = output else {
            panic!("expected populated grid");
        };
        assert_eq!(frame.items().count(), 100);
        for (index, _, &(rendered_index, priority)) in frame.items() {
            assert_eq!(index, rendered_index);
            assert_eq!(priority, index < 12, "wrong priority for index {index}");
        }
        assert_eq!(head.appended.lock().unwrap().len(), 12);
    }

    #[test]
    fn test_empty_items_render_empty_state() {
        let head = Arc::new(FakeHead::default());
        let mut grid = controller(&head, GridOptions::default());
        grid.observe_width(1024.0);

        let output: GridOutput<()> = grid.render(
            &posters(0),
            &Capability::Ready(()),
            800.0,
            ScrollOffset::default(),
            |_, _, _, _| (),
        );
        assert_eq!(
            output,
            GridOutput::Empty {
                message: EMPTY_STATE_TEXT
            }
        );
    }

    #[test]
    fn test_width_zero_to_measured_transitions_once() {
        let head = Arc::new(FakeHead::default());
        let mut grid = controller(&head, GridOptions::default());
        let items = posters(30);
        let mut states = Vec::new();

        for width in [0.0, 0.0, 1024.0, 1024.0] {
            grid.observe_width(width);
            let _ = grid.render(
                &items,
                &Capability::Ready(()),
                800.0,
                ScrollOffset::default(),
                |_, _, _, index| index,
            );
            states.push(grid.renderer().state());
        }

        assert_eq!(
            states,
            vec![
                RenderState::Uninitialized,
                RenderState::Uninitialized,
                RenderState::Populated,
                RenderState::Populated,
            ]
        );
        assert_eq!(grid.renderer().transitions(), 1);
    }

    #[test]
    fn test_capability_not_ready_renders_loading() {
        let head = Arc::new(FakeHead::default());
        let mut grid = controller(&head, GridOptions::default());
        grid.observe_width(1024.0);

        let output: GridOutput<()> = grid.render(
            &posters(5),
            &Capability::<()>::NotReady,
            600.0,
            ScrollOffset::default(),
            |_, _, _, _| panic!("no items before the capability loads"),
        );
        assert_eq!(
            output,
            GridOutput::Loading {
                width: 1024.0,
                height: 600.0
            }
        );
        // Preloading runs off the item list, not the render state
        assert_eq!(head.appended.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_empty_items_skip_loading_placeholder() {
        let head = Arc::new(FakeHead::default());
        let mut grid = controller(&head, GridOptions::default());

        let output: GridOutput<()> = grid.render(
            &posters(0),
            &Capability::<()>::NotReady,
            600.0,
            ScrollOffset::default(),
            |_, _, _, _| panic!("factory called for an empty list"),
        );
        assert_eq!(
            output,
            GridOutput::Empty {
                message: EMPTY_STATE_TEXT
            }
        );
    }

    #[test]
    fn test_repeated_renders_do_not_rehint() {
        let head = Arc::new(FakeHead::default());
        let mut grid = controller(&head, GridOptions::default());
        let items = posters(40);
        grid.observe_width(1064.0);

        for top in [0.0, 300.0, 900.0, 0.0] {
            let _ = grid.render(
                &items,
                &Capability::Ready(()),
                600.0,
                ScrollOffset::new(0.0, top),
                |_, _, _, index| index,
            );
        }
        assert_eq!(head.appended.lock().unwrap().len(), 12);
    }

    #[test]
    fn test_priority_count_change_recomputes() {
        let head = Arc::new(FakeHead::default());
        let mut grid = controller(&head, GridOptions::default());
        let items = posters(40);
        grid.observe_width(1064.0);

        grid.sync(&items);
        assert_eq!(grid.derived().priority_count, 12);

        grid.set_priority_count(20);
        grid.sync(&items);
        assert_eq!(grid.derived().priority_count, 20);
        assert!(grid.derived().is_priority(19));
        assert_eq!(head.appended.lock().unwrap().len(), 20);
    }

    #[test]
    fn test_column_change_recomputes_rows() {
        let head = Arc::new(FakeHead::default());
        let scheduler = PreloadScheduler::with_registry(head.clone(), PreloadRegistry::shared());
        let mut grid = GridController::new(GridOptions::default(), LayoutEngine::default(), scheduler);
        let items = posters(48);

        grid.observe_width(1920.0);
        assert_eq!(grid.sync(&items).row_count, 6);

        grid.observe_width(360.0);
        assert_eq!(grid.sync(&items).row_count, 16);
    }

    #[test]
    fn test_same_column_resize_updates_grid_width() {
        let head = Arc::new(FakeHead::default());
        let mut grid = controller(&head, GridOptions::default());
        let items = posters(48);

        grid.observe_width(1100.0);
        let before = *grid.sync(&items);

        grid.observe_width(1200.0);
        let after = *grid.sync(&items);

        assert_eq!(before.column_count, after.column_count);
        assert_eq!(after.grid_width, grid.geometry().grid_width());
        assert!(after.grid_width > before.grid_width);
        // Resizing alone never reschedules preloads
        assert_eq!(head.appended.lock().unwrap().len(), 12);
    }

    #[test]
    fn test_dropping_controller_releases_hints() {
        let head = Arc::new(FakeHead::default());
        let mut grid = controller(&head, GridOptions::default());
        grid.sync(&posters(3));
        assert_eq!(head.hints.lock().unwrap().len(), 3);

        drop(grid);
        assert!(head.hints.lock().unwrap().is_empty());
    }

    #[test]
    fn test_scroll_helpers() {
        let head = Arc::new(FakeHead::default());
        let options = GridOptions {
            height: GridHeight::Pixels(632.0),
            ..Default::default()
        };
        let mut grid = controller(&head, options);
        let items = posters(100);
        grid.observe_width(1064.0);
        grid.sync(&items);

        // 200x300 cells, 16px gap: rows are 316px apart
        let scroll = grid.scroll_by_rows(ScrollOffset::default(), 3, 1000.0);
        assert_eq!(scroll.top, 948.0);

        let clamped = grid.scroll_by_rows(scroll, -10, 1000.0);
        assert_eq!(clamped.top, 0.0);

        let bottom = grid.clamp_scroll(ScrollOffset::new(0.0, 1e9), 1000.0);
        assert_eq!(bottom.top, 20.0 * 316.0 - 16.0 - 632.0);

        let to_last = grid.scroll_to_index(ScrollOffset::default(), 99, 1000.0);
        assert_eq!(to_last.top, bottom.top);

        assert_eq!(grid.rows_per_page(1000.0), 2);
    }

    #[test]
    fn test_grid_height_parsing() {
        assert_eq!("480px".parse(), Ok(GridHeight::Pixels(480.0)));
        assert_eq!("70vh".parse(), Ok(GridHeight::ViewportPercent(70.0)));
        assert_eq!("50%".parse(), Ok(GridHeight::ViewportPercent(50.0)));
        assert_eq!(" 320 ".parse(), Ok(GridHeight::Pixels(320.0)));
        assert!("tall".parse::<GridHeight>().is_err());
        assert!("-5px".parse::<GridHeight>().is_err());

        assert_eq!(GridHeight::ViewportPercent(50.0).resolve(900.0), 450.0);
        assert_eq!(GridHeight::Pixels(300.0).resolve(900.0), 300.0);
    }

    #[test]
    fn test_options_from_toml() {
        let options: GridOptions = toml::from_str(
            r#"
            height = "60vh"
            class_name = "posters"
            priority_count = 8
            "#,
        )
        .unwrap();
        assert_eq!(options.height, GridHeight::ViewportPercent(60.0));
        assert_eq!(options.class_name.as_deref(), Some("posters"));
        assert_eq!(options.priority_count, 8);
        assert_eq!(options.overscan_count, DEFAULT_OVERSCAN_COUNT);

        let numeric: GridOptions = toml::from_str("height = 540").unwrap();
        assert_eq!(numeric.height, GridHeight::Pixels(540.0));
    }
}
