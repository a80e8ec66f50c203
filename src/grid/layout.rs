//! Responsive layout engine.
//!
//! Turns an observed container width into grid geometry using a set of
//! breakpoint rules. The width comes from whatever measures the container
//! (not the window), so the grid works inside arbitrary panes.

use serde::{Deserialize, Serialize};

/// Width / height of poster art
pub const DEFAULT_ASPECT_RATIO: f64 = 2.0 / 3.0;

/// One breakpoint rule: applies when the container is at least `min_width` wide
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Breakpoint {
    pub min_width: f64,
    pub columns: usize,
    pub gap: f64,
    #[serde(default)]
    pub min_item_width: f64,
}

impl Breakpoint {
    pub const fn new(min_width: f64, columns: usize, gap: f64, min_item_width: f64) -> Self {
        Self {
            min_width,
            columns,
            gap,
            min_item_width,
        }
    }
}

/// Breakpoint rules, kept sorted by threshold, largest first
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "Vec<Breakpoint>", into = "Vec<Breakpoint>")]
pub struct Breakpoints {
    rules: Vec<Breakpoint>,
}

impl Breakpoints {
    pub fn new(mut rules: Vec<Breakpoint>) -> Self {
        rules.retain(|rule| rule.min_width.is_finite());
        if rules.is_empty() {
            return Self::default();
        }
        rules.sort_by(|a, b| b.min_width.total_cmp(&a.min_width));
        Self { rules }
    }

    /// Pick the rule for `width`.
    ///
    /// Rules are checked from the largest threshold down and the first one the
    /// width satisfies wins. Widths below every threshold get the smallest rule.
    pub fn resolve(&self, width: f64) -> &Breakpoint {
        self.rules
            .iter()
            .find(|rule| width >= rule.min_width)
            .or_else(|| self.rules.last())
            .unwrap_or(&FALLBACK_RULE)
    }

    pub fn rules(&self) -> &[Breakpoint] {
        &self.rules
    }
}

const FALLBACK_RULE: Breakpoint = Breakpoint::new(0.0, 1, 0.0, 0.0);

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            rules: vec![
                Breakpoint::new(1536.0, 8, 24.0, 160.0),
                Breakpoint::new(1280.0, 7, 20.0, 150.0),
                Breakpoint::new(1024.0, 6, 16.0, 140.0),
                Breakpoint::new(768.0, 5, 16.0, 120.0),
                Breakpoint::new(640.0, 4, 12.0, 110.0),
                Breakpoint::new(0.0, 3, 8.0, 96.0),
            ],
        }
    }
}

impl From<Vec<Breakpoint>> for Breakpoints {
    fn from(rules: Vec<Breakpoint>) -> Self {
        Self::new(rules)
    }
}

impl From<Breakpoints> for Vec<Breakpoint> {
    fn from(breakpoints: Breakpoints) -> Self {
        breakpoints.rules
    }
}

/// Derived grid geometry, in pixels.
///
/// `column_count == 0` means the container has not been measured yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutGeometry {
    pub column_count: usize,
    pub item_width: f64,
    pub item_height: f64,
    pub container_width: f64,
    pub gap: f64,
}

impl LayoutGeometry {
    /// Geometry for a container that has no usable width yet
    pub fn unmeasured() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.column_count > 0 && self.container_width > 0.0
    }

    /// Width actually occupied by the columns and the gaps between them
    pub fn grid_width(&self) -> f64 {
        if self.column_count == 0 {
            return 0.0;
        }
        let columns = self.column_count as f64;
        columns * self.item_width + (columns - 1.0) * self.gap
    }

    /// Compute geometry for `width` from scratch
    pub fn compute(width: f64, breakpoints: &Breakpoints, aspect_ratio: f64) -> Self {
        if !width.is_finite() || width <= 0.0 {
            return Self::unmeasured();
        }

        let rule = breakpoints.resolve(width);
        let gap = if rule.gap.is_finite() { rule.gap.max(0.0) } else { 0.0 };

        let mut columns = rule.columns.max(1);
        if rule.min_item_width > 0.0 {
            let fit = ((width + gap) / (rule.min_item_width + gap)).floor();
            if fit.is_finite() {
                columns = columns.min(fit as usize).max(1);
            }
        }

        let item_width = ((width - gap * (columns as f64 - 1.0)) / columns as f64).max(0.0);
        let aspect_ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            DEFAULT_ASPECT_RATIO
        };

        Self {
            column_count: columns,
            item_width,
            item_height: item_width / aspect_ratio,
            container_width: width,
            gap,
        }
    }
}

/// Keeps the current geometry in step with the observed container width
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    breakpoints: Breakpoints,
    aspect_ratio: f64,
    geometry: LayoutGeometry,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(Breakpoints::default(), DEFAULT_ASPECT_RATIO)
    }
}

impl LayoutEngine {
    pub fn new(breakpoints: Breakpoints, aspect_ratio: f64) -> Self {
        Self {
            breakpoints,
            aspect_ratio,
            geometry: LayoutGeometry::unmeasured(),
        }
    }

    /// Feed a width measurement. Called for every resize notification.
    pub fn observe(&mut self, width: f64) -> LayoutGeometry {
        let geometry = LayoutGeometry::compute(width, &self.breakpoints, self.aspect_ratio);
        if geometry != self.geometry {
            log::debug!(
                "Layout recomputed for width {:.0}: {} columns, item {:.1}x{:.1}, gap {:.0}",
                width,
                geometry.column_count,
                geometry.item_width,
                geometry.item_height,
                geometry.gap
            );
        }
        self.geometry = geometry;
        geometry
    }

    pub fn geometry(&self) -> LayoutGeometry {
        self.geometry
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }
}
