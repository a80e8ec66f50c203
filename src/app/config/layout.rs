use postergrid::grid::layout::DEFAULT_ASPECT_RATIO;
use postergrid::{Breakpoints, LayoutEngine};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LayoutConfig {
    /// Poster width / height
    #[serde(default = "LayoutConfig::default_aspect_ratio")]
    pub aspect_ratio: f64,
    /// Pixel width of one terminal cell, used until the terminal reports its font size
    #[serde(default = "LayoutConfig::default_cell_width_px")]
    pub cell_width_px: u16,
    /// Pixel height of one terminal cell
    #[serde(default = "LayoutConfig::default_cell_height_px")]
    pub cell_height_px: u16,
    #[serde(default)]
    pub breakpoints: Breakpoints,
}

impl LayoutConfig {
    fn default_aspect_ratio() -> f64 {
        DEFAULT_ASPECT_RATIO
    }

    fn default_cell_width_px() -> u16 {
        8
    }

    fn default_cell_height_px() -> u16 {
        16
    }

    /// Cell size in pixels, never zero
    pub fn cell_size(&self) -> (u16, u16) {
        (self.cell_width_px.max(1), self.cell_height_px.max(1))
    }

    pub fn build_engine(&self) -> LayoutEngine {
        LayoutEngine::new(self.breakpoints.clone(), self.aspect_ratio)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: Self::default_aspect_ratio(),
            cell_width_px: Self::default_cell_width_px(),
            cell_height_px: Self::default_cell_height_px(),
            breakpoints: Breakpoints::default(),
        }
    }
}
