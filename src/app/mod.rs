use crate::app::binds::KeyBinds;
use crate::app::config::Config;
use crate::app::head::PosterHead;
use crate::app::library::Library;
use crate::app::poster_cache::PosterCache;
use crate::app::poster_loader::PosterLoader;
use postergrid::{Capability, GridController, PreloadScheduler, ScrollOffset};
use ratatui::layout::Rect;
use ratatui_image::picker::Picker;
use std::sync::Arc;

pub mod binds;
pub mod cli;
pub mod config;
pub mod constructor;
pub mod event_handlers;
pub mod head;
pub mod library;
pub mod logging;
pub mod main_loop;
pub mod poster_cache;
pub mod poster_loader;
pub mod terminal;

/// Last terminal area the layout was observed with, plus the cell size used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedArea {
    pub area: Rect,
    pub cell_size: (u16, u16),
}

/// Main application state
pub struct App {
    pub running: bool,
    pub config: Config,
    pub library: Library,
    pub controller: GridController,
    pub scroll: ScrollOffset,
    /// Terminal graphics support, loaded after startup
    pub capability: Capability<Picker>,
    pub posters: PosterCache,
    pub head: Arc<PosterHead>,
    pub loader: PosterLoader,
    pub key_binds: KeyBinds,
    pub config_warnings: Vec<String>,
    pub show_config_warnings_popup: bool,
    /// Height of the host viewport in pixels
    pub viewport_height: f64,
    pub observed: Option<ObservedArea>,
    /// Times the grid was torn down and rebuilt
    pub remounts: u32,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("running", &self.running)
            .field("items", &self.library.items.len())
            .field("scroll", &self.scroll)
            .field("capability_ready", &self.capability.is_ready())
            .field("observed", &self.observed)
            .field("remounts", &self.remounts)
            .finish()
    }
}

impl App {
    /// Pixel size of one terminal cell
    pub fn cell_size(&self) -> (u16, u16) {
        match self.capability.get() {
            Some(picker) => {
                let (w, h) = picker.font_size();
                (w.max(1), h.max(1))
            }
            None => self.config.layout.cell_size(),
        }
    }

    /// Feed the grid area to the layout engine when it changed
    pub fn observe_area(&mut self, area: Rect, host_height: u16) {
        let cell_size = self.cell_size();
        let observed = ObservedArea { area, cell_size };
        if self.observed == Some(observed) {
            return;
        }

        let width_px = f64::from(area.width) * f64::from(cell_size.0);
        self.viewport_height = f64::from(host_height) * f64::from(cell_size.1);
        let geometry = self.controller.observe_width(width_px);
        log::debug!(
            "Observed grid area {}x{} cells ({}px wide): {} columns",
            area.width,
            area.height,
            width_px,
            geometry.column_count
        );

        self.observed = Some(observed);
        self.controller.sync(&self.library.items);
        self.scroll = self.controller.clamp_scroll(self.scroll, self.viewport_height);
    }

    /// Drop the grid (releasing its preload hints) and build a fresh one
    pub fn remount(&mut self) {
        self.controller = build_controller(&self.config, self.head.clone());
        self.scroll = ScrollOffset::default();
        self.observed = None;
        self.remounts += 1;
        log::info!("Grid remounted ({} so far)", self.remounts);
    }
}

/// Grid controller for the current config, backed by the process-wide registry
pub fn build_controller(config: &Config, head: Arc<PosterHead>) -> GridController {
    GridController::new(
        config.grid.clone(),
        config.layout.build_engine(),
        PreloadScheduler::new(head),
    )
}
