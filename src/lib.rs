//! Virtualized, responsive poster grid.
//!
//! The [`grid`] module holds everything needed to lay out and window a large
//! collection of posters: breakpoint driven geometry, the visible-window
//! arithmetic, the render state machine and the de-duplicating preload
//! scheduler. None of it touches a terminal; hosts plug in through
//! [`grid::HintSink`] and the cell factory closures.

pub mod grid;

pub use grid::{
    Breakpoint, Breakpoints, Capability, CellStyle, GridCell, GridController, GridFrame,
    GridHeight, GridItem, GridOptions, GridOutput, GridSpec, HintError, HintPriority, HintSink,
    InstanceId, LayoutEngine, LayoutGeometry, PosterItem, PreloadRegistry, PreloadScheduler,
    RenderState, ScrollOffset, Viewport, VirtualGrid, VisibleWindow,
};
