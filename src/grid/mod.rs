pub mod capability;
pub mod controller;
pub mod item;
pub mod layout;
pub mod preload;
pub mod renderer;
pub mod window;

pub use capability::Capability;
pub use controller::{Derived, GridController, GridHeight, GridOptions, GridOutput, HeightParseError};
pub use item::{GridItem, PosterItem};
pub use layout::{Breakpoint, Breakpoints, LayoutEngine, LayoutGeometry};
pub use preload::{
    HintError, HintPriority, HintSink, InstanceId, PreloadRegistry, PreloadScheduler,
    SharedRegistry,
};
pub use renderer::{EMPTY_STATE_TEXT, GridCell, GridFrame, GridRender, RenderState, VirtualGrid};
pub use window::{CellStyle, GridSpec, ScrollOffset, Viewport, VisibleWindow};
