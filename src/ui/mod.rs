pub mod renderer;
pub mod utils;
pub mod widgets;

pub use renderer::render;
