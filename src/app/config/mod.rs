pub mod binds;
pub mod colors;
pub mod config;
pub mod layout;
pub mod logging;
pub mod posters;

pub use config::Config;
pub use layout::LayoutConfig;
pub use logging::LoggingConfig;
pub use posters::PostersConfig;
