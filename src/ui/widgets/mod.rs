pub mod poster;
pub mod status;

pub use self::poster::{PosterCell, render_poster};
pub use self::status::{StatusInfo, create_status_line};
