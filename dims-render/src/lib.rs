pub mod font;
pub mod pattern;
pub mod render;
pub mod shape;
pub mod text;

pub use font::{find_system_font, load_font};
pub use render::{CUE_SIZE_PX, SkiaRenderer};
pub use shape::outline_path;
