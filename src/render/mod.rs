//! Renderer-facing helpers: node colors, canvas sizing and a plain-text
//! rendition of the visible rows.

pub mod layout;
pub mod palette;
pub mod text;

pub use layout::{CanvasGeometry, canvas_geometry, canvas_height};
pub use palette::{NO_DATA_MESSAGE, node_color, provider_color, status_color};
pub use text::{render_lines, row_line, truncate_command_line};
