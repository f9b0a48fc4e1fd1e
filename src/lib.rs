//! View model for EDR process trees: raw provider records in, a filtered,
//! searchable, expandable forest of processes out.

pub mod config;
pub mod events;
pub mod monitoring;
pub mod normalize;
pub mod render;
pub mod tree;
pub mod view;

pub use config::{Config, ViewOptions};
pub use events::{Batch, ViewRequest};
pub use tree::Forest;
pub use view::{Command, ProcessTreeView, ViewState};
