pub mod options;

pub use options::{Config, Theme, ViewOptions, load_config, save_config};
