pub mod batch_watcher;
pub mod console;
pub mod view_engine;
