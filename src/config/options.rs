use crate::view::{ColorMode, Layout};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/process_tree.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub options: ViewOptions,
    /// Batch file the console watches for new data, if any.
    pub batch_file: Option<String>,
    pub poll_interval_ms: u64,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    pub node_size: u32,
    pub max_depth: usize,
    pub horizontal_spacing: u32,
    pub vertical_spacing: u32,
    pub show_command_line: bool,
    /// Command lines longer than this are cut and suffixed with "...".
    pub horizontal_label_width: usize,
    pub vertical_label_width: usize,
    /// Nodes shallower than this start expanded when a batch loads.
    pub initial_expand_depth: usize,
    pub min_height: u32,
    pub max_height: u32,
    pub layout: Layout,
    pub color_mode: ColorMode,
    pub theme: Theme,
    pub search_highlight_color: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            options: ViewOptions::default(),
            batch_file: None,
            poll_interval_ms: 1000,
            log_level: "info".to_string(),
        }
    }
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            node_size: 20,
            max_depth: 5,
            horizontal_spacing: 180,
            vertical_spacing: 40,
            show_command_line: true,
            horizontal_label_width: 40,
            vertical_label_width: 30,
            initial_expand_depth: 3,
            min_height: 400,
            max_height: 1200,
            layout: Layout::Horizontal,
            color_mode: ColorMode::Status,
            theme: Theme::Dark,
            search_highlight_color: "#F82B60".to_string(),
        }
    }
}

impl ViewOptions {
    pub fn label_width(&self, layout: Layout) -> usize {
        match layout {
            Layout::Horizontal => self.horizontal_label_width,
            Layout::Vertical => self.vertical_label_width,
        }
    }
}

impl Config {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

pub fn load_config(config_path: &str) -> Config {
    if Path::new(config_path).exists() {
        match fs::read_to_string(config_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded configuration from {}", config_path);
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}. Using defaults.", e);
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file: {}. Using defaults.", e);
            }
        }
    }

    log::info!("Using default configuration");
    Config::default()
}

pub fn save_config(config: &Config, config_path: &str) -> anyhow::Result<()> {
    if let Some(dir) = Path::new(config_path).parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content).with_context(|| format!("writing {}", config_path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert_eq!(load_config(path.to_str().unwrap()), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(
            &path,
            r#"{"options": {"layout": "vertical", "initial_expand_depth": 1}, "log_level": "debug"}"#,
        )
        .unwrap();
        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.options.layout, Layout::Vertical);
        assert_eq!(config.options.initial_expand_depth, 1);
        assert_eq!(config.options.node_size, 20);
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(path.to_str().unwrap()), Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cfg.json");
        let mut config = Config::default();
        config.options.theme = Theme::Light;
        config.batch_file = Some("batch.json".into());
        save_config(&config, path.to_str().unwrap()).unwrap();
        assert_eq!(load_config(path.to_str().unwrap()), config);
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = Config {
            log_level: "chatty".into(),
            ..Config::default()
        };
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
    }
}
