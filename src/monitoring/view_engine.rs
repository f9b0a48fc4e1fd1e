use crate::config::options::DEFAULT_CONFIG_PATH;
use crate::config::{Config, save_config};
use crate::events::command::HELP;
use crate::events::{Batch, ViewRequest, load_batch_file};
use crate::render::{NO_DATA_MESSAGE, canvas_geometry, render_lines};
use crate::view::{ProcessTreeView, ViewState};
use crossbeam_channel::Receiver;
use shared::Provider;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub fn start_view_engine(
    request_rx: Receiver<ViewRequest>,
    batch_rx: Receiver<Batch>,
    config: Arc<Config>,
    running: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        log::info!("Starting view engine...");
        run_view_engine(request_rx, batch_rx, &config, &running);
        log::info!("View engine stopped");
    })
}

/// Owns the view for the lifetime of the console; requests and batches are
/// applied one at a time in arrival order.
pub fn run_view_engine(
    request_rx: Receiver<ViewRequest>,
    batch_rx: Receiver<Batch>,
    config: &Config,
    running: &AtomicBool,
) {
    let mut view = ProcessTreeView::new(config.options.clone());
    let mut connected = true;

    while connected && running.load(Ordering::Relaxed) {
        crossbeam_channel::select! {
            recv(request_rx) -> request => match request {
                Ok(request) => emit(&handle_request(&mut view, config, request)),
                Err(_) => {
                    log::info!("Request channel disconnected");
                    connected = false;
                }
            },
            recv(batch_rx) -> batch => {
                if let Ok(batch) = batch {
                    emit(&apply_batch(&mut view, batch));
                }
            },
            recv(crossbeam_channel::after(Duration::from_millis(100))) -> _ => {}
        }
    }
}

fn emit(lines: &[String]) {
    for line in lines {
        log::info!("{}", line);
    }
}

pub fn apply_batch(view: &mut ProcessTreeView, batch: Batch) -> Vec<String> {
    log::debug!("Applying {}", batch);
    view.load_batch(&batch.records);
    tree_lines(view)
}

/// Applies one console request and returns the lines to show for it.
pub fn handle_request(
    view: &mut ProcessTreeView,
    config: &Config,
    request: ViewRequest,
) -> Vec<String> {
    match request {
        ViewRequest::Dispatch(command) => {
            let before = view.state().clone();
            view.dispatch(command);
            if changes_rows(&before, view.state()) {
                tree_lines(view)
            } else {
                selection_lines(view)
            }
        }
        ViewRequest::Show => tree_lines(view),
        ViewRequest::Stats => stats_lines(view),
        ViewRequest::Details(id) => match view.details(&id) {
            Some(details) => details
                .fields()
                .into_iter()
                .map(|(label, value)| format!("  {:<10} {}", label, value))
                .collect(),
            None => vec![format!("❓ No process with id '{}'", id)],
        },
        ViewRequest::Load(path) => match load_batch_file(&path) {
            Ok(records) => apply_batch(view, Batch::new(&path.display().to_string(), records)),
            Err(e) => {
                log::warn!("Failed to load {}: {}", path.display(), e);
                vec![format!("❌ {}", e)]
            }
        },
        ViewRequest::Save(path) => {
            let path = path.unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
            let mut saved = config.clone();
            saved.options = view.options().clone();
            saved.options.layout = view.state().layout;
            saved.options.color_mode = view.state().color_mode;
            match save_config(&saved, &path.to_string_lossy()) {
                Ok(()) => vec![format!("💾 Saved view options to {}", path.display())],
                Err(e) => {
                    log::warn!("Failed to save config: {:#}", e);
                    vec![format!("❌ {:#}", e)]
                }
            }
        }
        ViewRequest::Status => {
            let state = view.state();
            vec![
                format!("📊 View Status: {}", if view.has_data() { "LOADED" } else { "EMPTY" }),
                format!("  Layout: {}, color by {}", state.layout, state.color_mode),
                format!("  Search: '{}'", state.search_term),
                format!("  Filter active: {}", state.filter.is_active()),
                format!("  Selected: {}", state.selected.as_deref().unwrap_or("-")),
            ]
        }
        ViewRequest::Help => HELP.iter().map(|line| format!("  {}", line)).collect(),
        ViewRequest::Quit => Vec::new(),
    }
}

fn changes_rows(before: &ViewState, after: &ViewState) -> bool {
    before.expanded != after.expanded
        || before.filter != after.filter
        || before.search_term != after.search_term
        || before.layout != after.layout
}

fn selection_lines(view: &ProcessTreeView) -> Vec<String> {
    match view.selected_details() {
        Some(details) => vec![format!("👉 Selected {} [{}]", details.name, details.id)],
        None => Vec::new(),
    }
}

fn tree_lines(view: &ProcessTreeView) -> Vec<String> {
    let rows = render_lines(view);
    if rows.is_empty() {
        return vec![NO_DATA_MESSAGE.to_string()];
    }
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!(
        "🌳 {} visible processes ({})",
        rows.len(),
        canvas_geometry(rows.len(), view.options(), view.state().layout)
    ));
    lines.extend(rows);
    lines
}

fn stats_lines(view: &ProcessTreeView) -> Vec<String> {
    let stats = view.stats();
    let mut lines = vec![
        format!("📊 Processes: {} in {} trees", stats.total, stats.roots),
        format!("  Without id: {}", stats.unlinked),
        format!("  Visible: {}", stats.visible),
        format!("  Providers: {}", provider_labels(&stats.providers)),
    ];
    lines.extend(
        stats
            .by_status
            .iter()
            .map(|(status, count)| format!("  {}: {}", status, count)),
    );
    lines
}

/// Display names for provider tags, as offered in the provider filter.
pub fn provider_labels(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| Provider::from_tag(tag).display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewOptions;
    use crate::view::Command;
    use serde_json::json;

    fn batch() -> Batch {
        let records = json!([
            {"id": "1", "name": "explorer.exe"},
            {"id": "2", "name": "cmd.exe", "parentId": "1"}
        ]);
        let records = records
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().unwrap().clone())
            .collect();
        Batch::new("test", records)
    }

    #[test]
    fn empty_view_reports_no_data() {
        let mut view = ProcessTreeView::new(ViewOptions::default());
        assert_eq!(handle_request(&mut view, &Config::default(), ViewRequest::Show), vec![NO_DATA_MESSAGE]);
    }

    #[test]
    fn batch_then_commands() {
        let mut view = ProcessTreeView::new(ViewOptions::default());
        let lines = apply_batch(&mut view, batch());
        assert_eq!(lines.len(), 3);

        let lines = handle_request(&mut view, &Config::default(), ViewRequest::Dispatch(Command::ToggleExpand("1".into())));
        assert_eq!(lines.len(), 2);
        let lines = handle_request(&mut view, &Config::default(), ViewRequest::Dispatch(Command::CollapseAll));
        assert_eq!(lines.len(), 3);

        let lines = handle_request(&mut view, &Config::default(), ViewRequest::Dispatch(Command::Select("1".into())));
        assert_eq!(lines, vec!["👉 Selected explorer.exe [1]"]);
    }

    #[test]
    fn details_of_unknown_id() {
        let mut view = ProcessTreeView::new(ViewOptions::default());
        apply_batch(&mut view, batch());
        let lines = handle_request(&mut view, &Config::default(), ViewRequest::Details("2".into()));
        assert!(lines[0].contains("PID"));
        let lines = handle_request(&mut view, &Config::default(), ViewRequest::Details("7".into()));
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn engine_stops_when_requests_disconnect() {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (batch_tx, batch_rx) = crossbeam_channel::unbounded();
        batch_tx.send(batch()).unwrap();
        request_tx.send(ViewRequest::Stats).unwrap();
        drop(request_tx);
        let running = AtomicBool::new(true);
        run_view_engine(request_rx, batch_rx, &Config::default(), &running);
    }

    #[test]
    fn save_writes_current_presentation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("process_tree.json");
        let config = Config {
            batch_file: Some("hunt.json".into()),
            ..Config::default()
        };
        let mut view = ProcessTreeView::new(config.options.clone());
        handle_request(
            &mut view,
            &config,
            ViewRequest::Dispatch(Command::SetLayout(crate::view::Layout::Vertical)),
        );
        let lines = handle_request(&mut view, &config, ViewRequest::Save(Some(path.clone())));
        assert!(lines[0].starts_with("💾"));

        let saved = crate::config::load_config(path.to_str().unwrap());
        assert_eq!(saved.options.layout, crate::view::Layout::Vertical);
        assert_eq!(saved.batch_file.as_deref(), Some("hunt.json"));
    }

    #[test]
    fn stats_use_provider_display_names() {
        let mut view = ProcessTreeView::new(ViewOptions::default());
        apply_batch(&mut view, batch());
        let lines = handle_request(&mut view, &Config::default(), ViewRequest::Stats);
        assert!(lines.contains(&"  Providers: Unknown".to_string()));
        assert_eq!(
            provider_labels(&["crowdstrike".into(), "carbon".into()]),
            "CrowdStrike, Carbon"
        );
    }
}
