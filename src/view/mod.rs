//! Presentation state of a process tree and the commands that change it.
//!
//! `ProcessTreeView` owns one forest and one `ViewState`. Every user
//! interaction goes through `dispatch`, which swaps in the state computed by
//! the pure `reduce`.

pub mod reducer;
pub mod state;
pub mod summary;
pub mod visible;

pub use reducer::{Command, reduce};
pub use state::{ALL, ColorMode, FilterSpec, Layout, ViewState};
pub use summary::{ForestStats, ProcessDetails};
pub use visible::{VisibleNode, VisibleNodes, visible_nodes};

use crate::config::ViewOptions;
use crate::normalize::normalize_batch;
use crate::tree::Forest;
use shared::{NormalizedProcess, RawRecord};

#[derive(Debug, Clone, Default)]
pub struct ProcessTreeView {
    options: ViewOptions,
    forest: Forest,
    state: ViewState,
    loaded: bool,
}

impl ProcessTreeView {
    pub fn new(options: ViewOptions) -> Self {
        let state = ViewState {
            layout: options.layout,
            color_mode: options.color_mode,
            ..ViewState::default()
        };
        Self {
            options,
            forest: Forest::default(),
            state,
            loaded: false,
        }
    }

    /// Replaces the displayed data with a freshly delivered batch.
    pub fn load_batch(&mut self, records: &[RawRecord]) {
        self.load_processes(normalize_batch(records));
    }

    pub fn load_processes(&mut self, processes: Vec<NormalizedProcess>) {
        self.forest = Forest::build(processes);
        self.state = ViewState {
            expanded: reducer::initial_expansion(&self.forest, self.options.initial_expand_depth),
            layout: self.state.layout,
            color_mode: self.state.color_mode,
            ..ViewState::default()
        };
        self.loaded = true;
        log::info!(
            "Loaded {} processes in {} trees ({} without id)",
            self.forest.len(),
            self.forest.roots().len(),
            self.forest.unlinked().len()
        );
    }

    pub fn dispatch(&mut self, command: Command) {
        log::debug!("Dispatching {:?}", command);
        self.state = reduce(&self.forest, &self.state, &command);
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn visible_nodes(&self) -> VisibleNodes<'_> {
        visible_nodes(&self.forest, &self.state)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_nodes().count()
    }

    pub fn details(&self, id: &str) -> Option<ProcessDetails> {
        self.forest
            .get(id)
            .map(|node| ProcessDetails::of(&self.forest, node))
    }

    /// Details of the selected process, if any.
    pub fn selected_details(&self) -> Option<ProcessDetails> {
        self.state.selected.as_deref().and_then(|id| self.details(id))
    }

    pub fn stats(&self) -> ForestStats {
        ForestStats::collect(&self.forest, self.visible_count())
    }

    /// Whether a batch with at least one linked process has been loaded.
    pub fn has_data(&self) -> bool {
        self.loaded && !self.forest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<RawRecord> {
        let rows = json!([
            {"edr_provider": "crowdstrike", "ProcessId": "1", "FileName": "explorer.exe"},
            {"edr_provider": "crowdstrike", "ProcessId": "2", "FileName": "cmd.exe", "ParentProcessId": "1"},
            {"edr_provider": "crowdstrike", "ProcessId": "3", "FileName": "whoami.exe", "ParentProcessId": "2"},
            {"edr_provider": "crowdstrike", "ProcessId": "4", "FileName": "net.exe", "ParentProcessId": "3"}
        ]);
        rows.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn empty_view_has_no_rows() {
        let mut view = ProcessTreeView::new(ViewOptions::default());
        assert!(!view.has_data());
        view.dispatch(Command::ExpandAll);
        view.dispatch(Command::SetLayout(Layout::Vertical));
        assert_eq!(view.visible_count(), 0);
        assert_eq!(view.state().layout, Layout::Vertical);
    }

    #[test]
    fn load_applies_initial_expansion() {
        let options = ViewOptions {
            initial_expand_depth: 2,
            ..ViewOptions::default()
        };
        let mut view = ProcessTreeView::new(options);
        view.load_batch(&records());
        assert!(view.has_data());
        let ids: Vec<&str> = view.visible_nodes().map(|v| v.node.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn reload_resets_interaction_but_keeps_presentation() {
        let mut view = ProcessTreeView::new(ViewOptions::default());
        view.load_batch(&records());
        view.dispatch(Command::SetSearch("net".into()));
        view.dispatch(Command::Select("4".into()));
        view.dispatch(Command::SetColorMode(ColorMode::Provider));
        view.dispatch(Command::ApplyFilter {
            providers: vec!["defender".into()],
            statuses: vec!["all".into()],
        });

        view.load_batch(&records());
        let state = view.state();
        assert!(state.search_term.is_empty());
        assert!(state.selected.is_none());
        assert!(!state.filter.is_active());
        assert_eq!(state.color_mode, ColorMode::Provider);
    }

    #[test]
    fn details_and_stats() {
        let mut view = ProcessTreeView::new(ViewOptions::default());
        view.load_batch(&records());
        let details = view.details("3").unwrap();
        assert_eq!(details.name, "whoami.exe");
        assert_eq!(details.parent_name.as_deref(), Some("cmd.exe"));
        assert!(view.details("99").is_none());
        assert!(view.selected_details().is_none());

        view.dispatch(Command::Select("2".into()));
        assert_eq!(view.selected_details().unwrap().children, 1);

        let stats = view.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.roots, 1);
        assert_eq!(stats.visible, 4);
        assert_eq!(stats.providers, vec!["crowdstrike"]);
    }
}
