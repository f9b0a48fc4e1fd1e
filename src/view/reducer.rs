use super::state::{ColorMode, FilterSpec, Layout, ViewState, matches_term, normalize_term};
use crate::tree::{Forest, NodeIdx};
use std::collections::BTreeSet;

/// A user interaction against a tree view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ToggleExpand(String),
    ExpandAll,
    CollapseAll,
    SetSearch(String),
    ClearSearch,
    ApplyFilter {
        providers: Vec<String>,
        statuses: Vec<String>,
    },
    Select(String),
    ClearSelection,
    SetLayout(Layout),
    SetColorMode(ColorMode),
}

/// Computes the state that follows `command`. The forest is never touched.
pub fn reduce(forest: &Forest, state: &ViewState, command: &Command) -> ViewState {
    let mut next = state.clone();

    match command {
        Command::ToggleExpand(id) => match forest.get(id) {
            Some(node) if node.has_children() => {
                if !next.expanded.remove(id) {
                    next.expanded.insert(id.clone());
                }
            }
            Some(_) => log::debug!("Process {} has no children to expand", id),
            None => log::debug!("Toggle ignored, unknown process {}", id),
        },
        Command::ExpandAll => next.expanded = expandable_ids(forest),
        Command::CollapseAll => next.expanded = root_ids(forest),
        Command::SetSearch(term) => {
            next.search_term = normalize_term(term);
            if next.has_search() {
                reveal_matches(forest, &next.search_term, &mut next.expanded);
            }
        }
        Command::ClearSearch => next.search_term.clear(),
        Command::ApplyFilter {
            providers,
            statuses,
        } => next.filter = FilterSpec::from_selection(providers.as_slice(), statuses.as_slice()),
        Command::Select(id) => {
            if forest.get(id).is_some() {
                next.selected = Some(id.clone());
            } else {
                log::debug!("Select ignored, unknown process {}", id);
            }
        }
        Command::ClearSelection => next.selected = None,
        Command::SetLayout(layout) => next.layout = *layout,
        Command::SetColorMode(mode) => next.color_mode = *mode,
    }

    next
}

/// Every node with at least one child, across the whole forest.
pub fn expandable_ids(forest: &Forest) -> BTreeSet<String> {
    forest
        .iter()
        .filter(|(_, node)| node.has_children())
        .map(|(_, node)| node.id.clone())
        .collect()
}

pub fn root_ids(forest: &Forest) -> BTreeSet<String> {
    forest
        .roots()
        .iter()
        .map(|&idx| forest.node(idx).id.clone())
        .collect()
}

/// Expands the ancestor chain of every node matching `term`. Returns the
/// number of matches.
pub fn reveal_matches(forest: &Forest, term: &str, expanded: &mut BTreeSet<String>) -> usize {
    let matches: Vec<NodeIdx> = forest
        .iter()
        .filter(|(_, node)| matches_term(&node.process, term))
        .map(|(idx, _)| idx)
        .collect();

    for &idx in &matches {
        for ancestor in forest.ancestors(idx) {
            expanded.insert(forest.node(ancestor).id.clone());
        }
    }
    matches.len()
}

/// Nodes with children shallower than `depth`, the expansion a freshly
/// loaded batch starts with.
pub fn initial_expansion(forest: &Forest, depth: usize) -> BTreeSet<String> {
    let mut expanded = BTreeSet::new();
    let mut stack: Vec<(NodeIdx, usize)> = forest.roots().iter().map(|&r| (r, 0)).collect();
    while let Some((idx, level)) = stack.pop() {
        if level >= depth {
            continue;
        }
        let node = forest.node(idx);
        if node.has_children() {
            expanded.insert(node.id.clone());
        }
        stack.extend(node.children.iter().map(|&c| (c, level + 1)));
    }
    expanded
}
