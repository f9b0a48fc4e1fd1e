use super::state::{FilterSpec, ViewState};
use crate::tree::{Forest, NodeIdx, TreeNode};

/// Nodes kept by `filter`: those that pass it, plus every ancestor of one
/// that does. `None` when the filter is inactive and everything is kept.
pub fn retained(forest: &Forest, filter: &FilterSpec) -> Option<Vec<bool>> {
    if !filter.is_active() {
        return None;
    }

    let mut order = Vec::with_capacity(forest.len());
    let mut stack: Vec<NodeIdx> = forest.roots().to_vec();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(forest.node(idx).children.iter().copied());
    }

    // Children precede their parent in reverse pre-order.
    let mut kept = vec![false; forest.len()];
    for &idx in order.iter().rev() {
        let node = forest.node(idx);
        kept[idx] = filter.accepts(&node.process) || node.children.iter().any(|&c| kept[c]);
    }
    Some(kept)
}

/// One row handed to a renderer.
#[derive(Debug, Clone, Copy)]
pub struct VisibleNode<'a> {
    pub idx: NodeIdx,
    pub node: &'a TreeNode,
    pub depth: usize,
    pub expanded: bool,
    /// Whether the node has children left after filtering.
    pub has_children: bool,
    pub highlighted: bool,
    pub selected: bool,
}

/// Pre-order walk over the filtered forest that descends only into expanded
/// nodes. Clone it to restart from the same point.
#[derive(Debug, Clone)]
pub struct VisibleNodes<'a> {
    forest: &'a Forest,
    state: &'a ViewState,
    kept: Option<Vec<bool>>,
    stack: Vec<(NodeIdx, usize)>,
}

impl<'a> VisibleNodes<'a> {
    pub fn new(forest: &'a Forest, state: &'a ViewState) -> Self {
        let kept = retained(forest, &state.filter);
        let mut walk = Self {
            forest,
            state,
            kept,
            stack: Vec::new(),
        };
        let roots = walk.kept_only(forest.roots());
        walk.stack = roots.into_iter().rev().map(|idx| (idx, 0)).collect();
        walk
    }

    fn is_kept(&self, idx: NodeIdx) -> bool {
        self.kept.as_ref().is_none_or(|kept| kept[idx])
    }

    fn kept_only(&self, idxs: &[NodeIdx]) -> Vec<NodeIdx> {
        idxs.iter().copied().filter(|&i| self.is_kept(i)).collect()
    }
}

impl<'a> Iterator for VisibleNodes<'a> {
    type Item = VisibleNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, depth) = self.stack.pop()?;
        let node = self.forest.node(idx);
        let children = self.kept_only(&node.children);
        let expanded = self.state.is_expanded(&node.id);

        if expanded {
            self.stack
                .extend(children.iter().rev().map(|&child| (child, depth + 1)));
        }

        Some(VisibleNode {
            idx,
            node,
            depth,
            expanded,
            has_children: !children.is_empty(),
            highlighted: self.state.is_highlighted(&node.process),
            selected: self.state.is_selected(&node.id),
        })
    }
}

pub fn visible_nodes<'a>(forest: &'a Forest, state: &'a ViewState) -> VisibleNodes<'a> {
    VisibleNodes::new(forest, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::reducer::{Command, reduce};
    use shared::{NormalizedProcess, ProcessStatus, Provider};

    // r(defender) -> m(defender) -> leaf(crowdstrike, malicious); r -> other(defender)
    fn forest() -> Forest {
        Forest::build(vec![
            NormalizedProcess::new(Some("r"), "services.exe", Provider::Defender),
            NormalizedProcess::new(Some("m"), "svchost.exe", Provider::Defender).with_parent("r"),
            NormalizedProcess::new(Some("leaf"), "rundll32.exe", Provider::CrowdStrike)
                .with_parent("m")
                .with_status(ProcessStatus::Malicious),
            NormalizedProcess::new(Some("other"), "spoolsv.exe", Provider::Defender).with_parent("r"),
        ])
    }

    fn rows(forest: &Forest, state: &ViewState) -> Vec<(String, usize)> {
        visible_nodes(forest, state)
            .map(|v| (v.node.id.clone(), v.depth))
            .collect()
    }

    #[test]
    fn collapsed_roots_only() {
        let forest = forest();
        let state = ViewState::default();
        assert_eq!(rows(&forest, &state), vec![("r".to_string(), 0)]);
        let first = visible_nodes(&forest, &state).next().unwrap();
        assert!(first.has_children);
        assert!(!first.expanded);
    }

    #[test]
    fn expanded_walk_is_preorder() {
        let forest = forest();
        let state = reduce(&forest, &ViewState::default(), &Command::ExpandAll);
        assert_eq!(
            rows(&forest, &state),
            vec![
                ("r".to_string(), 0),
                ("m".to_string(), 1),
                ("leaf".to_string(), 2),
                ("other".to_string(), 1),
            ]
        );
    }

    #[test]
    fn filter_keeps_ancestors_of_matches() {
        let forest = forest();
        let state = reduce(&forest, &ViewState::default(), &Command::ExpandAll);
        let state = reduce(
            &forest,
            &state,
            &Command::ApplyFilter {
                providers: vec!["crowdstrike".into()],
                statuses: vec!["all".into()],
            },
        );
        assert_eq!(
            rows(&forest, &state),
            vec![
                ("r".to_string(), 0),
                ("m".to_string(), 1),
                ("leaf".to_string(), 2),
            ]
        );
        let kept = retained(&forest, &state.filter).unwrap();
        let mut ids: Vec<&str> = forest
            .iter()
            .filter(|(idx, _)| kept[*idx])
            .map(|(_, node)| node.id.as_str())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["leaf", "m", "r"]);
    }

    #[test]
    fn filter_with_no_match_hides_everything() {
        let forest = forest();
        let state = reduce(
            &forest,
            &ViewState::default(),
            &Command::ApplyFilter {
                providers: vec!["all".into()],
                statuses: vec!["terminated".into()],
            },
        );
        assert_eq!(visible_nodes(&forest, &state).count(), 0);
    }

    #[test]
    fn walk_is_restartable() {
        let forest = forest();
        let state = reduce(&forest, &ViewState::default(), &Command::ExpandAll);
        let mut walk = visible_nodes(&forest, &state);
        walk.next();
        let rest: Vec<_> = walk.clone().map(|v| v.idx).collect();
        let again: Vec<_> = walk.map(|v| v.idx).collect();
        assert_eq!(rest, again);
        assert_eq!(rest.len(), 3);
    }

    #[test]
    fn flags_follow_state() {
        let forest = forest();
        let state = reduce(&forest, &ViewState::default(), &Command::SetSearch("rundll".into()));
        let state = reduce(&forest, &state, &Command::Select("m".into()));
        let visible: Vec<_> = visible_nodes(&forest, &state).collect();
        assert_eq!(visible.len(), 4);
        let leaf = visible.iter().find(|v| v.node.id == "leaf").unwrap();
        assert!(leaf.highlighted);
        assert!(!leaf.has_children);
        let m = visible.iter().find(|v| v.node.id == "m").unwrap();
        assert!(m.selected);
        assert!(!m.highlighted);
    }

    #[test]
    fn deep_chain_filters_on_a_worker_thread() {
        let chain: Vec<NormalizedProcess> = (0..100_000)
            .map(|i: usize| {
                let p = NormalizedProcess::new(Some(&i.to_string()), "svchost.exe", Provider::Defender);
                if i == 0 { p } else { p.with_parent(&(i - 1).to_string()) }
            })
            .collect();

        let visible = std::thread::spawn(move || {
            let forest = Forest::build(chain);
            let state = reduce(&forest, &ViewState::default(), &Command::ExpandAll);
            let state = reduce(
                &forest,
                &state,
                &Command::ApplyFilter {
                    providers: vec!["crowdstrike".into()],
                    statuses: vec!["all".into()],
                },
            );
            let hidden = visible_nodes(&forest, &state).count();
            let state = reduce(
                &forest,
                &state,
                &Command::ApplyFilter {
                    providers: vec!["defender".into()],
                    statuses: vec!["all".into()],
                },
            );
            (hidden, visible_nodes(&forest, &state).count())
        })
        .join()
        .unwrap();

        assert_eq!(visible, (0, 100_000));
    }
}
