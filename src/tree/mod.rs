//! Links a batch of normalized processes into a forest by parent id.

use shared::NormalizedProcess;
use std::collections::HashMap;

/// Position of a node in the forest arena.
pub type NodeIdx = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: String,
    pub process: NormalizedProcess,
    pub parent: Option<NodeIdx>,
    pub children: Vec<NodeIdx>,
}

impl TreeNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// All process trees built from one batch.
///
/// Nodes live in an arena in first-seen order; roots and child lists hold
/// arena indices. Records without a process id are kept aside as
/// `unlinked`.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<TreeNode>,
    index: HashMap<String, NodeIdx>,
    roots: Vec<NodeIdx>,
    unlinked: Vec<NormalizedProcess>,
}

impl Forest {
    pub fn build(processes: Vec<NormalizedProcess>) -> Forest {
        let mut forest = Forest::default();

        for process in processes {
            let Some(id) = process.id.clone() else {
                forest.unlinked.push(process);
                continue;
            };
            match forest.index.get(&id) {
                Some(&slot) => {
                    log::debug!("Duplicate process id {}, keeping the later record", id);
                    forest.nodes[slot].process = process;
                }
                None => {
                    forest.index.insert(id.clone(), forest.nodes.len());
                    forest.nodes.push(TreeNode {
                        id,
                        process,
                        parent: None,
                        children: Vec::new(),
                    });
                }
            }
        }

        let mut parents: Vec<Option<NodeIdx>> = (0..forest.nodes.len())
            .map(|idx| {
                forest.nodes[idx]
                    .process
                    .parent_id
                    .as_ref()
                    .and_then(|parent_id| forest.index.get(parent_id).copied())
                    .filter(|&parent| parent != idx)
            })
            .collect();
        forest.break_cycles(&mut parents);

        for (idx, parent) in parents.into_iter().enumerate() {
            match parent {
                Some(parent) => {
                    forest.nodes[idx].parent = Some(parent);
                    forest.nodes[parent].children.push(idx);
                }
                None => forest.roots.push(idx),
            }
        }

        forest
    }

    // Each node has at most one parent, so every cycle is found by walking
    // parent links once per node. A cycle is cut at its last node in input
    // order, the one whose attachment would close it.
    fn break_cycles(&self, parents: &mut [Option<NodeIdx>]) {
        const UNSEEN: u8 = 0;
        const ON_PATH: u8 = 1;
        const DONE: u8 = 2;

        let mut mark = vec![UNSEEN; parents.len()];
        let mut path = Vec::new();

        for start in 0..parents.len() {
            let mut current = Some(start);
            while let Some(node) = current {
                match mark[node] {
                    UNSEEN => {
                        mark[node] = ON_PATH;
                        path.push(node);
                        current = parents[node];
                    }
                    ON_PATH => {
                        let entry = path.iter().position(|&n| n == node).unwrap_or(0);
                        if let Some(&closing) = path[entry..].iter().max() {
                            log::warn!(
                                "Process {} closes a parent cycle, treating it as a root",
                                self.nodes[closing].id
                            );
                            parents[closing] = None;
                        }
                        current = None;
                    }
                    _ => current = None,
                }
            }
            for node in path.drain(..) {
                mark[node] = DONE;
            }
        }
    }

    pub fn roots(&self) -> &[NodeIdx] {
        &self.roots
    }

    pub fn node(&self, idx: NodeIdx) -> &TreeNode {
        &self.nodes[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIdx> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    pub fn children(&self, idx: NodeIdx) -> impl Iterator<Item = &TreeNode> + '_ {
        self.nodes[idx].children.iter().map(|&c| &self.nodes[c])
    }

    /// Parent chain of `idx`, nearest first.
    pub fn ancestors(&self, idx: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        std::iter::successors(self.nodes[idx].parent, |&p| self.nodes[p].parent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &TreeNode)> + '_ {
        self.nodes.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn unlinked(&self) -> &[NormalizedProcess] {
        &self.unlinked
    }
}
