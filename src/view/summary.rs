use crate::tree::{Forest, TreeNode};
use serde::Serialize;
use shared::ProcessStatus;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForestStats {
    pub total: usize,
    pub roots: usize,
    pub unlinked: usize,
    pub visible: usize,
    /// Distinct provider tags in the batch, sorted. Feeds the provider filter.
    pub providers: Vec<String>,
    pub by_status: BTreeMap<ProcessStatus, usize>,
}

impl ForestStats {
    pub fn collect(forest: &Forest, visible: usize) -> Self {
        let mut providers: Vec<String> = forest
            .iter()
            .map(|(_, node)| node.process.provider.as_str().to_string())
            .chain(
                forest
                    .unlinked()
                    .iter()
                    .map(|p| p.provider.as_str().to_string()),
            )
            .collect();
        providers.sort();
        providers.dedup();

        let mut by_status = BTreeMap::new();
        for (_, node) in forest.iter() {
            *by_status.entry(node.process.status).or_insert(0) += 1;
        }

        Self {
            total: forest.len(),
            roots: forest.roots().len(),
            unlinked: forest.unlinked().len(),
            visible,
            providers,
            by_status,
        }
    }

    pub fn count(&self, status: ProcessStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Content of the details panel for one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessDetails {
    pub id: String,
    pub name: String,
    pub hostname: String,
    pub provider: String,
    pub status: ProcessStatus,
    pub command_line: String,
    pub sha256: String,
    pub parent_id: Option<String>,
    pub parent_name: Option<String>,
    pub timestamp: Option<String>,
    pub children: usize,
}

impl ProcessDetails {
    pub fn of(forest: &Forest, node: &TreeNode) -> Self {
        let p = &node.process;
        let parent_name = p
            .parent_name
            .clone()
            .or_else(|| node.parent.map(|idx| forest.node(idx).process.name.clone()));
        let timestamp = p
            .parsed_timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .or_else(|| p.timestamp.clone());

        Self {
            id: node.id.clone(),
            name: p.name.clone(),
            hostname: p.hostname.clone(),
            provider: p.provider.as_str().to_string(),
            status: p.status,
            command_line: p.command_line.clone(),
            sha256: p.sha256.clone(),
            parent_id: p.parent_id.clone(),
            parent_name,
            timestamp,
            children: node.children.len(),
        }
    }

    /// Label/value pairs for the non-empty fields, in panel order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("PID", self.id.clone())];
        if !self.hostname.is_empty() {
            fields.push(("Host", self.hostname.clone()));
        }
        fields.push(("Provider", self.provider.clone()));
        fields.push(("Status", self.status.to_string()));
        if !self.command_line.is_empty() {
            fields.push(("Command", self.command_line.clone()));
        }
        if !self.sha256.is_empty() {
            fields.push(("SHA256", self.sha256.clone()));
        }
        if let Some(parent) = &self.parent_id {
            let label = match &self.parent_name {
                Some(name) => format!("{} ({})", parent, name),
                None => parent.clone(),
            };
            fields.push(("Parent", label));
        }
        if let Some(ts) = &self.timestamp {
            fields.push(("Timestamp", ts.clone()));
        }
        fields.push(("Children", self.children.to_string()));
        fields
    }
}
