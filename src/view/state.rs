use serde::{Deserialize, Serialize};
use shared::NormalizedProcess;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Filter value that disables filtering on its dimension.
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Status,
    Provider,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "horizontal" | "h" => Ok(Layout::Horizontal),
            "vertical" | "v" => Ok(Layout::Vertical),
            other => Err(format!("unknown layout '{}'", other)),
        }
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "status" => Ok(ColorMode::Status),
            "provider" => Ok(ColorMode::Provider),
            other => Err(format!("unknown color mode '{}'", other)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Horizontal => f.write_str("horizontal"),
            Layout::Vertical => f.write_str("vertical"),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Status => f.write_str("status"),
            ColorMode::Provider => f.write_str("provider"),
        }
    }
}

/// Provider and status selections. `None` on a dimension means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub providers: Option<BTreeSet<String>>,
    pub statuses: Option<BTreeSet<String>>,
}

impl FilterSpec {
    pub fn from_selection<P, S>(providers: &[P], statuses: &[S]) -> Self
    where
        P: AsRef<str>,
        S: AsRef<str>,
    {
        Self {
            providers: dimension(providers),
            statuses: dimension(statuses),
        }
    }

    pub fn is_active(&self) -> bool {
        self.providers.is_some() || self.statuses.is_some()
    }

    pub fn accepts(&self, process: &NormalizedProcess) -> bool {
        let provider_ok = self
            .providers
            .as_ref()
            .is_none_or(|set| set.contains(process.provider.as_str()));
        let status_ok = self
            .statuses
            .as_ref()
            .is_none_or(|set| set.contains(process.status.as_str()));
        provider_ok && status_ok
    }
}

fn dimension<T: AsRef<str>>(values: &[T]) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = values
        .iter()
        .map(|v| v.as_ref().trim().to_lowercase())
        .collect();
    if set.contains(ALL) { None } else { Some(set) }
}

/// Presentation state of one tree view. Replaced wholesale by the reducer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub expanded: BTreeSet<String>,
    pub search_term: String,
    pub filter: FilterSpec,
    pub selected: Option<String>,
    pub layout: Layout,
    pub color_mode: ColorMode,
}

impl ViewState {
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn has_search(&self) -> bool {
        !self.search_term.is_empty()
    }

    pub fn is_highlighted(&self, process: &NormalizedProcess) -> bool {
        self.has_search() && matches_term(process, &self.search_term)
    }
}

pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Case-insensitive substring match on name, command line and hostname.
/// `term` must already be normalized.
pub fn matches_term(process: &NormalizedProcess, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    [&process.name, &process.command_line, &process.hostname]
        .iter()
        .any(|field| field.to_lowercase().contains(term))
}
