use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One raw event row as delivered by a search, before normalization.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// EDR product that produced a raw record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    CrowdStrike,
    SentinelOne,
    Defender,
    /// Any other tag, lower-cased. Empty tags become `"unknown"`.
    Other(String),
}

impl Provider {
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "crowdstrike" => Provider::CrowdStrike,
            "sentinelone" => Provider::SentinelOne,
            "defender" => Provider::Defender,
            "" => Provider::Other(UNKNOWN_PROVIDER.to_string()),
            _ => Provider::Other(tag),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Provider::CrowdStrike => "crowdstrike",
            Provider::SentinelOne => "sentinelone",
            Provider::Defender => "defender",
            Provider::Other(tag) => tag,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Provider::CrowdStrike => "CrowdStrike".to_string(),
            Provider::SentinelOne => "SentinelOne".to_string(),
            Provider::Defender => "Defender".to_string(),
            Provider::Other(tag) => {
                let mut chars = tag.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

impl From<String> for Provider {
    fn from(tag: String) -> Self {
        Provider::from_tag(&tag)
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        provider.as_str().to_string()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    #[default]
    Normal,
    Terminated,
    Suspicious,
    Malicious,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 4] = [
        ProcessStatus::Normal,
        ProcessStatus::Terminated,
        ProcessStatus::Suspicious,
        ProcessStatus::Malicious,
    ];

    /// Maps a provider's raw state string onto the four display statuses.
    /// Unrecognized values count as normal.
    pub fn from_raw(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "terminated" | "stopped" | "exited" | "dead" => ProcessStatus::Terminated,
            "suspicious" => ProcessStatus::Suspicious,
            "malicious" | "malware" | "threat" | "blocked" | "quarantined" => {
                ProcessStatus::Malicious
            }
            _ => ProcessStatus::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Normal => "normal",
            ProcessStatus::Terminated => "terminated",
            ProcessStatus::Suspicious => "suspicious",
            ProcessStatus::Malicious => "malicious",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A process record after provider-specific field names were resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProcess {
    pub id: Option<String>,
    pub name: String,
    pub command_line: String,
    pub hostname: String,
    pub sha256: String,
    pub provider: Provider,
    pub status: ProcessStatus,
    pub parent_id: Option<String>,
    pub parent_name: Option<String>,
    pub timestamp: Option<String>,
}

impl NormalizedProcess {
    pub fn new(id: Option<&str>, name: &str, provider: Provider) -> Self {
        Self {
            id: id.map(str::to_string),
            name: name.to_string(),
            command_line: String::new(),
            hostname: String::new(),
            sha256: String::new(),
            provider,
            status: ProcessStatus::Normal,
            parent_id: None,
            parent_name: None,
            timestamp: None,
        }
    }

    pub fn with_parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self
    }

    pub fn with_status(mut self, status: ProcessStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_command_line(mut self, command_line: &str) -> Self {
        self.command_line = command_line.to_string();
        self
    }

    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.to_string();
        self
    }

    /// Interprets the raw timestamp as RFC 3339, `YYYY-MM-DD HH:MM:SS`
    /// (taken as UTC) or epoch seconds.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(ts.and_utc());
        }
        let secs: f64 = raw.parse().ok()?;
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        let nanos = (secs.fract() * 1_000_000_000.0) as u32;
        DateTime::from_timestamp(secs.trunc() as i64, nanos)
    }
}
