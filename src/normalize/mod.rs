//! Maps provider-specific event rows onto [`NormalizedProcess`].
//!
//! Every known provider has its own field-name priority list in
//! [`providers`]; whatever a provider leaves unresolved is looked up again
//! under the generic names. Missing fields degrade to defaults, nothing
//! here fails.

pub mod providers;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use shared::{NormalizedProcess, ProcessStatus, Provider, RawRecord, UNKNOWN_NAME};

lazy_static! {
    static ref LEADING_TOKEN: Regex = Regex::new(r#"^\s*(?:"([^"]*)"|(\S+))"#).unwrap();
    static ref EXE_SUFFIX: Regex = Regex::new(r"(?i)\.exe$").unwrap();
}

/// Target attributes resolved from one row, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub id: Option<String>,
    pub name: Option<String>,
    pub command_line: Option<String>,
    pub parent_id: Option<String>,
    pub parent_name: Option<String>,
    pub sha256: Option<String>,
    pub status: Option<String>,
    pub timestamp: Option<String>,
}

impl Extracted {
    /// Fills every attribute still missing from `fallback`.
    fn or(self, fallback: Extracted) -> Extracted {
        Extracted {
            id: self.id.or(fallback.id),
            name: self.name.or(fallback.name),
            command_line: self.command_line.or(fallback.command_line),
            parent_id: self.parent_id.or(fallback.parent_id),
            parent_name: self.parent_name.or(fallback.parent_name),
            sha256: self.sha256.or(fallback.sha256),
            status: self.status.or(fallback.status),
            timestamp: self.timestamp.or(fallback.timestamp),
        }
    }
}

/// Renders a JSON value as a trimmed field string. Integral floats render
/// as integers so `1.0` and `"1"` name the same process. Empty strings,
/// booleans, nulls and containers count as absent.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER => {
                Some(format!("{}", f as i64))
            }
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

// Largest magnitude below which every integral f64 is exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// First non-empty value among `keys`, in priority order.
pub fn first_present(row: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .find_map(value_as_string)
}

pub fn provider_of(row: &RawRecord) -> Provider {
    let tag = first_present(row, &["edr_provider", "provider"]).unwrap_or_default();
    Provider::from_tag(&tag)
}

/// Executable base name from the first token of a command line:
/// `"C:\Program Files\App\app.exe" --x` gives `app`.
pub fn name_from_command_line(command_line: &str) -> Option<String> {
    let caps = LEADING_TOKEN.captures(command_line)?;
    let token = caps.get(1).or_else(|| caps.get(2))?.as_str();
    let base = token.rsplit(['\\', '/']).next().unwrap_or(token);
    let name = EXE_SUFFIX.replace(base, "");
    if name.trim().is_empty() {
        None
    } else {
        Some(name.into_owned())
    }
}

pub fn normalize(row: &RawRecord) -> NormalizedProcess {
    let provider = provider_of(row);
    let specific = match provider {
        Provider::CrowdStrike => providers::crowdstrike(row),
        Provider::SentinelOne => providers::sentinelone(row),
        Provider::Defender => providers::defender(row),
        Provider::Other(_) => Extracted::default(),
    };
    let fields = specific.or(providers::generic(row));

    let command_line = fields.command_line.unwrap_or_default();
    let name = fields
        .name
        .or_else(|| name_from_command_line(&command_line))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());
    let status = fields
        .status
        .map(|raw| ProcessStatus::from_raw(&raw))
        .unwrap_or_default();

    NormalizedProcess {
        id: fields.id,
        name,
        command_line,
        hostname: first_present(row, &["edr_hostname", "hostname"]).unwrap_or_default(),
        sha256: fields.sha256.unwrap_or_default(),
        provider,
        status,
        parent_id: fields.parent_id,
        parent_name: fields.parent_name,
        timestamp: fields.timestamp,
    }
}

pub fn normalize_batch(rows: &[RawRecord]) -> Vec<NormalizedProcess> {
    let processes: Vec<NormalizedProcess> = rows.iter().map(normalize).collect();
    let without_id = processes.iter().filter(|p| p.id.is_none()).count();
    if without_id > 0 {
        log::debug!("{} of {} records carry no process id", without_id, rows.len());
    }
    processes
}
