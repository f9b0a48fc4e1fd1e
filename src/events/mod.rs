pub mod batch;
pub mod command;

pub use batch::{BatchError, load_batch_file, parse_batch};
pub use command::{CommandParseError, parse_request};

use crate::view::Command;
use chrono::{DateTime, Utc};
use shared::RawRecord;
use std::fmt;
use std::path::PathBuf;

/// A set of raw records delivered wholesale to the view.
#[derive(Debug, Clone)]
pub struct Batch {
    pub batch_id: String,
    pub received_at: DateTime<Utc>,
    pub source: String,
    pub records: Vec<RawRecord>,
}

impl Batch {
    pub fn new(source: &str, records: Vec<RawRecord>) -> Self {
        Self {
            batch_id: uuid::Uuid::new_v4().to_string(),
            received_at: Utc::now(),
            source: source.to_string(),
            records,
        }
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch {} from {} ({} records, {})",
            self.batch_id,
            self.source,
            self.records.len(),
            self.received_at.format("%H:%M:%S")
        )
    }
}

/// Something the console asks of the view engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRequest {
    Dispatch(Command),
    Show,
    Stats,
    Details(String),
    Load(PathBuf),
    /// Writes the current options to this path, or the default config path.
    Save(Option<PathBuf>),
    Status,
    Help,
    Quit,
}
