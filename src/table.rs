//! Table model for group records
//!
//! The column set is fixed when the model is created and rows are kept in
//! the order they were appended.

use crate::decoder::{ChunkSource, RecordStream};
use crate::error::Result;
use crate::types::{GroupRecord, HealthState};
use std::fmt;
use tracing::debug;

/// Column titles of the groups table, in display order
pub static GROUP_HEADERS: [Header; 5] = [
    Header::new("job_name", "JobName"),
    Header::new("link_name", "LinkName"),
    Header::new("link_type", "LinkType"),
    Header::new("group_id", "GroupID"),
    Header::new("health_state", "HealthState"),
];

/// A table column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Machine-readable key used by structured output
    pub key: &'static str,
    /// Title shown to the operator
    pub title: &'static str,
}

impl Header {
    /// Create a column header
    pub const fn new(key: &'static str, title: &'static str) -> Self {
        Self { key, title }
    }
}

/// A typed table cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Text cell
    String(String),
    /// Integer cell
    Int(i64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
        }
    }
}

/// Ordered rows under a fixed header set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableModel {
    headers: &'static [Header],
    rows: Vec<Vec<Value>>,
}

impl TableModel {
    /// Empty groups table
    pub fn groups() -> Self {
        Self {
            headers: &GROUP_HEADERS,
            rows: Vec::new(),
        }
    }

    /// Build a groups table from a record stream, in stream order
    ///
    /// # Errors
    /// Returns the first transport or decode error; no table is produced
    /// in that case.
    pub async fn from_stream<S: ChunkSource>(
        stream: &mut RecordStream<S, GroupRecord>,
    ) -> Result<Self> {
        let mut table = Self::groups();
        while let Some(record) = stream.next().await? {
            if record.health() != HealthState::Running {
                debug!(
                    job = %record.job_name,
                    group_id = record.group_id,
                    health = %record.health(),
                    "group not running"
                );
            }
            table.push_group(&record);
        }
        Ok(table)
    }

    /// Build a groups table from already decoded records
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a GroupRecord>) -> Self {
        let mut table = Self::groups();
        for record in records {
            table.push_group(record);
        }
        table
    }

    /// Append one row for `record`
    pub fn push_group(&mut self, record: &GroupRecord) {
        self.rows.push(vec![
            Value::String(record.job_name.clone()),
            Value::String(record.link_name.clone()),
            Value::String(record.link_type.clone()),
            Value::Int(record.group_id),
            Value::String(record.health_state.clone()),
        ]);
    }

    /// Column headers
    pub fn headers(&self) -> &[Header] {
        self.headers
    }

    /// Data rows
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
