//! Schedule repository contracts and JSON document implementations.
//!
//! # Responsibility
//! - Provide the fetch/store API over the flat JSON record array.
//! - Keep record encoding, schema inference and cell parsing here.
//!
//! # Invariants
//! - Encoding is deterministic: identical tables produce byte-identical
//!   documents (fixed field order `Date`, `StartTime`, `EndTime`, then
//!   user columns in column order).
//! - Decoding rejects documents whose records lack `Date`/`StartTime`
//!   or carry unparseable key fields; cell-level noise is tolerated.

use crate::model::table::{
    ScheduleTable, SlotKey, Status, UserColumn, DATE_FIELD, END_TIME_FIELD, START_TIME_FIELD,
};
use crate::repo::RepoResult;
use chrono::{NaiveDate, NaiveTime};
use log::{error, info, warn};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Result of reading the persisted document.
///
/// Fetching never fails hard; every degraded case is an explicit
/// outcome so the store can fall back to an empty table.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A well-formed document was read and decoded.
    Document(ScheduleTable),
    /// No document exists yet.
    Missing,
    /// The document exists but could not be read.
    Unreadable(String),
    /// The document was read but is not a valid schedule record set.
    Malformed(String),
}

/// Storage contract for the canonical schedule table.
pub trait ScheduleRepository {
    /// Reads and decodes the persisted document.
    fn fetch(&self) -> FetchOutcome;

    /// Encodes and writes the full table, replacing any prior document.
    fn store(&self, table: &ScheduleTable) -> RepoResult<()>;
}

/// Flat-file JSON repository.
///
/// The file is treated as exclusively owned by this process for the
/// duration of each fetch/store call; concurrent writers race and the
/// last write wins.
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScheduleRepository for JsonFileRepository {
    fn fetch(&self) -> FetchOutcome {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "event=store_fetch module=repo mode=file status=missing path={}",
                    self.path.display()
                );
                return FetchOutcome::Missing;
            }
            Err(err) => {
                warn!(
                    "event=store_fetch module=repo mode=file status=unreadable path={} error={err}",
                    self.path.display()
                );
                return FetchOutcome::Unreadable(err.to_string());
            }
        };

        match decode_document(&text) {
            Ok(table) => {
                info!(
                    "event=store_fetch module=repo mode=file status=ok rows={} users={}",
                    table.slot_count(),
                    table.user_count()
                );
                FetchOutcome::Document(table)
            }
            Err(reason) => {
                warn!(
                    "event=store_fetch module=repo mode=file status=malformed path={} reason={reason}",
                    self.path.display()
                );
                FetchOutcome::Malformed(reason)
            }
        }
    }

    fn store(&self, table: &ScheduleTable) -> RepoResult<()> {
        let document = encode_document(table)?;
        if let Err(err) = std::fs::write(&self.path, document) {
            error!(
                "event=store_write module=repo mode=file status=error path={} error_code=write_failed error={err}",
                self.path.display()
            );
            return Err(err.into());
        }
        info!(
            "event=store_write module=repo mode=file status=ok rows={} users={}",
            table.slot_count(),
            table.user_count()
        );
        Ok(())
    }
}

/// In-memory session repository.
///
/// Clones share the same underlying document, so a host session (or a
/// test) can keep a handle while the store owns its own copy.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    document: Rc<RefCell<Option<String>>>,
}

impl MemoryRepository {
    /// Creates an empty session store (no document yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session store seeded with an existing document.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Rc::new(RefCell::new(Some(document.into()))),
        }
    }

    /// Returns a copy of the current document, if any.
    pub fn document(&self) -> Option<String> {
        self.document.borrow().clone()
    }

    /// Drops the current document.
    pub fn clear(&self) {
        *self.document.borrow_mut() = None;
    }
}

impl ScheduleRepository for MemoryRepository {
    fn fetch(&self) -> FetchOutcome {
        let document = self.document.borrow();
        let Some(text) = document.as_deref() else {
            info!("event=store_fetch module=repo mode=memory status=missing");
            return FetchOutcome::Missing;
        };
        match decode_document(text) {
            Ok(table) => {
                info!(
                    "event=store_fetch module=repo mode=memory status=ok rows={} users={}",
                    table.slot_count(),
                    table.user_count()
                );
                FetchOutcome::Document(table)
            }
            Err(reason) => {
                warn!("event=store_fetch module=repo mode=memory status=malformed reason={reason}");
                FetchOutcome::Malformed(reason)
            }
        }
    }

    fn store(&self, table: &ScheduleTable) -> RepoResult<()> {
        let document = encode_document(table)?;
        *self.document.borrow_mut() = Some(document);
        info!(
            "event=store_write module=repo mode=memory status=ok rows={} users={}",
            table.slot_count(),
            table.user_count()
        );
        Ok(())
    }
}

/// Encodes the table as the persisted record array.
pub fn encode_document(table: &ScheduleTable) -> RepoResult<String> {
    let mut records = Vec::with_capacity(table.slot_count());
    for (row, key) in table.slots().iter().enumerate() {
        let mut fields = Map::new();
        fields.insert(DATE_FIELD.to_string(), Value::String(key.date_label()));
        fields.insert(START_TIME_FIELD.to_string(), Value::String(key.start_label()));
        if let Some(end_label) = key.end_label() {
            fields.insert(END_TIME_FIELD.to_string(), Value::String(end_label));
        }
        for column in table.users() {
            let status = column.statuses.get(row).copied().unwrap_or_default();
            fields.insert(column.name.clone(), Value::String(status.label().to_string()));
        }
        records.push(Value::Object(fields));
    }

    let mut text = serde_json::to_string_pretty(&Value::Array(records))?;
    text.push('\n');
    Ok(text)
}

/// Decodes the persisted record array back into a table.
///
/// User columns are recovered in first-seen order across records; rows
/// repeating an earlier key are dropped (first occurrence wins).
pub fn decode_document(text: &str) -> Result<ScheduleTable, String> {
    let root: Value =
        serde_json::from_str(text).map_err(|err| format!("invalid JSON: {err}"))?;
    let Value::Array(records) = root else {
        return Err("document root is not an array of records".to_string());
    };

    let mut slots: Vec<SlotKey> = Vec::with_capacity(records.len());
    let mut users: Vec<UserColumn> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(format!("record {index} is not an object"));
        };

        let key = parse_record_key(fields, index)?;
        key.validate()
            .map_err(|err| format!("record {index}: {err}"))?;
        slots.push(key);
        let row_count = slots.len();

        for (field, value) in fields {
            if is_key_field(field) {
                continue;
            }
            let status = status_from_cell(value);
            match users.iter_mut().find(|column| &column.name == field) {
                Some(column) => column.statuses.push(status),
                None => {
                    let mut column = UserColumn::filled(field.clone(), row_count - 1);
                    column.statuses.push(status);
                    users.push(column);
                }
            }
        }

        // Columns absent from this record read as Undecided.
        for column in &mut users {
            column.statuses.resize(row_count, Status::Undecided);
        }
    }

    Ok(ScheduleTable::from_parts(slots, users))
}

fn is_key_field(name: &str) -> bool {
    name == DATE_FIELD || name == START_TIME_FIELD || name == END_TIME_FIELD
}

fn parse_record_key(fields: &Map<String, Value>, index: usize) -> Result<SlotKey, String> {
    let date_text = require_string_field(fields, DATE_FIELD, index)?;
    let date = parse_date_value(date_text)
        .ok_or_else(|| format!("record {index}: invalid {DATE_FIELD} value `{date_text}`"))?;

    let start_text = require_string_field(fields, START_TIME_FIELD, index)?;
    let start_time = parse_time_value(start_text).ok_or_else(|| {
        format!("record {index}: invalid {START_TIME_FIELD} value `{start_text}`")
    })?;

    let end_time = match fields.get(END_TIME_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(parse_time_value(text).ok_or_else(|| {
            format!("record {index}: invalid {END_TIME_FIELD} value `{text}`")
        })?),
        Some(other) => {
            return Err(format!(
                "record {index}: {END_TIME_FIELD} is not a string: {other}"
            ));
        }
    };

    Ok(SlotKey {
        date,
        start_time,
        end_time,
    })
}

fn require_string_field<'a>(
    fields: &'a Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<&'a str, String> {
    match fields.get(field) {
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(format!("record {index}: {field} is not a string: {other}")),
        None => Err(format!("record {index}: missing required field {field}")),
    }
}

fn parse_date_value(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn parse_time_value(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()
}

fn status_from_cell(value: &Value) -> Status {
    match value {
        Value::String(text) => Status::parse_label(text.trim()).unwrap_or_default(),
        _ => Status::Undecided,
    }
}
