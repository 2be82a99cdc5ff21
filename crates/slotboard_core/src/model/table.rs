//! Schedule table domain model.
//!
//! # Responsibility
//! - Define the canonical slot/status grid mutated by every use case.
//! - Provide the row/column bookkeeping helpers the store builds on.
//!
//! # Invariants
//! - Slot rows are unique by composite `(date, start_time, end_time)` key.
//! - Each user column holds exactly one status per slot row.
//! - Missing cells only ever materialize as `Status::Undecided`.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed key-column names of the persisted record shape.
pub const DATE_FIELD: &str = "Date";
pub const START_TIME_FIELD: &str = "StartTime";
pub const END_TIME_FIELD: &str = "EndTime";

/// Availability of one user for one slot.
///
/// Labels follow the shared-grid convention: `未定` (undecided), `△`
/// (maybe), `〇` (yes), `×` (no).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "未定")]
    Undecided,
    #[serde(rename = "△")]
    Maybe,
    #[serde(rename = "〇")]
    Yes,
    #[serde(rename = "×")]
    No,
}

/// Statuses a participant can actively pick in the grid editor.
///
/// `Undecided` is the implicit default and is not offered as a choice.
pub const SELECTABLE_STATUSES: [Status; 3] = [Status::Maybe, Status::Yes, Status::No];

impl Status {
    /// Returns the canonical cell label used in persisted records.
    pub fn label(self) -> &'static str {
        match self {
            Self::Undecided => "未定",
            Self::Maybe => "△",
            Self::Yes => "〇",
            Self::No => "×",
        }
    }

    /// Parses a canonical cell label back into a status.
    pub fn parse_label(value: &str) -> Option<Self> {
        match value {
            "未定" => Some(Self::Undecided),
            "△" => Some(Self::Maybe),
            "〇" => Some(Self::Yes),
            "×" => Some(Self::No),
            _ => None,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Composite identity of a proposed slot.
///
/// Ordering is `(date, start_time, end_time)` with open-ended slots
/// sorting before closed ones at the same start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
}

/// Validation failure for a slot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotValidationError {
    /// `end_time` is earlier than `start_time`.
    EndBeforeStart {
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
}

impl Display for SlotValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndBeforeStart {
                start_time,
                end_time,
            } => write!(
                f,
                "slot end time {end_time} is earlier than start time {start_time}"
            ),
        }
    }
}

impl Error for SlotValidationError {}

impl SlotKey {
    /// Creates an open-ended slot key (no end time).
    pub fn new(date: NaiveDate, start_time: NaiveTime) -> Self {
        Self {
            date,
            start_time,
            end_time: None,
        }
    }

    /// Creates a slot key with an explicit end time.
    pub fn with_end(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            date,
            start_time,
            end_time: Some(end_time),
        }
    }

    /// Checks range consistency of the key.
    ///
    /// # Invariants
    /// - `end_time`, when present, must not be earlier than `start_time`.
    pub fn validate(&self) -> Result<(), SlotValidationError> {
        if let Some(end_time) = self.end_time {
            if end_time < self.start_time {
                return Err(SlotValidationError::EndBeforeStart {
                    start_time: self.start_time,
                    end_time,
                });
            }
        }
        Ok(())
    }

    /// Canonical `YYYY-MM-DD` form of the date field.
    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Canonical `HH:MM:SS` form of the start time field.
    pub fn start_label(&self) -> String {
        self.start_time.format("%H:%M:%S").to_string()
    }

    /// Canonical `HH:MM:SS` form of the end time field, when present.
    pub fn end_label(&self) -> Option<String> {
        self.end_time
            .map(|end_time| end_time.format("%H:%M:%S").to_string())
    }
}

impl Display for SlotKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.end_label() {
            Some(end) => write!(f, "{} {}-{end}", self.date_label(), self.start_label()),
            None => write!(f, "{} {}", self.date_label(), self.start_label()),
        }
    }
}

/// One dynamic participant column: a name plus one status per slot row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserColumn {
    pub name: String,
    pub statuses: Vec<Status>,
}

impl UserColumn {
    /// Creates a column back-filled with `Undecided` for `rows` slots.
    pub fn filled(name: impl Into<String>, rows: usize) -> Self {
        Self {
            name: name.into(),
            statuses: vec![Status::Undecided; rows],
        }
    }
}

/// Canonical schedule grid: ordered slot rows times ordered user columns.
///
/// All mutation paths keep the completeness invariant: every column's
/// status vector stays length-synchronized with the slot list. The
/// persisted record-array shape lives in the repository layer, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleTable {
    slots: Vec<SlotKey>,
    users: Vec<UserColumn>,
}

impl ScheduleTable {
    /// Creates an empty table with only the fixed key columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from raw rows/columns, restoring invariants.
    ///
    /// Over-short columns are padded with `Undecided`, over-long columns
    /// truncated, and duplicate slot rows dropped (first occurrence wins).
    pub fn from_parts(slots: Vec<SlotKey>, users: Vec<UserColumn>) -> Self {
        let mut table = Self { slots, users };
        table.normalize();
        table
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn slots(&self) -> &[SlotKey] {
        &self.slots
    }

    pub fn users(&self) -> &[UserColumn] {
        &self.users
    }

    /// Returns participant names in column order.
    pub fn user_names(&self) -> Vec<&str> {
        self.users.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn contains_slot(&self, key: &SlotKey) -> bool {
        self.slots.contains(key)
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.users.iter().any(|column| column.name == name)
    }

    /// Appends a slot row with `Undecided` in every user column.
    ///
    /// Returns `false` without mutating when the key already exists.
    pub fn push_slot(&mut self, key: SlotKey) -> bool {
        if self.contains_slot(&key) {
            return false;
        }
        self.slots.push(key);
        for column in &mut self.users {
            column.statuses.push(Status::Undecided);
        }
        true
    }

    /// Appends a user column back-filled with `Undecided` for every row.
    ///
    /// Returns `false` without mutating when the name already exists.
    pub fn add_user(&mut self, name: &str) -> bool {
        if self.has_user(name) {
            return false;
        }
        self.users.push(UserColumn::filled(name, self.slots.len()));
        true
    }

    /// Reads the status at a slot/user intersection.
    pub fn status_at(&self, key: &SlotKey, user: &str) -> Option<Status> {
        let row = self.slots.iter().position(|slot| slot == key)?;
        let column = self.users.iter().find(|column| column.name == user)?;
        column.statuses.get(row).copied()
    }

    /// Writes the status at a slot/user intersection.
    ///
    /// Returns `false` when either the slot or the user is unknown.
    pub fn set_status(&mut self, key: &SlotKey, user: &str, status: Status) -> bool {
        let Some(row) = self.slots.iter().position(|slot| slot == key) else {
            return false;
        };
        let Some(column) = self.users.iter_mut().find(|column| column.name == user) else {
            return false;
        };
        match column.statuses.get_mut(row) {
            Some(cell) => {
                *cell = status;
                true
            }
            None => false,
        }
    }

    /// Drops rows whose key repeats an earlier row. Returns removed count.
    pub fn dedup_slots(&mut self) -> usize {
        let mut seen = HashSet::new();
        let keep: Vec<bool> = self.slots.iter().map(|key| seen.insert(*key)).collect();
        let removed = keep.iter().filter(|kept| !**kept).count();
        if removed == 0 {
            return 0;
        }
        let mut row = 0;
        self.slots.retain(|_| {
            let kept = keep[row];
            row += 1;
            kept
        });
        for column in &mut self.users {
            let mut row = 0;
            column.statuses.retain(|_| {
                let kept = keep.get(row).copied().unwrap_or(false);
                row += 1;
                kept
            });
        }
        removed
    }

    /// Re-sorts rows by slot key, carrying every user column along.
    ///
    /// Returns `true` when the row order changed.
    pub fn sort_slots(&mut self) -> bool {
        let mut order: Vec<usize> = (0..self.slots.len()).collect();
        order.sort_by(|&a, &b| self.slots[a].cmp(&self.slots[b]));
        if order.iter().enumerate().all(|(target, &source)| target == source) {
            return false;
        }
        self.slots = order.iter().map(|&source| self.slots[source]).collect();
        for column in &mut self.users {
            column.statuses = order.iter().map(|&source| column.statuses[source]).collect();
        }
        true
    }

    /// Restores the completeness and uniqueness invariants in place.
    pub fn normalize(&mut self) {
        let rows = self.slots.len();
        for column in &mut self.users {
            column.statuses.resize(rows, Status::Undecided);
        }
        self.dedup_slots();
    }
}
