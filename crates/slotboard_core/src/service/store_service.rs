//! Schedule store use-case service.
//!
//! # Responsibility
//! - Own the canonical table and run every read-modify-write cycle.
//! - Reconcile whole-table edits coming back from the grid collaborator.
//! - Persist through the repository after every accepted mutation.
//!
//! # Invariants
//! - `load` never fails; degraded persistence yields an empty table.
//! - Duplicate slot/user requests abort before any state change.
//! - Canonical state always satisfies the uniqueness and completeness
//!   invariants of `ScheduleTable`, including after merges.

use crate::model::table::{
    ScheduleTable, SlotKey, SlotValidationError, Status, SELECTABLE_STATUSES,
};
use crate::repo::{FetchOutcome, RepoError, ScheduleRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error taxonomy for store mutations.
///
/// Duplicate variants are user-visible warnings: the operation aborts
/// and canonical state is untouched.
#[derive(Debug)]
pub enum StoreError {
    /// A slot with the identical composite key already exists.
    DuplicateSlot(SlotKey),
    /// The name already names an existing participant column.
    DuplicateUser(String),
    /// Participant name is empty or blank.
    InvalidUserName,
    /// The slot key fields are inconsistent.
    Slot(SlotValidationError),
    /// Persistence failed while writing the mutated table.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateSlot(key) => write!(f, "slot {key} already exists"),
            Self::DuplicateUser(name) => write!(f, "participant `{name}` already exists"),
            Self::InvalidUserName => write!(f, "participant name cannot be empty"),
            Self::Slot(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Slot(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SlotValidationError> for StoreError {
    fn from(value: SlotValidationError) -> Self {
        Self::Slot(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of reconciling an externally edited table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The edited table equals canonical state; nothing was persisted.
    Unchanged,
    /// Canonical state was replaced wholesale and persisted.
    Replaced,
}

/// Per-user editor column config for the grid collaborator.
///
/// Mirrors the enum-constrained select column the presentation layer
/// builds for each participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumnConfig {
    pub label: String,
    pub options: Vec<Status>,
}

/// Canonical schedule state plus its persistence collaborator.
pub struct ScheduleStore<R: ScheduleRepository> {
    repo: R,
    table: ScheduleTable,
}

impl<R: ScheduleRepository> ScheduleStore<R> {
    /// Loads canonical state from the repository.
    ///
    /// # Contract
    /// - Never fails: a missing, unreadable or malformed document
    ///   degrades to an empty table with only the key columns.
    pub fn load(repo: R) -> Self {
        let table = match repo.fetch() {
            FetchOutcome::Document(table) => {
                info!(
                    "event=store_load module=service status=ok rows={} users={}",
                    table.slot_count(),
                    table.user_count()
                );
                table
            }
            FetchOutcome::Missing => {
                info!("event=store_load module=service status=empty reason=missing");
                ScheduleTable::new()
            }
            FetchOutcome::Unreadable(reason) => {
                warn!("event=store_load module=service status=degraded reason=unreadable detail={reason}");
                ScheduleTable::new()
            }
            FetchOutcome::Malformed(reason) => {
                warn!("event=store_load module=service status=degraded reason=malformed detail={reason}");
                ScheduleTable::new()
            }
        };
        Self { repo, table }
    }

    /// Read access to canonical state for rendering.
    pub fn table(&self) -> &ScheduleTable {
        &self.table
    }

    /// Adds a new slot row and persists.
    ///
    /// # Contract
    /// - Validates the key before any mutation.
    /// - `Err(DuplicateSlot)` when the composite key already exists;
    ///   canonical state is untouched.
    /// - Every existing participant column gets `Undecided` for the new
    ///   row; a not-yet-known requesting participant is added first,
    ///   back-filled with `Undecided` across existing rows.
    pub fn add_slot(&mut self, key: SlotKey, requesting_user: Option<&str>) -> StoreResult<()> {
        key.validate()?;
        if self.table.contains_slot(&key) {
            warn!("event=slot_add module=service status=duplicate slot={key}");
            return Err(StoreError::DuplicateSlot(key));
        }

        if let Some(name) = requesting_user {
            let name = name.trim();
            if !name.is_empty() && self.table.add_user(name) {
                info!("event=user_add module=service status=ok name={name} origin=slot_add");
            }
        }

        self.table.push_slot(key);
        self.save()?;
        info!(
            "event=slot_add module=service status=ok slot={key} rows={}",
            self.table.slot_count()
        );
        Ok(())
    }

    /// Adds a new participant column and persists.
    ///
    /// # Contract
    /// - `Err(InvalidUserName)` for empty/blank names.
    /// - `Err(DuplicateUser)` when the column exists; no state change.
    /// - The new column is back-filled with `Undecided` for every row.
    pub fn add_user(&mut self, name: &str) -> StoreResult<()> {
        let name = name.trim();
        if name.is_empty() {
            warn!("event=user_add module=service status=rejected reason=empty_name");
            return Err(StoreError::InvalidUserName);
        }
        if !self.table.add_user(name) {
            warn!("event=user_add module=service status=duplicate name={name}");
            return Err(StoreError::DuplicateUser(name.to_string()));
        }
        self.save()?;
        info!(
            "event=user_add module=service status=ok name={name} users={}",
            self.table.user_count()
        );
        Ok(())
    }

    /// Reconciles a table snapshot edited by the grid collaborator.
    ///
    /// # Contract
    /// - Compares by full structural equality (keys, columns, values,
    ///   row order) after restoring table invariants on the snapshot.
    /// - Equal: `Unchanged`, nothing persisted.
    /// - Different: canonical state replaced wholesale, persisted.
    ///   Last full write wins; there is no per-cell diffing.
    pub fn merge_edited(&mut self, edited: ScheduleTable) -> StoreResult<MergeOutcome> {
        let mut incoming = edited;
        incoming.normalize();

        if incoming == self.table {
            info!("event=grid_merge module=service status=unchanged");
            return Ok(MergeOutcome::Unchanged);
        }

        self.table = incoming;
        self.save()?;
        info!(
            "event=grid_merge module=service status=replaced rows={} users={}",
            self.table.slot_count(),
            self.table.user_count()
        );
        Ok(MergeOutcome::Replaced)
    }

    /// Re-sorts rows by slot key and persists when the order changed.
    pub fn sort_slots(&mut self) -> StoreResult<bool> {
        if !self.table.sort_slots() {
            return Ok(false);
        }
        self.save()?;
        info!("event=slot_sort module=service status=ok rows={}", self.table.slot_count());
        Ok(true)
    }

    /// Writes the full canonical table through the repository.
    ///
    /// Deterministic: re-saving identical state produces an identical
    /// document.
    pub fn save(&self) -> StoreResult<()> {
        self.repo.store(&self.table)?;
        Ok(())
    }

    /// Editor column configs for the grid collaborator, one per
    /// participant, each constrained to the selectable statuses.
    pub fn editor_columns(&self) -> Vec<SelectColumnConfig> {
        self.table
            .users()
            .iter()
            .map(|column| SelectColumnConfig {
                label: column.name.clone(),
                options: SELECTABLE_STATUSES.to_vec(),
            })
            .collect()
    }
}
