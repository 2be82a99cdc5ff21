//! Core state model for the slotboard schedule poll.
//! This crate is the single source of truth for the canonical table,
//! its reconciliation rules and its persistence format.

pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::table::{
    ScheduleTable, SlotKey, SlotValidationError, Status, UserColumn, SELECTABLE_STATUSES,
};
pub use repo::{
    FetchOutcome, JsonFileRepository, MemoryRepository, RepoError, RepoResult, ScheduleRepository,
};
pub use service::export_service::table_to_csv;
pub use service::store_service::{
    MergeOutcome, ScheduleStore, SelectColumnConfig, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
