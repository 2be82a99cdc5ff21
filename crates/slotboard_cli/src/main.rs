//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `slotboard_core` linkage.
//! - Print a deterministic summary of a store file for local checks.

use slotboard_core::{JsonFileRepository, ScheduleStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: slotboard_cli <store.json>");
        return ExitCode::FAILURE;
    };

    let store = ScheduleStore::load(JsonFileRepository::new(&path));
    let table = store.table();

    println!("slotboard_core version={}", slotboard_core::core_version());
    println!("slots={} users={}", table.slot_count(), table.user_count());

    for (row, key) in table.slots().iter().enumerate() {
        let cells = table
            .users()
            .iter()
            .map(|column| {
                let status = column.statuses.get(row).copied().unwrap_or_default();
                format!("{}={status}", column.name)
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("{key} {cells}");
    }

    ExitCode::SUCCESS
}
