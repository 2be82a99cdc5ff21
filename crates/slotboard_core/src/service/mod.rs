//! Store use-case services.
//!
//! # Responsibility
//! - Orchestrate table mutations and persistence into use-case APIs.
//! - Keep presentation/export collaborators decoupled from storage.

pub mod export_service;
pub mod store_service;
