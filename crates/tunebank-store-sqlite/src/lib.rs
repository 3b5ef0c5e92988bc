// tunebank-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Record Database
// Description: Durable RecordDatabase backend using SQLite.
// Purpose: Provide production-grade persistence for Tunebank tuning records.
// Dependencies: tunebank-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a `SQLite`-backed [`tunebank_core::RecordDatabase`]
//! implementation persisting two append-only tables: deduplicated workloads
//! and their tuning records. Rows are written with parameter-bound
//! statements, one connection per operation, so there is never a dangling
//! transaction to recover after a crash.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::AdapterError;
pub use adapter::ConnectionSettings;
pub use adapter::SqliteJournalMode;
pub use adapter::SqliteSyncMode;
pub use store::SqliteDatabase;
pub use store::SqliteDatabaseConfig;
