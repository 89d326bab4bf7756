//! Storage module for persistent data storage
//!
//! Provides SQLite-based persistence for extracted documents.

mod database;

pub use database::{DocumentDb, UpsertOutcome};
