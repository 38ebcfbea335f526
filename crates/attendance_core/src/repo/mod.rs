//! Persistence adapters for the attendance document.
//!
//! # Responsibility
//! - Define the whole-value key-value contract used by the service layer.
//! - Keep SQLite details inside the persistence boundary.
//!
//! # Invariants
//! - Adapters never interpret stored values; they only move strings.

pub mod blob_repo;
