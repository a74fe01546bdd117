//! SQLite storage implementation for Meerwerk.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `meerwerk-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations
//! - Repository implementations for quotes, work requests, and settings
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies
//! exist. `core` is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain)
//!                │
//!                ▼
//!      storage-sqlite (this crate)
//!                │
//!                ▼
//!            SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod quotes;
pub mod settings;
pub mod work_requests;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, run_migrations, spawn_writer, DbConnection, DbPool, WriteHandle,
};

// Re-export storage errors
pub use errors::StorageError;

// Re-export repositories
pub use quotes::QuoteRepository;
pub use settings::SettingsRepository;
pub use work_requests::WorkRequestRepository;

// Re-export from meerwerk-core for convenience
pub use meerwerk_core::errors::{DatabaseError, Error, Result};
