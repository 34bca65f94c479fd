//! # Quantlens Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database. It is the system's archive of finished analyses.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate encapsulates all database-specific logic. It
//!   provides a clean API to the rest of the application, hiding the
//!   underlying SQL.
//! - **Opaque Payloads:** An `AssetAnalysis` is stored whole as JSONB, so the
//!   report shape can evolve without schema migrations.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses a
//!   connection pool (`PgPool`) for concurrent database access.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: Applies the bundled migrations.
//! - `DbRepository`: Holds the pool and provides `upsert_user`,
//!   `save_analysis` and `list_analyses`.
//! - `AnalysisStore`: The narrow save interface the analyzer depends on.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, StoredAnalysis};
pub use store::AnalysisStore;
