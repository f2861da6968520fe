//! Core library for TaskDesk.
//!
//! This crate provides the task and project models, the key-value store they
//! are persisted in, the repository that owns them and the view logic that
//! slices them per organization, independent of any transport layer (HTTP,
//! CLI, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use taskdesk_core::models::*;
//! use taskdesk_core::{Database, Repository};
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let repo = Repository::load(db)?;
//! let tasks = repo.list_tasks(Organization::HumanizeIq);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod models;
pub mod repository;
pub mod store;
pub mod views;

// Re-export commonly used types at crate root
pub use db::Database;
pub use repository::Repository;
pub use store::Store;
