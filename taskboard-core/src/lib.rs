//! Core library for Taskboard.
//!
//! This crate provides the record models, the document store and the startup
//! seeder, independent of any transport layer.
//!
//! # Usage
//!
//! ```no_run
//! use taskboard_core::db::{seed_if_empty, Database};
//! use taskboard_core::models::Task;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//! seed_if_empty(&db)?;
//!
//! let tasks = db.list_all::<Task>()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod id;
pub mod models;

// Re-export commonly used types at crate root
pub use db::Database;
pub use id::new_id;
