//! minidb - A minimal in-memory relational database in Rust
//!
//! This crate provides a single-process SQL database with:
//! - SQL parsing for CREATE TABLE, INSERT, SELECT (with one JOIN), UPDATE and DELETE
//! - Typed tables with PRIMARY KEY, UNIQUE and NOT NULL constraints backed by hash indexes
//! - A nested-loop join and projection executor
//! - Sessions returning uniform, serializable statement results

pub mod error;
pub mod sql;
pub mod storage;

pub use error::{Error, ErrorKind, Result};
pub use sql::engine::{QueryResult, Session};
pub use storage::Database;
