//! SQL processing module
//!
//! This module provides:
//! - `parser`: SQL lexer and statement parser
//! - `types`: SQL data types and values
//! - `schema`: Column schema definitions
//! - `executor`: Statement execution against the database
//! - `engine`: Sessions and statement results

pub mod parser;
pub mod types;
pub mod schema;
pub mod executor;
pub mod engine;
