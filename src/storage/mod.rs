//! In-memory storage: the table registry, tables and their indexes

use std::collections::HashMap;

use crate::{
    error::{Error, Result},
    sql::schema::Column,
};

pub mod index;
pub mod table;

pub use table::{Table, TableInfo};

/// Registry of tables by name
///
/// Tables are created once and live as long as the database. A host that
/// shares one database between threads must serialize statements itself;
/// the `&mut self` receivers of the mutating calls express that.
#[derive(Debug, Default)]
pub struct Database {
    tables: HashMap<String, Table>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new table
    ///
    /// Fails with [`Error::TableExists`] if the name is taken.
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<&Table> {
        if self.tables.contains_key(name) {
            return Err(Error::TableExists(name.to_string()));
        }
        Ok(self
            .tables
            .entry(name.to_string())
            .or_insert(Table::new(name, columns)))
    }

    /// Returns table info, returns error if table doesn't exist
    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Table names in sorted order
    pub fn list_tables(&self) -> Vec<&str> {
        let mut names = self.tables.keys().map(|n| n.as_str()).collect::<Vec<_>>();
        names.sort();
        names
    }
}
