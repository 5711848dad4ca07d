use serde::Serialize;
use tracing::{debug, debug_span};

use crate::{
    error::Result,
    sql::{
        executor::{Executor, ResultSet},
        parser::{Parser, ast::Statement},
        types::{Record, Value},
    },
    storage::Database,
};

/// Uniform statement result handed to the caller (web layer or shell)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub success: bool,
    /// Human-readable, for display only
    pub message: String,
    pub data: Option<Vec<Record>>,
    /// Rows touched by INSERT/UPDATE/DELETE, 0 otherwise
    pub affected_rows: usize,
}

impl QueryResult {
    fn ok(message: String, data: Option<Vec<Record>>, affected_rows: usize) -> Self {
        Self {
            success: true,
            message,
            data,
            affected_rows,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            data: None,
            affected_rows: 0,
        }
    }
}

impl From<ResultSet> for QueryResult {
    fn from(result: ResultSet) -> Self {
        match result {
            ResultSet::CreateTable {
                table_name,
                columns,
            } => {
                let columns = columns
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                QueryResult::ok(
                    format!("Table '{}' created with columns: {}", table_name, columns),
                    None,
                    0,
                )
            }
            ResultSet::Insert { table_name, row_id } => QueryResult::ok(
                format!("Inserted 1 row into '{}' (ID: {})", table_name, row_id),
                None,
                1,
            ),
            ResultSet::Scan { table_name, rows } => QueryResult::ok(
                format!("Selected {} rows from '{}'", rows.len(), table_name),
                Some(rows),
                0,
            ),
            ResultSet::Join { left, right, rows } => QueryResult::ok(
                format!(
                    "Selected {} rows from JOIN of '{}' and '{}'",
                    rows.len(),
                    left,
                    right
                ),
                Some(rows),
                0,
            ),
            ResultSet::Update { table_name, count } => QueryResult::ok(
                format!("Updated {} rows in '{}'", count, table_name),
                None,
                count,
            ),
            ResultSet::Delete { table_name, count } => QueryResult::ok(
                format!("Deleted {} rows from '{}'", count, table_name),
                None,
                count,
            ),
        }
    }
}

/// SQL session for executing statements against one database
///
/// The session holds the database's exclusive borrow, so statements run
/// one at a time and each runs to completion.
pub struct Session<'a> {
    db: &'a mut Database,
}

impl<'a> Session<'a> {
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// Executes a SQL statement
    ///
    /// Never fails: parse, schema, validation and constraint errors come
    /// back as a result with `success == false` and the error message.
    pub fn execute(&mut self, sql: &str) -> QueryResult {
        let span = debug_span!("execute");
        let _guard = span.enter();

        let stmt = match Parser::new(sql).parse() {
            Ok(stmt) => stmt,
            Err(err) => {
                debug!(kind = ?err.kind(), %err, "parse failed");
                return QueryResult::failure(format!("Error: {}", err));
            }
        };
        debug!(command = stmt.kind(), "parsed statement");

        let action = match &stmt {
            Statement::CreateTable { .. } => "create table",
            Statement::Insert { .. } => "insert",
            Statement::Select { join: Some(_), .. } => "join",
            Statement::Select { .. } => "select",
            Statement::Update { .. } => "update",
            Statement::Delete { .. } => "delete",
        };
        match <dyn Executor>::build(stmt).execute(self.db) {
            Ok(result) => result.into(),
            Err(err) => {
                debug!(kind = ?err.kind(), %err, "statement failed");
                QueryResult::failure(format!("Failed to {}: {}", action, err))
            }
        }
    }

    /// Describes one table: name, row count, indexed columns and columns
    pub fn table_info(&self, name: &str) -> QueryResult {
        match self.describe(name) {
            Ok(record) => {
                QueryResult::ok(format!("Table info for '{}'", name), Some(vec![record]), 0)
            }
            Err(err) => QueryResult::failure(format!("Failed to get table info: {}", err)),
        }
    }

    fn describe(&self, name: &str) -> Result<Record> {
        let info = self.db.get_table(name)?.info();
        let columns = info
            .columns
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>();
        Ok(Record::from_iter(vec![
            ("name", Value::Text(info.name)),
            ("columns", Value::Text(columns.join(", "))),
            ("row_count", Value::Integer(info.row_count as i64)),
            ("indexes", Value::Text(info.indexes.join(", "))),
        ]))
    }

    /// Lists all tables, one `{name}` record each
    pub fn list_tables(&self) -> QueryResult {
        let tables = self.db.list_tables();
        let data = tables
            .iter()
            .map(|name| Record::from_iter(vec![("name", Value::from(*name))]))
            .collect::<Vec<_>>();
        QueryResult::ok(format!("Found {} tables", tables.len()), Some(data), 0)
    }
}

impl Database {
    /// Opens a session on this database
    pub fn session(&mut self) -> Session<'_> {
        Session::new(self)
    }
}
