use crate::{
    error::Result,
    sql::{
        executor::{
            join::NestedLoopJoin,
            mutation::{Delete, Insert, Update},
            query::{Projection, Scan},
            schema::CreateTable,
        },
        parser::ast::Statement,
        schema::Column,
        types::{Record, RowId},
    },
    storage::Database,
};

mod join;
mod mutation;
mod query;
mod schema;

/// SQL executor trait
pub trait Executor {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ResultSet>;
}

impl dyn Executor {
    /// Builds the executor tree for a parsed statement
    pub fn build(stmt: Statement) -> Box<dyn Executor> {
        match stmt {
            Statement::CreateTable { name, columns } => CreateTable::new(name, columns),
            Statement::Insert { table_name, values } => Insert::new(table_name, values),
            Statement::Select {
                columns,
                table_name,
                where_clause,
                join,
            } => {
                let source: Box<dyn Executor> = match join {
                    Some(join) => NestedLoopJoin::new(
                        table_name,
                        join.table_name,
                        join.predicate,
                        where_clause,
                    ),
                    None => Scan::new(table_name, where_clause),
                };
                Projection::new(source, columns)
            }
            Statement::Update {
                table_name,
                columns,
                where_clause,
            } => Update::new(table_name, columns, where_clause),
            Statement::Delete {
                table_name,
                where_clause,
            } => Delete::new(table_name, where_clause),
        }
    }
}

/// Execution result set
#[derive(Debug, PartialEq)]
pub enum ResultSet {
    CreateTable {
        table_name: String,
        columns: Vec<Column>,
    },
    Insert {
        table_name: String,
        row_id: RowId,
    },
    Scan {
        table_name: String,
        rows: Vec<Record>,
    },
    Join {
        left: String,
        right: String,
        rows: Vec<Record>,
    },
    Update {
        table_name: String,
        count: usize,
    },
    Delete {
        table_name: String,
        count: usize,
    },
}
