use crate::{
    error::Result,
    sql::{executor::Executor, schema::Column},
    storage::Database,
};

use super::ResultSet;

/// CREATE TABLE executor
pub struct CreateTable {
    name: String,
    columns: Vec<Column>,
}

impl CreateTable {
    pub fn new(name: String, columns: Vec<Column>) -> Box<Self> {
        Box::new(Self { name, columns })
    }
}

impl Executor for CreateTable {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ResultSet> {
        let table = db.create_table(&self.name, self.columns)?;
        tracing::debug!(table = %self.name, "created table");
        Ok(ResultSet::CreateTable {
            table_name: self.name,
            columns: table.columns().to_vec(),
        })
    }
}
