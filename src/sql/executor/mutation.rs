use crate::{
    error::Result,
    sql::{executor::ResultSet, parser::ast::Conditions, types::Record},
    storage::Database,
};

use super::Executor;

/// INSERT executor
pub struct Insert {
    table_name: String,
    values: Record,
}

impl Insert {
    pub fn new(table_name: String, values: Record) -> Box<Self> {
        Box::new(Self { table_name, values })
    }
}

impl Executor for Insert {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ResultSet> {
        let table = db.get_table_mut(&self.table_name)?;
        let row_id = table.insert(&self.values)?;
        tracing::debug!(table = %self.table_name, row_id, "inserted row");
        Ok(ResultSet::Insert {
            table_name: self.table_name,
            row_id,
        })
    }
}

/// UPDATE executor
pub struct Update {
    table_name: String,
    columns: Record,
    filter: Option<Conditions>,
}

impl Update {
    pub fn new(table_name: String, columns: Record, filter: Option<Conditions>) -> Box<Self> {
        Box::new(Self {
            table_name,
            columns,
            filter,
        })
    }
}

impl Executor for Update {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ResultSet> {
        let table = db.get_table_mut(&self.table_name)?;
        let count = table.update(self.filter.as_ref(), &self.columns)?;
        tracing::debug!(table = %self.table_name, count, "updated rows");
        Ok(ResultSet::Update {
            table_name: self.table_name,
            count,
        })
    }
}

/// DELETE executor
pub struct Delete {
    table_name: String,
    filter: Option<Conditions>,
}

impl Delete {
    pub fn new(table_name: String, filter: Option<Conditions>) -> Box<Self> {
        Box::new(Self { table_name, filter })
    }
}

impl Executor for Delete {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ResultSet> {
        let table = db.get_table_mut(&self.table_name)?;
        let count = table.delete(self.filter.as_ref());
        tracing::debug!(table = %self.table_name, count, "deleted rows");
        Ok(ResultSet::Delete {
            table_name: self.table_name,
            count,
        })
    }
}
