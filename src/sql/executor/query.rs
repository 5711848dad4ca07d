use crate::{
    error::Result,
    sql::{executor::ResultSet, parser::ast::Conditions, types::Record},
    storage::Database,
};

use super::Executor;

/// Table scan executor (SELECT without JOIN)
pub struct Scan {
    table_name: String,
    filter: Option<Conditions>,
}

impl Scan {
    pub fn new(table_name: String, filter: Option<Conditions>) -> Box<Self> {
        Box::new(Self { table_name, filter })
    }
}

impl Executor for Scan {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ResultSet> {
        let table = db.get_table(&self.table_name)?;
        let rows = table.find(self.filter.as_ref());
        Ok(ResultSet::Scan {
            table_name: self.table_name,
            rows,
        })
    }
}

/// Projection executor - keeps the requested keys of each row
///
/// `*` keeps rows as they are. Otherwise keys are matched literally, so
/// after a join only `table.column` names match; a key a row doesn't have
/// is left out.
pub struct Projection {
    source: Box<dyn Executor>,
    columns: Vec<String>,
}

impl Projection {
    pub fn new(source: Box<dyn Executor>, columns: Vec<String>) -> Box<Self> {
        Box::new(Self { source, columns })
    }

    fn project(columns: &[String], rows: Vec<Record>) -> Vec<Record> {
        if columns.len() == 1 && columns[0] == "*" {
            return rows;
        }
        rows.into_iter()
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect()
            })
            .collect()
    }
}

impl Executor for Projection {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ResultSet> {
        let Projection { source, columns } = *self;
        Ok(match source.execute(db)? {
            ResultSet::Scan { table_name, rows } => ResultSet::Scan {
                table_name,
                rows: Self::project(&columns, rows),
            },
            ResultSet::Join { left, right, rows } => ResultSet::Join {
                left,
                right,
                rows: Self::project(&columns, rows),
            },
            other => other,
        })
    }
}
