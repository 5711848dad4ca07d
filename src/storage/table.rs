use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::{
    error::{Error, Result},
    sql::{
        parser::ast::Conditions,
        schema::{Column, Constraint},
        types::{Record, Row, RowId, Value},
    },
    storage::index::Index,
};

/// A stored row: schema-ordered values plus the internal row id
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: RowId,
    pub values: Row,
}

/// Table: ordered column schema, row storage and one index per
/// PRIMARY KEY / UNIQUE column
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<StoredRow>,
    indexes: HashMap<String, Index>,
    next_row_id: RowId,
}

/// Summary of a table's schema and contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<Column>,
    pub row_count: usize,
    /// Indexed column names in schema order
    pub indexes: Vec<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let indexes = columns
            .iter()
            .filter(|c| c.constraint.is_indexed())
            .map(|c| (c.name.clone(), Index::new()))
            .collect();
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            indexes,
            next_row_id: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[StoredRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index(&self, column: &str) -> Option<&Index> {
        self.indexes.get(column)
    }

    /// Returns the column index for a given column name
    pub fn get_col_index(&self, col_name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == col_name)
    }

    fn must_get_col_index(&self, col_name: &str) -> Result<usize> {
        self.get_col_index(col_name)
            .ok_or_else(|| Error::UnknownColumn(col_name.to_string()))
    }

    pub fn info(&self) -> TableInfo {
        TableInfo {
            name: self.name.clone(),
            columns: self.columns.clone(),
            row_count: self.rows.len(),
            indexes: self
                .columns
                .iter()
                .filter(|c| self.indexes.contains_key(&c.name))
                .map(|c| c.name.clone())
                .collect(),
        }
    }

    /// Resolves the column, checks the value against its declared type and
    /// returns it in stored form
    fn validate(&self, col_name: &str, value: &Value) -> Result<(usize, Value)> {
        let pos = self.must_get_col_index(col_name)?;
        let column = &self.columns[pos];
        if !column.accepts(value) {
            return Err(Error::TypeMismatch {
                column: col_name.to_string(),
                value: value.to_string(),
            });
        }
        Ok((pos, column.coerce(value)))
    }

    /// Checks PRIMARY KEY / UNIQUE for `value` in column `pos`.
    ///
    /// `owner` is the row being updated: its own entry never conflicts.
    fn check_constraint(&self, pos: usize, value: &Value, owner: Option<RowId>) -> Result<()> {
        let column = &self.columns[pos];
        let taken = || {
            self.indexes
                .get(&column.name)
                .is_some_and(|index| index.is_held_by_other(value, owner))
        };
        match column.constraint {
            Constraint::PrimaryKey if value.is_null() => {
                Err(Error::NullPrimaryKey(column.name.clone()))
            }
            Constraint::PrimaryKey if taken() => Err(Error::PrimaryKeyViolation {
                column: column.name.clone(),
                value: value.to_string(),
            }),
            Constraint::Unique if !value.is_null() && taken() => Err(Error::UniqueViolation {
                column: column.name.clone(),
                value: value.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Inserts a row from a column -> value mapping and returns its id.
    ///
    /// Columns left out are stored as NULL. Nothing is written unless every
    /// check passes.
    pub fn insert(&mut self, values: &Record) -> Result<RowId> {
        let mut supplied = Vec::with_capacity(values.len());
        for (col_name, value) in values.iter() {
            supplied.push(self.validate(col_name, value)?);
        }
        for (pos, value) in &supplied {
            self.check_constraint(*pos, value, None)?;
        }
        // an omitted primary key would be stored as NULL
        if let Some(pk) = self
            .columns
            .iter()
            .find(|c| c.constraint == Constraint::PrimaryKey && !values.contains(&c.name))
        {
            return Err(Error::NullPrimaryKey(pk.name.clone()));
        }

        let mut row = vec![Value::Null; self.columns.len()];
        for (pos, value) in supplied {
            row[pos] = value;
        }

        let id = self.next_row_id;
        self.next_row_id += 1;
        for (column, value) in self.columns.iter().zip(row.iter()) {
            if let Some(index) = self.indexes.get_mut(&column.name) {
                index.add(value.clone(), id);
            }
        }
        self.rows.push(StoredRow { id, values: row });
        Ok(id)
    }

    /// Whether a row satisfies every condition (empty conditions match all).
    ///
    /// A condition naming a column the row doesn't have never matches.
    fn matches(&self, row: &StoredRow, conditions: Option<&Conditions>) -> bool {
        conditions.is_none_or(|conditions| {
            conditions.iter().all(|c| {
                self.get_col_index(&c.column)
                    .is_some_and(|pos| self.columns[pos].holds(&row.values[pos], &c.value))
            })
        })
    }

    fn matching_ids(&self, conditions: Option<&Conditions>) -> Vec<RowId> {
        self.rows
            .iter()
            .filter(|row| self.matches(row, conditions))
            .map(|row| row.id)
            .collect()
    }

    /// Converts a stored row to an output record (without the row id)
    pub fn to_record(&self, row: &StoredRow) -> Record {
        self.columns
            .iter()
            .zip(row.values.iter())
            .map(|(c, v)| (c.name.clone(), v.clone()))
            .collect()
    }

    /// Linear scan in row order
    pub fn find(&self, conditions: Option<&Conditions>) -> Vec<Record> {
        self.rows
            .iter()
            .filter(|row| self.matches(row, conditions))
            .map(|row| self.to_record(row))
            .collect()
    }

    /// Updates every matching row and returns how many rows matched.
    ///
    /// Each row is validated in full (types, then PRIMARY KEY / UNIQUE with
    /// the row's own old values withdrawn) before any of its columns are
    /// written, so a rejected row keeps its values and index entries. Rows
    /// written before a rejected one stay written.
    pub fn update(&mut self, conditions: Option<&Conditions>, new_values: &Record) -> Result<usize> {
        let ids = self.matching_ids(conditions);
        let mut count = 0;

        for id in ids {
            let Some(slot) = self.rows.iter().position(|r| r.id == id) else {
                continue;
            };

            let mut targets = Vec::with_capacity(new_values.len());
            for (col_name, value) in new_values.iter() {
                targets.push(self.validate(col_name, value)?);
            }

            let changes = targets
                .into_iter()
                .filter(|(pos, value)| self.rows[slot].values[*pos] != *value)
                .collect::<Vec<_>>();
            for (pos, value) in &changes {
                self.check_constraint(*pos, value, Some(id))?;
            }

            for (pos, value) in changes {
                let old = std::mem::replace(&mut self.rows[slot].values[pos], value.clone());
                if let Some(index) = self.indexes.get_mut(&self.columns[pos].name) {
                    index.remove(&old, id);
                    index.add(value, id);
                }
            }
            count += 1;
        }
        Ok(count)
    }

    /// Deletes every matching row and returns how many were removed
    pub fn delete(&mut self, conditions: Option<&Conditions>) -> usize {
        let ids = self.matching_ids(conditions).into_iter().collect::<HashSet<_>>();
        for row in self.rows.iter().filter(|r| ids.contains(&r.id)) {
            for (column, value) in self.columns.iter().zip(row.values.iter()) {
                if let Some(index) = self.indexes.get_mut(&column.name) {
                    index.remove(value, row.id);
                }
            }
        }
        self.rows.retain(|r| !ids.contains(&r.id));
        ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Table;
    use crate::{
        error::{Error, Result},
        sql::{
            parser::ast::{Condition, Conditions},
            schema::{Column, Constraint},
            types::{DataType, Record, Value},
        },
    };

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id", DataType::Integer, Constraint::PrimaryKey, false),
                Column::new("name", DataType::Text, Constraint::None, false),
                Column::new("email", DataType::Text, Constraint::Unique, true),
                Column::new("score", DataType::Float, Constraint::None, true),
            ],
        )
    }

    fn record(fields: Vec<(&str, Value)>) -> Record {
        fields.into_iter().collect()
    }

    fn eq(column: &str, value: Value) -> Conditions {
        Conditions::from_iter(vec![Condition {
            column: column.to_string(),
            value,
            reference: None,
        }])
    }

    /// Every live row is indexed under its current value, and nothing else is
    fn assert_indexes_consistent(table: &Table) {
        for column in table.columns().iter().filter(|c| c.constraint.is_indexed()) {
            let index = table.index(&column.name).expect("missing index");
            let pos = table.get_col_index(&column.name).unwrap();
            let mut indexed = 0;
            for (value, ids) in index.iter() {
                assert!(!ids.is_empty());
                for id in ids {
                    let row = table.rows().iter().find(|r| r.id == *id).expect("stale id");
                    assert_eq!(&row.values[pos], value);
                    indexed += 1;
                }
            }
            assert_eq!(indexed, table.len());
        }
    }

    #[test]
    fn test_insert_fills_nulls_and_assigns_ids() -> Result<()> {
        let mut t = users();
        let id1 = t.insert(&record(vec![("id", Value::Integer(1)), ("name", "Alice".into())]))?;
        let id2 = t.insert(&record(vec![
            ("name", "Bob".into()),
            ("id", Value::Integer(2)),
            ("score", Value::Integer(3)),
        ]))?;
        assert_eq!((id1, id2), (1, 2));

        let rows = t.find(None);
        assert_eq!(
            rows[0],
            record(vec![
                ("id", Value::Integer(1)),
                ("name", "Alice".into()),
                ("email", Value::Null),
                ("score", Value::Null),
            ])
        );
        // FLOAT columns store integers as floats
        assert_eq!(rows[1].get("score"), Some(&Value::Float(3.0)));
        assert_indexes_consistent(&t);
        Ok(())
    }

    #[test]
    fn test_insert_validation() -> Result<()> {
        let mut t = users();
        assert_eq!(
            t.insert(&record(vec![("id", Value::Integer(1)), ("age", Value::Integer(3))])),
            Err(Error::UnknownColumn("age".to_string()))
        );
        assert!(matches!(
            t.insert(&record(vec![("id", "x".into())])),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            t.insert(&record(vec![("id", Value::Integer(1)), ("name", Value::Null)])),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(
            t.insert(&record(vec![("name", "nobody".into())])),
            Err(Error::NullPrimaryKey("id".to_string()))
        );
        assert!(t.is_empty());
        Ok(())
    }

    #[test]
    fn test_insert_constraints() -> Result<()> {
        let mut t = users();
        t.insert(&record(vec![("id", Value::Integer(1)), ("name", "A".into()), ("email", "a@x".into())]))?;
        assert_eq!(
            t.insert(&record(vec![("id", Value::Integer(1)), ("name", "B".into())])),
            Err(Error::PrimaryKeyViolation {
                column: "id".to_string(),
                value: "1".to_string()
            })
        );
        assert_eq!(
            t.insert(&record(vec![("id", Value::Integer(2)), ("name", "B".into()), ("email", "a@x".into())])),
            Err(Error::UniqueViolation {
                column: "email".to_string(),
                value: "a@x".to_string()
            })
        );
        // several NULLs are fine in a UNIQUE column
        t.insert(&record(vec![("id", Value::Integer(2)), ("name", "B".into()), ("email", Value::Null)]))?;
        t.insert(&record(vec![("id", Value::Integer(3)), ("name", "C".into())]))?;
        assert_eq!(t.len(), 3);
        // failed inserts don't consume row ids
        assert_eq!(t.rows().last().map(|r| r.id), Some(3));
        assert_indexes_consistent(&t);
        Ok(())
    }

    #[test]
    fn test_find_strict_equality() -> Result<()> {
        let mut t = users();
        t.insert(&record(vec![("id", Value::Integer(1)), ("name", "A".into()), ("score", Value::Integer(2))]))?;
        assert_eq!(t.find(Some(&eq("score", Value::Integer(2)))).len(), 1);
        assert_eq!(t.find(Some(&eq("score", Value::Float(2.0)))).len(), 1);
        assert_eq!(t.find(Some(&eq("score", "2".into()))).len(), 0);
        assert_eq!(t.find(Some(&eq("id", Value::Float(1.0)))).len(), 0);
        assert_eq!(t.find(Some(&eq("missing", Value::Integer(2)))).len(), 0);
        assert_eq!(t.find(Some(&eq("email", Value::Null))).len(), 1);
        assert_eq!(t.find(Some(&Conditions::new())).len(), 1);
        Ok(())
    }

    #[test]
    fn test_float_unique_treats_integer_and_float_alike() -> Result<()> {
        let mut t = Table::new(
            "prices",
            vec![
                Column::new("id", DataType::Integer, Constraint::PrimaryKey, false),
                Column::new("price", DataType::Float, Constraint::Unique, true),
            ],
        );
        t.insert(&record(vec![("id", Value::Integer(1)), ("price", Value::Integer(3))]))?;
        assert_eq!(
            t.insert(&record(vec![("id", Value::Integer(2)), ("price", Value::Float(3.0))])),
            Err(Error::UniqueViolation {
                column: "price".to_string(),
                value: "3.0".to_string()
            })
        );
        t.insert(&record(vec![("id", Value::Integer(2)), ("price", Value::Float(4.5))]))?;

        // an integer SET value is stored as a float too
        assert!(matches!(
            t.update(Some(&eq("id", Value::Integer(2))), &record(vec![("price", Value::Integer(3))])),
            Err(Error::UniqueViolation { .. })
        ));
        assert_eq!(t.update(Some(&eq("id", Value::Integer(2))), &record(vec![("price", Value::Integer(5))]))?, 1);
        assert_eq!(t.rows()[1].values[1], Value::Float(5.0));

        assert_eq!(t.find(Some(&eq("price", Value::Float(3.0)))).len(), 1);
        assert_eq!(t.find(Some(&eq("price", Value::Integer(5)))).len(), 1);
        assert_indexes_consistent(&t);
        Ok(())
    }

    #[test]
    fn test_update_keeps_own_key_and_ids() -> Result<()> {
        let mut t = users();
        t.insert(&record(vec![("id", Value::Integer(1)), ("name", "A".into()), ("email", "a@x".into())]))?;
        t.insert(&record(vec![("id", Value::Integer(2)), ("name", "B".into()), ("email", "b@x".into())]))?;

        // setting a row's key to its current value is not a conflict
        let n = t.update(
            Some(&eq("id", Value::Integer(1))),
            &record(vec![("id", Value::Integer(1)), ("email", "a@x".into()), ("name", "Z".into())]),
        )?;
        assert_eq!(n, 1);

        let n = t.update(Some(&eq("id", Value::Integer(2))), &record(vec![("id", Value::Integer(20))]))?;
        assert_eq!(n, 1);
        assert_eq!(t.rows()[1].id, 2);
        assert_eq!(t.rows()[1].values[0], Value::Integer(20));
        assert!(t.index("id").unwrap().find(&Value::Integer(2)).is_none());
        assert_indexes_consistent(&t);

        // no matches, nothing validated
        assert_eq!(t.update(Some(&eq("id", Value::Integer(99))), &record(vec![("nope", Value::Integer(1))]))?, 0);
        Ok(())
    }

    #[test]
    fn test_update_rejected_row_is_untouched() -> Result<()> {
        let mut t = users();
        t.insert(&record(vec![("id", Value::Integer(1)), ("name", "A".into()), ("email", "a@x".into())]))?;
        t.insert(&record(vec![("id", Value::Integer(2)), ("name", "B".into()), ("email", "b@x".into())]))?;

        // id change is fine on its own, the email clashes with row 1
        let err = t.update(
            Some(&eq("id", Value::Integer(2))),
            &record(vec![("id", Value::Integer(5)), ("email", "a@x".into())]),
        );
        assert!(matches!(err, Err(Error::UniqueViolation { .. })));
        assert_eq!(t.rows()[1].values[0], Value::Integer(2));
        assert_eq!(t.rows()[1].values[2], Value::Text("b@x".into()));
        assert!(t.index("id").unwrap().find(&Value::Integer(5)).is_none());
        assert_indexes_consistent(&t);

        assert!(matches!(
            t.update(None, &record(vec![("score", "high".into())])),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            t.update(None, &record(vec![("id", Value::Null)])),
            Err(Error::TypeMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_update_unique_across_rows() -> Result<()> {
        let mut t = users();
        t.insert(&record(vec![("id", Value::Integer(1)), ("name", "A".into())]))?;
        t.insert(&record(vec![("id", Value::Integer(2)), ("name", "B".into())]))?;

        // the first row takes the value, the second is rejected
        let err = t.update(None, &record(vec![("email", "same@x".into())]));
        assert!(matches!(err, Err(Error::UniqueViolation { .. })));
        assert_eq!(t.find(Some(&eq("email", "same@x".into()))).len(), 1);
        assert_indexes_consistent(&t);
        Ok(())
    }

    #[test]
    fn test_delete() -> Result<()> {
        let mut t = users();
        for i in 1..=3 {
            t.insert(&record(vec![("id", Value::Integer(i)), ("name", "n".into()), ("email", format!("{i}@x").into())]))?;
        }
        assert_eq!(t.delete(Some(&eq("id", Value::Integer(2)))), 1);
        assert_eq!(t.len(), 2);
        assert!(t.index("email").unwrap().find(&"2@x".into()).is_none());
        assert_indexes_consistent(&t);

        // ids are never reused
        let id = t.insert(&record(vec![("id", Value::Integer(2)), ("name", "again".into())]))?;
        assert_eq!(id, 4);

        assert_eq!(t.delete(Some(&eq("name", "none".into()))), 0);
        assert_eq!(t.delete(None), 3);
        assert!(t.is_empty());
        assert_indexes_consistent(&t);
        Ok(())
    }

    #[test]
    fn test_info() -> Result<()> {
        let mut t = users();
        t.insert(&record(vec![("id", Value::Integer(1)), ("name", "A".into())]))?;
        let info = t.info();
        assert_eq!(info.name, "users");
        assert_eq!(info.row_count, 1);
        assert_eq!(info.indexes, vec!["id".to_string(), "email".to_string()]);
        assert_eq!(info.columns.len(), 4);
        Ok(())
    }
}
