use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::sql::types::{DataType, Value};

/// Per-column constraint kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    None,
    PrimaryKey,
    Unique,
}

impl Constraint {
    /// Constrained columns are backed by an index
    pub fn is_indexed(&self) -> bool {
        matches!(self, Constraint::PrimaryKey | Constraint::Unique)
    }
}

/// Column schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
    pub constraint: Constraint,
    /// Always false for a primary key column
    pub nullable: bool,
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        datatype: DataType,
        constraint: Constraint,
        nullable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            datatype,
            nullable: nullable && constraint != Constraint::PrimaryKey,
            constraint,
        }
    }

    /// Checks a value against the declared type.
    ///
    /// Null needs a nullable column; FLOAT columns accept integers too.
    pub fn accepts(&self, value: &Value) -> bool {
        match (value, self.datatype) {
            (Value::Null, _) => self.nullable,
            (Value::Integer(_), DataType::Integer) => true,
            (Value::Text(_), DataType::Text) => true,
            (Value::Integer(_) | Value::Float(_), DataType::Float) => true,
            _ => false,
        }
    }

    /// Stored form of an accepted value: FLOAT columns keep integers as floats
    pub fn coerce(&self, value: &Value) -> Value {
        match (value, self.datatype) {
            (Value::Integer(n), DataType::Float) => Value::Float(*n as f64),
            _ => value.clone(),
        }
    }

    /// Whether a stored field equals a condition literal.
    ///
    /// The literal is read in the column's stored form, so `3` finds `3.0`
    /// in a FLOAT column. Other type mismatches are simply unequal.
    pub fn holds(&self, stored: &Value, literal: &Value) -> bool {
        match (stored, literal, self.datatype) {
            (Value::Float(a), Value::Integer(b), DataType::Float) => *a == *b as f64,
            _ => stored == literal,
        }
    }
}

/// Renders the column the way CREATE TABLE reports it, e.g. `id INT PRIMARY KEY`
impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.datatype)?;
        match self.constraint {
            Constraint::PrimaryKey => write!(f, " PRIMARY KEY")?,
            Constraint::Unique => write!(f, " UNIQUE")?,
            Constraint::None => {}
        }
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}
