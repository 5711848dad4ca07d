use crate::sql::{
    schema::Column,
    types::{Record, Value},
};

/// Typed command produced from one SQL statement
#[derive(Debug, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable {
        name: String,
        columns: Vec<Column>,
    },
    /// INSERT statement, column -> value in the order given
    Insert {
        table_name: String,
        values: Record,
    },
    /// SELECT statement
    Select {
        /// `["*"]` or literal projection keys
        columns: Vec<String>,
        table_name: String,
        where_clause: Option<Conditions>,
        join: Option<Join>,
    },
    /// UPDATE statement
    Update {
        table_name: String,
        columns: Record,
        where_clause: Option<Conditions>,
    },
    /// DELETE statement
    Delete {
        table_name: String,
        where_clause: Option<Conditions>,
    },
}

impl Statement {
    /// Short command name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable { .. } => "create_table",
            Statement::Insert { .. } => "insert",
            Statement::Select { .. } => "select",
            Statement::Update { .. } => "update",
            Statement::Delete { .. } => "delete",
        }
    }
}

/// `JOIN <table> ON <conditions>`
#[derive(Debug, PartialEq)]
pub struct Join {
    pub table_name: String,
    pub predicate: Conditions,
}

/// One `key = value` conjunct
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// `col` or `table.col`
    pub column: String,
    pub value: Value,
    /// Set when the right-hand side was an unquoted identifier such as
    /// `users.id`. Joins may resolve it to a field of the other row; every
    /// other context uses `value`, which holds the identifier as text.
    pub reference: Option<String>,
}

impl Condition {
    /// Splits `table.col` into its parts; None for an unqualified key
    pub fn qualified(&self) -> Option<(&str, &str)> {
        self.column.split_once('.')
    }
}

/// Conjunction of equality conditions; a repeated key keeps the last value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, condition: Condition) {
        match self.0.iter_mut().find(|c| c.column == condition.column) {
            Some(existing) => *existing = condition,
            None => self.0.push(condition),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<Condition> for Conditions {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        let mut conditions = Conditions::new();
        for c in iter {
            conditions.push(c);
        }
        conditions
    }
}

impl<'a> IntoIterator for &'a Conditions {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
