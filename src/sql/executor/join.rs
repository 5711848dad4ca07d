use crate::{
    error::Result,
    sql::{
        parser::ast::{Condition, Conditions},
        types::{Record, Value},
    },
    storage::Database,
};

use super::{Executor, ResultSet};

/// Nested Loop Join executor - inner join of two tables
///
/// Every (left, right) pair of the unfiltered tables is tested against the
/// ON conditions, then the WHERE conditions; surviving pairs are merged into
/// one record keyed `left.col` / `right.col`.
pub struct NestedLoopJoin {
    left: String,
    right: String,
    predicate: Conditions,
    filter: Option<Conditions>,
}

impl NestedLoopJoin {
    pub fn new(
        left: String,
        right: String,
        predicate: Conditions,
        filter: Option<Conditions>,
    ) -> Box<Self> {
        Box::new(Self {
            left,
            right,
            predicate,
            filter,
        })
    }

    /// Evaluates one `key = value` conjunct against a pair.
    ///
    /// `table.col` keys read the named side; a table outside the join is
    /// ignored. Unqualified keys probe the left row, then the right one: a
    /// side holding the field with another value fails the pair, and the key
    /// is ignored when neither side has the field.
    fn check(&self, cond: &Condition, lrow: &Record, rrow: &Record) -> bool {
        let expected = self.operand(cond, lrow, rrow);
        match cond.qualified() {
            Some((table, col)) if table == self.left => {
                lrow.get(col).unwrap_or(&Value::Null) == expected
            }
            Some((table, col)) if table == self.right => {
                rrow.get(col).unwrap_or(&Value::Null) == expected
            }
            Some(_) => true,
            None => [lrow, rrow]
                .iter()
                .all(|row| row.get(&cond.column).is_none_or(|actual| actual == expected)),
        }
    }

    /// Right-hand side of a conjunct: a field of the pair when the literal
    /// was a bare identifier naming one, the literal value otherwise
    fn operand<'a>(&self, cond: &'a Condition, lrow: &'a Record, rrow: &'a Record) -> &'a Value {
        let field = cond.reference.as_deref().and_then(|r| match r.split_once('.') {
            Some((table, col)) if table == self.left => lrow.get(col),
            Some((table, col)) if table == self.right => rrow.get(col),
            Some(_) => None,
            None => lrow.get(r).or_else(|| rrow.get(r)),
        });
        field.unwrap_or(&cond.value)
    }

    fn matches(&self, conditions: &Conditions, lrow: &Record, rrow: &Record) -> bool {
        conditions.iter().all(|c| self.check(c, lrow, rrow))
    }

    fn merge(&self, lrow: &Record, rrow: &Record) -> Record {
        let left = lrow.iter().map(|(k, v)| (format!("{}.{}", self.left, k), v.clone()));
        let right = rrow.iter().map(|(k, v)| (format!("{}.{}", self.right, k), v.clone()));
        left.chain(right).collect()
    }
}

impl Executor for NestedLoopJoin {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ResultSet> {
        let lrows = db.get_table(&self.left)?.find(None);
        let rrows = db.get_table(&self.right)?.find(None);

        let mut rows = Vec::new();
        for lrow in &lrows {
            for rrow in &rrows {
                if !self.matches(&self.predicate, lrow, rrow) {
                    continue;
                }
                if let Some(filter) = &self.filter {
                    if !self.matches(filter, lrow, rrow) {
                        continue;
                    }
                }
                rows.push(self.merge(lrow, rrow));
            }
        }
        tracing::debug!(
            left = %self.left,
            right = %self.right,
            pairs = lrows.len().saturating_mul(rrows.len()),
            rows = rows.len(),
            "nested loop join"
        );

        Ok(ResultSet::Join {
            left: self.left,
            right: self.right,
            rows,
        })
    }
}
