use std::collections::{HashMap, HashSet};

use crate::sql::types::{RowId, Value};

/// Hash index: column value -> ids of the rows currently holding it
///
/// A value whose id set becomes empty is dropped from the map.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Index {
    entries: HashMap<Value, HashSet<RowId>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: Value, id: RowId) {
        self.entries.entry(value).or_default().insert(id);
    }

    pub fn remove(&mut self, value: &Value, id: RowId) {
        if let Some(ids) = self.entries.get_mut(value) {
            ids.remove(&id);
            if ids.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    /// Row ids holding `value`
    pub fn find(&self, value: &Value) -> Option<&HashSet<RowId>> {
        self.entries.get(value)
    }

    /// Whether a row other than `except` holds `value`
    pub fn is_held_by_other(&self, value: &Value, except: Option<RowId>) -> bool {
        self.find(value)
            .is_some_and(|ids| ids.iter().any(|id| Some(*id) != except))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &HashSet<RowId>)> {
        self.entries.iter()
    }
}
