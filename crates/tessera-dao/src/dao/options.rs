//! Filter, ordering and change-set arguments of DAO operations.

use crate::value::Value;

/// Exact-match conditions, combined with `AND`.
///
/// A `Null` value matches rows where the column `IS NULL`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    conditions: Vec<(String, Value)>,
}

impl Filters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `column = value`.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(c, v)| (c.as_str(), v))
    }
}

/// Column assignments of an update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    assignments: Vec<(String, Value)>,
}

impl Changes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `column = value`. Setting the same column twice keeps the last value.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.assignments.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.assignments.push((column, value)),
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.assignments.iter().map(|(c, v)| (c.as_str(), v))
    }
}

/// Sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    /// Descending order, the default direction.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }
}

/// Ordering and paging of `fetch_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub order_by: Option<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl FetchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_keep_order() {
        let filters = Filters::new().eq("title", "Dune").eq("author_id", Value::Null);
        let columns: Vec<_> = filters.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["title", "author_id"]);
        assert!(!filters.is_empty());
        assert!(Filters::default().is_empty());
    }

    #[test]
    fn test_changes_last_assignment_wins() {
        let changes = Changes::new().set("pages", 100).set("title", "X").set("pages", 200);
        assert_eq!(changes.len(), 2);
        let pages = changes.iter().find(|(c, _)| *c == "pages").unwrap().1;
        assert_eq!(pages, &Value::Int(200));
    }

    #[test]
    fn test_order_by_directions() {
        assert!(OrderBy::desc("created_at").descending);
        assert!(!OrderBy::asc("id").descending);
    }

    #[test]
    fn test_fetch_options_builder() {
        let options = FetchOptions::new().order_by(OrderBy::asc("id")).limit(2).offset(1);
        assert_eq!(options.limit, Some(2));
        assert_eq!(options.offset, Some(1));
        assert_eq!(options.order_by, Some(OrderBy::asc("id")));
    }
}
