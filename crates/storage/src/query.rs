use serde_json::Value;

/// Sort direction for an ordered select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    pub fn as_rest(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Equality predicate on a single column
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: SortDirection,
}

/// A select against one table: projection, equality filters and an optional ordering.
///
/// ```
/// use storage::query::{Query, SortDirection};
///
/// let query = Query::all()
///     .eq("status", "active")
///     .order("created_at", SortDirection::Ascending);
///
/// assert_eq!(query.filters.len(), 1);
/// assert!(query.columns.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// `None` selects every column
    pub columns: Option<Vec<String>>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(columns: &[&str]) -> Self {
        Self {
            columns: Some(columns.iter().map(|c| c.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some(Order {
            column: column.into(),
            direction,
        });
        self
    }

    /// Projection as a PostgREST `select` parameter
    pub fn select_param(&self) -> String {
        match &self.columns {
            Some(columns) => columns.join(","),
            None => "*".to_string(),
        }
    }
}

/// Text form of a JSON value as used by equality filters
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
