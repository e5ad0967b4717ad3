//! The [`QuerySet`] descriptor.
//!
//! Builder methods consume the queryset and return the modified one, so
//! they chain:
//!
//! ```
//! use brackets_db::{OrderBy, QuerySet};
//!
//! let qs = QuerySet::new("blog.Article")
//!     .select_related(vec!["author"])
//!     .prefetch_related(vec!["tags"])
//!     .order_by(vec![OrderBy::parse("-published")]);
//! assert_eq!(qs.get_select_related(), ["author"]);
//! assert_eq!(qs.ordering()[0].to_string(), "-published");
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A column ordering direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// The column to order by.
    pub column: String,
    /// Whether to sort in descending order.
    pub descending: bool,
}

impl OrderBy {
    /// Creates an ascending order.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Creates a descending order.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    /// Parses Django's ordering notation: `"name"` is ascending and
    /// `"-name"` descending.
    pub fn parse(field: &str) -> Self {
        field
            .strip_prefix('-')
            .map_or_else(|| Self::asc(field), Self::desc)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.column)
        } else {
            f.write_str(&self.column)
        }
    }
}

/// Describes the rows of one model a view works with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuerySet {
    model: String,
    select_related: Vec<String>,
    prefetch_related: Vec<String>,
    ordering: Vec<OrderBy>,
    filters: Vec<(String, Value)>,
}

impl QuerySet {
    /// Creates the default queryset of `model`: every row, unordered.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Returns the model label, e.g. `"blog.Article"`.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Adds related objects to fetch in the same query. Relations already
    /// selected are kept; repeats are ignored.
    #[must_use]
    pub fn select_related(mut self, fields: Vec<&str>) -> Self {
        for field in fields {
            if !self.select_related.iter().any(|f| f == field) {
                self.select_related.push(field.to_string());
            }
        }
        self
    }

    /// Adds relations to prefetch in separate queries, after those already
    /// registered. Repeats are skipped.
    #[must_use]
    pub fn prefetch_related(mut self, fields: Vec<&str>) -> Self {
        for field in fields {
            if !self.prefetch_related.iter().any(|f| f == field) {
                self.prefetch_related.push(field.to_string());
            }
        }
        self
    }

    /// Replaces the ordering.
    #[must_use]
    pub fn order_by(mut self, fields: Vec<OrderBy>) -> Self {
        self.ordering = fields;
        self
    }

    /// Keeps only rows whose `field` equals `value`.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Reverses the current ordering.
    #[must_use]
    pub fn reverse(mut self) -> Self {
        for order in &mut self.ordering {
            order.descending = !order.descending;
        }
        self
    }

    pub fn get_select_related(&self) -> &[String] {
        &self.select_related
    }

    pub fn get_prefetch_related(&self) -> &[String] {
        &self.prefetch_related
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.ordering
    }

    pub fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    /// Returns `true` if an ordering is set.
    pub fn is_ordered(&self) -> bool {
        !self.ordering.is_empty()
    }

    /// Applies the filters and ordering to in-memory rows.
    ///
    /// A row missing a filtered field does not match. Sorting is stable;
    /// missing values and `null` sort first.
    pub fn evaluate(&self, rows: &[Value]) -> Vec<Value> {
        let mut matched: Vec<Value> = rows
            .iter()
            .filter(|row| {
                self.filters
                    .iter()
                    .all(|(field, expected)| row.get(field) == Some(expected))
            })
            .cloned()
            .collect();

        if self.is_ordered() {
            matched.sort_by(|a, b| {
                for order in &self.ordering {
                    let ord = compare_values(a.get(&order.column), b.get(&order.column));
                    let ord = if order.descending { ord.reverse() } else { ord };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }
        matched
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (a, b) => rank(a).cmp(&rank(b)),
    }
}

// Mixed types order by kind: missing/null, bool, number, string, other.
const fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    }
}
