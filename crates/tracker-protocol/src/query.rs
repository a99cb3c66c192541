//! Select queries in the PostgREST dialect.
//!
//! A [`SelectQuery`] is encoded as URL query pairs for the REST backend and
//! evaluated directly against JSON rows by the in-memory backend, so both
//! backends share one definition of filtering and ordering.
//!
//! Encoding:
//! - `select=*`
//! - one `col=eq.value` pair per filter
//! - `order=col.asc.nullslast,col2.asc`
//! - `limit=n`

use std::cmp::Ordering;

use serde_json::Value;

use crate::rows::Row;
use crate::wire_types::{columns, Table};

/// Equality filter on one column. The only filter the tracker needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    column: String,
    value: String,
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<String>) -> Self {
        Filter {
            column: column.to_string(),
            value: value.into(),
        }
    }

    /// `id = value`
    pub fn id(value: impl Into<String>) -> Self {
        Filter::eq(columns::ID, value)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `("col", "eq.value")`
    pub fn to_query_pair(&self) -> (String, String) {
        (self.column.clone(), format!("eq.{}", self.value))
    }

    /// Whether `row` satisfies the filter. Values compare by their text
    /// form, the way they appear in a query string; null never matches.
    pub fn matches(&self, row: &Row) -> bool {
        match row.get(&self.column) {
            Some(Value::String(s)) => s == &self.value,
            Some(Value::Number(n)) => n.to_string() == self.value,
            Some(Value::Bool(b)) => b.to_string() == self.value,
            _ => false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    column: String,
    direction: SortDirection,
    nulls_last: bool,
}

impl OrderBy {
    pub fn asc(column: &str) -> Self {
        OrderBy {
            column: column.to_string(),
            direction: SortDirection::Asc,
            nulls_last: false,
        }
    }

    pub fn desc(column: &str) -> Self {
        OrderBy {
            column: column.to_string(),
            direction: SortDirection::Desc,
            nulls_last: false,
        }
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls_last = true;
        self
    }

    /// `col.asc` / `col.desc.nullslast`
    pub fn to_param(&self) -> String {
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        if self.nulls_last {
            format!("{}.{}.nullslast", self.column, dir)
        } else {
            format!("{}.{}", self.column, dir)
        }
    }

    /// Compare two rows on this column. Nulls (and missing columns) sort
    /// first unless `nulls_last` is set, independent of direction.
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let a = a.get(&self.column).filter(|v| !v.is_null());
        let b = b.get(&self.column).filter(|v| !v.is_null());
        let nulls = if self.nulls_last {
            Ordering::Greater
        } else {
            Ordering::Less
        };
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => nulls,
            (Some(_), None) => nulls.reverse(),
            (Some(a), Some(b)) => {
                let ord = compare_values(a, b);
                match self.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(0.0);
            let b = b.as_f64().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    filters: Vec<Filter>,
    order: Vec<OrderBy>,
    limit: Option<usize>,
}

impl SelectQuery {
    pub fn new() -> Self {
        SelectQuery::default()
    }

    /// The order every sibling list is read in: position ascending with
    /// nulls last, then creation time where the table has one.
    pub fn read_order(table: Table) -> Self {
        let query = SelectQuery::new().order_by(OrderBy::asc(columns::SORT_ORDER).nulls_last());
        if table.has_created_at() {
            query.order_by(OrderBy::asc(columns::CREATED_AT))
        } else {
            query
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order
    }

    pub fn max_rows(&self) -> Option<usize> {
        self.limit
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        pairs.extend(self.filters.iter().map(Filter::to_query_pair));
        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(OrderBy::to_param).collect();
            pairs.push(("order".to_string(), order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Evaluate the query over `rows`: filter, stable sort, then limit.
    pub fn apply(&self, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let mut out: Vec<Row> = rows
            .into_iter()
            .filter(|row| self.filters.iter().all(|f| f.matches(row)))
            .collect();
        out.sort_by(|a, b| {
            self.order
                .iter()
                .map(|o| o.compare(a, b))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}
