//! WHERE-clause building for list queries.
//!
//! [`Conditions`] collects `AND`-joined predicates together with their bound
//! parameters. Parameters are owned [`SqlValue`]s so a built query can be
//! moved onto the blocking pool.

use rusqlite::types::Value as SqlValue;

/// Escape character used in `LIKE` patterns.
pub const LIKE_ESCAPE: char = '\\';

/// Builds a `LIKE` pattern matching `value` anywhere, with `%`, `_` and the
/// escape character itself matched literally.
///
/// ```
/// use taxi_db::lookups::contains_pattern;
///
/// assert_eq!(contains_pattern("Model S"), "%Model S%");
/// assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
/// ```
pub fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// An ordered list of `AND`-joined predicates and their parameters.
#[derive(Debug, Default, Clone)]
pub struct Conditions {
    clauses: Vec<String>,
    params: Vec<SqlValue>,
}

impl Conditions {
    /// Creates an empty set of conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value`.
    pub fn exact(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.clauses.push(format!("{column} = ?"));
        self.params.push(value.into());
        self
    }

    /// `column <> value`, used to exclude the row being edited from
    /// uniqueness checks.
    pub fn not_equal(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.clauses.push(format!("{column} <> ?"));
        self.params.push(value.into());
        self
    }

    /// Case-insensitive substring match on one column.
    pub fn icontains(&mut self, column: &str, value: &str) -> &mut Self {
        self.icontains_any(&[column], value)
    }

    /// Case-insensitive substring match on any of `columns`.
    ///
    /// Does nothing when `columns` is empty.
    pub fn icontains_any(&mut self, columns: &[&str], value: &str) -> &mut Self {
        if columns.is_empty() {
            return self;
        }
        let pattern = contains_pattern(value);
        let alternatives: Vec<String> = columns
            .iter()
            .map(|column| format!("LOWER({column}) LIKE LOWER(?) ESCAPE '{LIKE_ESCAPE}'"))
            .collect();
        for _ in columns {
            self.params.push(SqlValue::Text(pattern.clone()));
        }
        if alternatives.len() == 1 {
            self.clauses.extend(alternatives);
        } else {
            self.clauses.push(format!("({})", alternatives.join(" OR ")));
        }
        self
    }

    /// A hand-written predicate with its own `?` parameters.
    pub fn raw(
        &mut self,
        clause: impl Into<String>,
        params: impl IntoIterator<Item = SqlValue>,
    ) -> &mut Self {
        self.clauses.push(clause.into());
        self.params.extend(params);
        self
    }

    /// Returns `true` when no predicate was added.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders ` WHERE a AND b`, or an empty string.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Returns the bound parameters in clause order.
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Consumes the conditions, returning the parameters.
    pub fn into_params(self) -> Vec<SqlValue> {
        self.params
    }
}

/// Trims a search term and drops it when nothing is left.
pub fn non_empty(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}
