//! SQL builder with parameterized query construction.
//!
//! All user-supplied values go through DuckDB's parameter binding (`?` placeholders),
//! never through string interpolation. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use stockbook::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("transactions")
//!     .where_eq("symbol", "AAPL")
//!     .where_gte("date", "2024-01-01")
//!     .order_by(&["date DESC", "time DESC"])
//!     .paginate(2, 20)
//!     .build();
//! ```

use duckdb::types::{ToSql, ToSqlOutput, Value, ValueRef};

// ---------------------------------------------------------------------------
// SqlParam
// ---------------------------------------------------------------------------

/// A single bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Real(f64),
    Int(i64),
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlParam::Real(f) => ToSqlOutput::Owned(Value::Double(*f)),
            SqlParam::Int(n) => ToSqlOutput::Owned(Value::BigInt(*n)),
        })
    }
}

impl From<&str> for SqlParam {
    fn from(s: &str) -> Self {
        SqlParam::Text(s.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(s: String) -> Self {
        SqlParam::Text(s)
    }
}

impl From<&String> for SqlParam {
    fn from(s: &String) -> Self {
        SqlParam::Text(s.clone())
    }
}

impl From<f64> for SqlParam {
    fn from(f: f64) -> Self {
        SqlParam::Real(f)
    }
}

impl From<i64> for SqlParam {
    fn from(n: i64) -> Self {
        SqlParam::Int(n)
    }
}

// ---------------------------------------------------------------------------
// SqlBuilder
// ---------------------------------------------------------------------------

/// Builds parameterized SQL queries safely.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    is_distinct: bool,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<SqlParam>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
    offset_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            is_distinct: false,
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
            offset_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.is_distinct = true;
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: impl Into<SqlParam>) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.into());
        self
    }

    /// Add a case-insensitive equality condition: `LOWER({column}) = LOWER(?)`.
    pub fn where_eq_ci(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses
            .push(format!("LOWER({}) = LOWER(?)", column));
        self.params.push(value.into());
        self
    }

    /// Add a greater-than-or-equal condition: `{column} >= ?`.
    pub fn where_gte(&mut self, column: &str, value: impl Into<SqlParam>) -> &mut Self {
        self.where_clauses.push(format!("{} >= ?", column));
        self.params.push(value.into());
        self
    }

    /// Add ORDER BY clauses (e.g. `"date DESC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Set LIMIT/OFFSET for a 1-based page number. Pages below 1 are treated as 1.
    pub fn paginate(&mut self, page: usize, per_page: usize) -> &mut Self {
        let page = page.max(1);
        self.limit_val = Some(per_page);
        self.offset_val = Some((page - 1) * per_page);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<SqlParam>) {
        let distinct = if self.is_distinct { "DISTINCT " } else { "" };
        let cols = self.select_cols.join(", ");
        let mut parts = vec![
            format!("SELECT {}{}", distinct, cols),
            format!("FROM {}", self.from_table),
        ];

        if let Some(w) = self.where_sql() {
            parts.push(w);
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        if let Some(n) = self.offset_val {
            parts.push(format!("OFFSET {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }

    /// Build a `SELECT COUNT(*)` over the filtered query, ignoring ordering and pagination.
    pub fn build_count(&self) -> (String, Vec<SqlParam>) {
        let distinct = if self.is_distinct { "DISTINCT " } else { "" };
        let mut inner = vec![
            format!("SELECT {}{}", distinct, self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];
        if let Some(w) = self.where_sql() {
            inner.push(w);
        }
        (
            format!("SELECT COUNT(*) FROM ({})", inner.join("\n")),
            self.params.clone(),
        )
    }

    fn where_sql(&self) -> Option<String> {
        if self.where_clauses.is_empty() {
            None
        } else {
            Some(format!("WHERE {}", self.where_clauses.join(" AND ")))
        }
    }
}
