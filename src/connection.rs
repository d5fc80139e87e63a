//! DuckDB connection wrapper with schema setup and query execution.
//!
//! Rows are returned as `serde_json::Value` maps so query wrappers can
//! deserialize them into typed models with `execute_into`.

use crate::error::Result;
use crate::sql_builder::SqlParam;
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA: &str = "
    CREATE SEQUENCE IF NOT EXISTS transactions_id_seq START 1;
    CREATE TABLE IF NOT EXISTS transactions (
        id BIGINT PRIMARY KEY DEFAULT nextval('transactions_id_seq'),
        date VARCHAR NOT NULL,
        time VARCHAR NOT NULL DEFAULT '',
        symbol VARCHAR NOT NULL,
        name VARCHAR NOT NULL DEFAULT '',
        order_type VARCHAR NOT NULL DEFAULT '',
        side VARCHAR NOT NULL DEFAULT '',
        average_price DOUBLE NOT NULL DEFAULT 0,
        qty DOUBLE NOT NULL DEFAULT 0,
        state VARCHAR NOT NULL DEFAULT '',
        fees DOUBLE NOT NULL DEFAULT 0
    );
";

/// Wraps a DuckDB connection holding the `transactions` table.
pub struct Connection {
    conn: DuckDbConnection,
    path: Option<PathBuf>,
}

impl Connection {
    /// Open (or create) a file-backed database and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = DuckDbConnection::open(path)?;
        let this = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        this.init_schema()?;
        log::debug!("Opened transaction store at {}", path.display());
        Ok(this)
    }

    /// Open an in-memory database. Contents are lost when the connection drops.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        let this = Self { conn, path: None };
        this.init_schema()?;
        Ok(this)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Database file path, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    pub fn execute(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run
        let column_names: Vec<String> = match rows.as_ref() {
            Some(s) => s.column_names().into_iter().map(|s| s.to_string()).collect(),
            None => return Ok(Vec::new()),
        };

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Execute a scalar `COUNT(*)`-style query and return it as `usize`.
    pub fn execute_count(&self, sql: &str, params: &[SqlParam]) -> Result<usize> {
        let value = self.execute_scalar(sql, params)?;
        Ok(value
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(0))
    }

    /// Execute a data-modifying statement and return the number of affected rows.
    pub fn execute_update(&self, sql: &str, params: &[SqlParam]) -> Result<usize> {
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();
        Ok(self.conn.execute(sql, param_values.as_slice())?)
    }

    /// Run `f` inside a database transaction, committing on `Ok` and rolling back on `Err`.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    log::error!("Rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; fall back to a string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        // Dates are stored as VARCHAR; other column types are not used by the schema
        _ => serde_json::Value::Null,
    }
}
