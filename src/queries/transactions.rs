//! Transaction queries against the `transactions` table.

use crate::config;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{
    NewTransaction, StockListing, Transaction, TransactionFilter, TransactionPage,
};
use crate::sql_builder::{SqlBuilder, SqlParam};

const TABLE: &str = "transactions";
const NEWEST_FIRST: [&str; 3] = ["date DESC", "time DESC", "id DESC"];

// ---------------------------------------------------------------------------
// TransactionQuery
// ---------------------------------------------------------------------------

/// Query interface for stored brokerage transactions.
pub struct TransactionQuery<'a> {
    conn: &'a Connection,
}

impl<'a> TransactionQuery<'a> {
    /// Create a new `TransactionQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Total number of stored transactions.
    pub fn count(&self) -> Result<usize> {
        let (sql, params) = SqlBuilder::new(TABLE).build_count();
        self.conn.execute_count(&sql, &params)
    }

    /// One page of all transactions, newest first. Pages are 1-based and a
    /// `per_page` of zero means [`config::PAGE_SIZE`].
    pub fn list(&self, page: usize, per_page: usize) -> Result<TransactionPage> {
        let qb = SqlBuilder::new(TABLE);
        self.page_of(qb, page, per_page)
    }

    /// One page of transactions for a symbol, optionally narrowed by side and start date.
    ///
    /// The side is matched case-insensitively; `since` is inclusive.
    pub fn search(
        &self,
        filter: &TransactionFilter,
        page: usize,
        per_page: usize,
    ) -> Result<TransactionPage> {
        let mut qb = SqlBuilder::new(TABLE);
        qb.where_eq("symbol", filter.symbol.as_str());
        if let Some(side) = filter.side {
            qb.where_eq_ci("side", side.as_str());
        }
        if let Some(ref since) = filter.since {
            qb.where_gte("date", since.as_str());
        }
        self.page_of(qb, page, per_page)
    }

    /// All transactions for `symbol` on or after `since`, oldest first.
    pub fn for_symbol_since(
        &self,
        symbol: &str,
        since: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        let mut qb = SqlBuilder::new(TABLE);
        qb.where_eq("symbol", symbol);
        if let Some(s) = since {
            qb.where_gte("date", s);
        }
        qb.order_by(&["date ASC", "time ASC", "id ASC"]);
        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }

    /// Every stored transaction, oldest first.
    pub fn all(&self) -> Result<Vec<Transaction>> {
        let (sql, params) = SqlBuilder::new(TABLE)
            .order_by(&["date ASC", "time ASC", "id ASC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Fetch a single transaction by id.
    pub fn get(&self, id: i64) -> Result<Option<Transaction>> {
        let (sql, params) = SqlBuilder::new(TABLE).where_eq("id", id).limit(1).build();
        let rows: Vec<Transaction> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.into_iter().next())
    }

    /// Distinct `(symbol, name)` pairs ordered by symbol.
    pub fn stocks(&self) -> Result<Vec<StockListing>> {
        let (sql, params) = SqlBuilder::new(TABLE)
            .select(&["symbol", "name"])
            .distinct()
            .order_by(&["symbol ASC", "name ASC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Display name recorded for `symbol`, if the ledger has seen it.
    pub fn stock_name(&self, symbol: &str) -> Result<Option<String>> {
        let (sql, params) = SqlBuilder::new(TABLE)
            .select(&["name"])
            .where_eq("symbol", symbol)
            .order_by(&["date DESC"])
            .limit(1)
            .build();
        let value = self.conn.execute_scalar(&sql, &params)?;
        Ok(value.and_then(|v| v.as_str().map(str::to_string)))
    }

    /// Insert a transaction; the id is assigned by the store.
    pub fn insert(&self, tx: &NewTransaction) -> Result<()> {
        let params: Vec<SqlParam> = vec![
            tx.date.as_str().into(),
            tx.time.as_str().into(),
            tx.symbol.as_str().into(),
            tx.name.as_str().into(),
            tx.order_type.as_str().into(),
            tx.side.as_str().into(),
            tx.average_price.into(),
            tx.qty.into(),
            tx.state.as_str().into(),
            tx.fees.into(),
        ];
        self.conn.execute_update(
            "INSERT INTO transactions \
             (date, time, symbol, name, order_type, side, average_price, qty, state, fees) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            &params,
        )?;
        Ok(())
    }

    /// Delete every transaction. Returns the number of rows removed.
    pub fn clear(&self) -> Result<usize> {
        self.conn.execute_update("DELETE FROM transactions", &[])
    }

    fn page_of(
        &self,
        mut qb: SqlBuilder,
        page: usize,
        per_page: usize,
    ) -> Result<TransactionPage> {
        let page = page.max(1);
        let per_page = if per_page == 0 {
            config::PAGE_SIZE
        } else {
            per_page
        };
        let (count_sql, count_params) = qb.build_count();
        let total = self.conn.execute_count(&count_sql, &count_params)?;

        qb.order_by(&NEWEST_FIRST).paginate(page, per_page);
        let (sql, params) = qb.build();
        let transactions = self.conn.execute_into(&sql, &params)?;

        Ok(TransactionPage {
            transactions,
            page,
            per_page,
            total,
            total_pages: TransactionPage::total_pages(total, per_page),
        })
    }
}
