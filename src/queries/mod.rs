//! Query modules for the transaction store and market data.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and/or
//! [`MarketData`](crate::market::MarketData) and returns typed models.

pub mod charts;
pub mod portfolio;
pub mod quotes;
pub mod transactions;

pub use charts::ChartQuery;
pub use portfolio::PortfolioQuery;
pub use quotes::QuoteQuery;
pub use transactions::TransactionQuery;
