use std::path::PathBuf;
use std::time::Duration;

/// Yahoo Finance v8 chart endpoint; the symbol is appended as a path segment.
pub const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v1 search endpoint; its quote results carry the sector.
pub const SEARCH_URL: &str = "https://query1.finance.yahoo.com/v1/finance/search";

/// Sector reported when a lookup fails or the provider has none.
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// The chart endpoint rejects requests without a browser-like user agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long fetched price histories and quotes stay valid.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Maximum number of entries held by each market-data cache.
pub const CACHE_CAPACITY: usize = 256;

pub const PAGE_SIZE: usize = 20;

/// Date format used by broker CSV exports.
pub const CSV_DATE_FORMAT: &str = "%m/%d/%Y";

/// Date format used for storage and for every date string the crate returns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DATABASE_FILE: &str = "stockbook.duckdb";

/// Transaction states that never moved shares.
pub const INACTIVE_STATES: [&str; 4] = ["cancelled", "canceled", "rejected", "failed"];

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("stockbook").join(DATABASE_FILE)
    } else {
        PathBuf::from(".stockbook").join(DATABASE_FILE)
    }
}
