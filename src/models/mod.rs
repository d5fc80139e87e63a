pub mod chart;
pub mod esg;
pub mod portfolio;
pub mod price;
pub mod split;
pub mod transaction;

pub use chart::*;
pub use esg::*;
pub use portfolio::*;
pub use price::*;
pub use split::*;
pub use transaction::*;
