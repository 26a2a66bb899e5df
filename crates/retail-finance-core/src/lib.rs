pub mod chart;
pub mod error;
pub mod types;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "insurance")]
pub mod insurance;

pub use error::RetailFinanceError;
pub use types::*;

/// Standard result type for all retail-finance operations
pub type RetailFinanceResult<T> = Result<T, RetailFinanceError>;
