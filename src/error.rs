//! Error types for construction and rebalancing.

use crate::types::Asset;

/// Errors detected while building a [`crate::MarketData`] or
/// [`crate::Exchange`]. Misconfiguration fails fast at construction
/// rather than surfacing later as a stepping error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("asset list is empty")]
    EmptyAssetList,

    #[error("duplicate asset: {0}")]
    DuplicateAsset(Asset),

    #[error("empty candle series for {0}")]
    EmptySeries(Asset),

    #[error("series length mismatch for {asset}: expected {expected}, got {actual}")]
    SeriesLengthMismatch {
        asset: Asset,
        expected: usize,
        actual: usize,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Errors returned by [`crate::Exchange::rebalance`].
///
/// Individual order legs failing is not an error (the batch continues and
/// the failures are counted in the report); these variants cover inputs
/// on which no trade is attempted at all.
#[derive(Debug, thiserror::Error)]
pub enum RebalanceError {
    #[error("invalid target portfolio: {0}")]
    InvalidTarget(String),

    #[error("fixed-point iteration did not converge after {iterations} iterations")]
    NonConvergence { iterations: u32 },
}
