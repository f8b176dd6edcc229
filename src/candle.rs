//! Candle: one time step's market snapshot for one asset.

/// An OHLCV price record for a single time step.
///
/// Candles are produced by an external data source and are immutable once
/// loaded. The simulator itself only reads `close` (orders fill at the
/// current step's closing price); the remaining fields are carried so that
/// strategy code driving the simulation can inspect them.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// A flat candle where every price field equals `close` and volume is
    /// zero. Convenient when only the closing price matters.
    pub fn at(close: f64) -> Self {
        Self {
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}
