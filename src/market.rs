//! Market data: per-asset candle series sharing a single step cursor.

use rustc_hash::FxHashMap;

use crate::candle::Candle;
use crate::error::BuildError;
use crate::types::{Asset, Step};

/// Outcome of advancing the step cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cursor moved to the next step.
    Advanced,
    /// The cursor is at the last step and was left unchanged.
    EndOfData,
}

impl StepOutcome {
    /// Returns true if the end of the data was reached.
    #[inline]
    pub fn is_end(self) -> bool {
        self == StepOutcome::EndOfData
    }
}

/// Historical market data for a fixed set of assets.
///
/// Holds one candle series per asset, all of the same length, and the
/// shared step cursor. The series are populated once at construction and
/// are read-only afterwards; only [`MarketData::advance`] mutates state.
///
/// ```
/// use candlex::{Asset, Candle, MarketData, StepOutcome};
///
/// let btc = Asset::new("BTC");
/// let mut market = MarketData::new(vec![
///     (btc, vec![Candle::at(20_000.0), Candle::at(21_000.0)]),
/// ])
/// .unwrap();
///
/// assert_eq!(market.close(&btc), 20_000.0);
/// assert_eq!(market.advance(), StepOutcome::Advanced);
/// assert_eq!(market.close(&btc), 21_000.0);
/// assert_eq!(market.advance(), StepOutcome::EndOfData);
/// ```
#[derive(Clone, Debug)]
pub struct MarketData {
    /// Assets in configured order. This order is load-bearing: the ledger
    /// and the rebalancer iterate assets in exactly this order.
    assets: Vec<Asset>,
    series: FxHashMap<Asset, Vec<Candle>>,
    step: Step,
    len: usize,
}

impl MarketData {
    /// Build market data from per-asset candle series.
    ///
    /// The input order becomes the configured asset order. Fails if the
    /// asset list is empty, an asset appears twice, a series is empty, or
    /// the series lengths differ (step indices must be comparable across
    /// assets).
    pub fn new(series: Vec<(Asset, Vec<Candle>)>) -> Result<Self, BuildError> {
        if series.is_empty() {
            return Err(BuildError::EmptyAssetList);
        }

        let mut assets = Vec::with_capacity(series.len());
        let mut map = FxHashMap::default();
        let mut len = 0usize;

        for (asset, candles) in series {
            if map.contains_key(&asset) {
                return Err(BuildError::DuplicateAsset(asset));
            }
            if candles.is_empty() {
                return Err(BuildError::EmptySeries(asset));
            }
            if assets.is_empty() {
                len = candles.len();
            } else if candles.len() != len {
                return Err(BuildError::SeriesLengthMismatch {
                    asset,
                    expected: len,
                    actual: candles.len(),
                });
            }
            assets.push(asset);
            map.insert(asset, candles);
        }

        Ok(Self {
            assets,
            series: map,
            step: 0,
            len,
        })
    }

    // === Queries ===

    /// Assets in configured order.
    #[inline]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// The current step index.
    #[inline]
    pub fn step(&self) -> Step {
        self.step
    }

    /// Number of steps in every series.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: construction rejects empty series.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The candle at the current step for one asset. Constant time.
    ///
    /// # Panics
    ///
    /// Panics if `asset` is not part of this market. The asset set is
    /// closed at construction, so an unknown key is a caller bug.
    pub fn current_candle(&self, asset: &Asset) -> &Candle {
        &self.asset_series(asset)[self.step]
    }

    /// The closing price at the current step for one asset.
    #[inline]
    pub fn close(&self, asset: &Asset) -> f64 {
        self.current_candle(asset).close
    }

    /// Snapshot of the current candle for every asset, in configured order.
    pub fn current_candles(&self) -> Vec<(Asset, Candle)> {
        self.assets
            .iter()
            .map(|asset| (*asset, *self.current_candle(asset)))
            .collect()
    }

    // === Stepping ===

    /// Move the cursor to the next step.
    ///
    /// At the last step the cursor is left unchanged and `EndOfData` is
    /// returned; calling again keeps returning `EndOfData`.
    pub fn advance(&mut self) -> StepOutcome {
        if self.step < self.len - 1 {
            self.step += 1;
            StepOutcome::Advanced
        } else {
            StepOutcome::EndOfData
        }
    }

    fn asset_series(&self, asset: &Asset) -> &[Candle] {
        match self.series.get(asset) {
            Some(candles) => candles,
            None => panic!("asset {asset} is not part of this market"),
        }
    }
}
