//! Portfolio weights: fractional allocation of capital across cash and assets.

use crate::types::Asset;

/// A weight distribution over cash and assets.
///
/// Cash is a pseudo-asset always priced at 1.0 and always occupies the
/// first position; assets follow in the configured order. The ordering is
/// explicit rather than incidental because the rebalancing formula treats
/// the cash entry specially.
///
/// For caller-supplied targets the entries must be non-negative and sum
/// to 1; [`crate::Exchange::rebalance`] validates this before trading.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weights {
    /// Fraction of capital held as cash.
    pub cash: f64,
    assets: Vec<(Asset, f64)>,
}

impl Weights {
    /// Create a weight distribution from a cash fraction and per-asset
    /// fractions in configured order.
    pub fn new(cash: f64, assets: Vec<(Asset, f64)>) -> Self {
        Self { cash, assets }
    }

    /// Per-asset weights in configured order.
    #[inline]
    pub fn assets(&self) -> &[(Asset, f64)] {
        &self.assets
    }

    /// The weight for one asset, or 0.0 if it has no entry.
    pub fn asset(&self, asset: &Asset) -> f64 {
        self.assets
            .iter()
            .find(|(a, _)| a == asset)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    /// Sum of all entries including cash.
    pub fn sum(&self) -> f64 {
        self.cash + self.assets.iter().map(|(_, w)| w).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc() -> Asset {
        Asset::new("BTC")
    }
    fn eth() -> Asset {
        Asset::new("ETH")
    }

    #[test]
    fn lookup_by_asset() {
        let weights = Weights::new(0.2, vec![(btc(), 0.5), (eth(), 0.3)]);
        assert_eq!(weights.asset(&btc()), 0.5);
        assert_eq!(weights.asset(&eth()), 0.3);
        assert_eq!(weights.asset(&Asset::new("SOL")), 0.0);
    }

    #[test]
    fn sum_includes_cash() {
        let weights = Weights::new(0.2, vec![(btc(), 0.5), (eth(), 0.3)]);
        assert!((weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn order_is_preserved() {
        let weights = Weights::new(0.0, vec![(eth(), 0.6), (btc(), 0.4)]);
        assert_eq!(weights.assets()[0].0, eth());
        assert_eq!(weights.assets()[1].0, btc());
    }
}
