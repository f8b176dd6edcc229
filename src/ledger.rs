//! The balance ledger: cash plus per-asset holdings.

use rustc_hash::FxHashMap;

use crate::market::MarketData;
use crate::types::Asset;
use crate::weights::Weights;

/// An owned snapshot of the ledger: cash plus per-asset quantities in
/// configured order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Balance {
    /// Cash quantity (the base currency, always priced at 1.0).
    pub cash: f64,
    /// Per-asset quantities in configured order.
    pub assets: Vec<(Asset, f64)>,
}

impl Balance {
    /// The quantity held of one asset, or 0.0 if it has no entry.
    pub fn quantity(&self, asset: &Asset) -> f64 {
        self.assets
            .iter()
            .find(|(a, _)| a == asset)
            .map(|(_, q)| *q)
            .unwrap_or(0.0)
    }
}

/// The account ledger.
///
/// Cash lives in a dedicated field and each configured asset has a
/// quantity entry, initially zero. Quantities are mutated only by the
/// order engine through the crate-internal credit/debit methods, so a
/// successful order is the only way a balance changes and no entry can go
/// negative.
#[derive(Clone, Debug)]
pub(crate) struct Ledger {
    cash: f64,
    assets: Vec<Asset>,
    quantities: FxHashMap<Asset, f64>,
}

impl Ledger {
    /// Create a ledger with the configured cash amount and every asset at
    /// zero.
    pub(crate) fn new(initial_cash: f64, assets: &[Asset]) -> Self {
        let quantities = assets.iter().map(|asset| (*asset, 0.0)).collect();
        Self {
            cash: initial_cash,
            assets: assets.to_vec(),
            quantities,
        }
    }

    // === Queries ===

    /// Current cash quantity.
    #[inline]
    pub(crate) fn cash(&self) -> f64 {
        self.cash
    }

    /// Quantity held of one asset.
    ///
    /// # Panics
    ///
    /// Panics if `asset` is not part of the configured set.
    pub(crate) fn quantity(&self, asset: &Asset) -> f64 {
        match self.quantities.get(asset) {
            Some(quantity) => *quantity,
            None => panic!("asset {asset} is not part of this ledger"),
        }
    }

    /// Owned snapshot of the full balance in configured order.
    pub(crate) fn balance(&self) -> Balance {
        Balance {
            cash: self.cash,
            assets: self
                .assets
                .iter()
                .map(|asset| (*asset, self.quantity(asset)))
                .collect(),
        }
    }

    /// Total account value in cash terms: cash plus every holding valued
    /// at the current closing price.
    ///
    /// This is the mark-to-market value ignoring the fee cost of
    /// liquidating, so it is an upper bound on the realizable exit value.
    pub(crate) fn capital(&self, market: &MarketData) -> f64 {
        let holdings: f64 = self
            .assets
            .iter()
            .map(|asset| self.quantity(asset) * market.close(asset))
            .sum();
        self.cash + holdings
    }

    /// The current weight distribution: each entry's contribution to
    /// capital divided by capital.
    ///
    /// When capital is exactly zero the division is undefined; this
    /// implementation returns all-zero weights so a driver can still
    /// detect the dead account via `capital() == 0`.
    pub(crate) fn portfolio(&self, market: &MarketData) -> Weights {
        let capital = self.capital(market);
        if capital == 0.0 {
            return Weights::new(0.0, self.assets.iter().map(|a| (*a, 0.0)).collect());
        }
        let assets = self
            .assets
            .iter()
            .map(|asset| (*asset, self.quantity(asset) * market.close(asset) / capital))
            .collect();
        Weights::new(self.cash / capital, assets)
    }

    // === Mutation (order engine only) ===

    /// Settle a buy: deduct the fee-inclusive cost from cash, credit the
    /// bought quantity.
    pub(crate) fn settle_buy(&mut self, asset: &Asset, quantity: f64, cost: f64) {
        self.cash -= cost;
        match self.quantities.get_mut(asset) {
            Some(held) => *held += quantity,
            None => panic!("asset {asset} is not part of this ledger"),
        }
    }

    /// Settle a sell: debit the sold quantity, credit the fee-net proceeds
    /// to cash.
    pub(crate) fn settle_sell(&mut self, asset: &Asset, quantity: f64, proceeds: f64) {
        self.cash += proceeds;
        match self.quantities.get_mut(asset) {
            Some(held) => *held -= quantity,
            None => panic!("asset {asset} is not part of this ledger"),
        }
    }
}
