//! Exchange: the high-level API for driving a simulation.
//!
//! This is the main entry point for users of the crate. It owns the
//! market data, the ledger, and the fee configuration, and provides the
//! order engine (buy/sell), the step cursor, and fee-aware rebalancing.

#[cfg(feature = "fill-log")]
use crate::order::Fill;
use crate::{
    error::{BuildError, RebalanceError},
    ledger::{Balance, Ledger},
    order::{OrderResult, Side},
    rebalance::{self, RebalanceReport},
    Asset, Candle, MarketData, Step, StepOutcome, Weights,
};
use log::debug;

/// Construction parameters for an [`Exchange`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExchangeConfig {
    /// Starting cash quantity.
    pub initial_cash: f64,
    /// Fee in percent charged on the gross notional of every trade
    /// (0.1 means 0.1%). Added to the cost of buys, deducted from the
    /// proceeds of sells.
    pub fee_percent: f64,
    /// Minimum gross notional, in cash terms, for an order to be
    /// accepted. The boundary is inclusive: an order at exactly this
    /// notional passes.
    pub min_order_size: f64,
}

impl ExchangeConfig {
    /// The fee as a rate (`fee_percent / 100`).
    #[inline]
    pub fn fee_rate(&self) -> f64 {
        self.fee_percent / 100.0
    }

    fn validate(&self) -> Result<(), BuildError> {
        if !self.initial_cash.is_finite() || self.initial_cash < 0.0 {
            return Err(BuildError::InvalidConfig(format!(
                "initial_cash must be a non-negative finite number, got {}",
                self.initial_cash
            )));
        }
        if !self.fee_percent.is_finite() || self.fee_percent < 0.0 || self.fee_percent >= 100.0 {
            return Err(BuildError::InvalidConfig(format!(
                "fee_percent must be in [0, 100), got {}",
                self.fee_percent
            )));
        }
        if !self.min_order_size.is_finite() || self.min_order_size < 0.0 {
            return Err(BuildError::InvalidConfig(format!(
                "min_order_size must be a non-negative finite number, got {}",
                self.min_order_size
            )));
        }
        Ok(())
    }
}

/// A point-in-time snapshot of the account state.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExchangeSnapshot {
    /// Step the snapshot was taken at.
    pub step: Step,
    /// Cash quantity.
    pub cash: f64,
    /// Per-asset holdings in configured order.
    pub holdings: Vec<(Asset, f64)>,
    /// Mark-to-market capital at the snapshot step.
    pub capital: f64,
}

#[cfg(feature = "persistence")]
impl ExchangeSnapshot {
    /// Save the snapshot to a JSON file.
    pub fn save_json(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load a snapshot from a JSON file.
    pub fn load_json(path: &std::path::Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// A simulated single-account exchange.
///
/// Orders fill immediately and in full at the current step's closing
/// price; there is no order book, no slippage, and no short selling. Each
/// buy/sell call is a single-shot evaluate-then-commit transaction: the
/// ledger mutates only when every validation passes.
///
/// ```
/// use candlex::{Asset, Candle, Exchange, ExchangeConfig, MarketData};
///
/// let btc = Asset::new("BTC");
/// let market = MarketData::new(vec![
///     (btc, vec![Candle::at(20_000.0), Candle::at(21_000.0)]),
/// ])
/// .unwrap();
/// let config = ExchangeConfig {
///     initial_cash: 10_000.0,
///     fee_percent: 0.1,
///     min_order_size: 10.0,
/// };
/// let mut exchange = Exchange::new(config, market).unwrap();
///
/// assert!(exchange.buy(&btc, 0.1).is_ok());
/// // 0.1 BTC at 20_000 costs 2_000 plus the 0.1% fee.
/// assert!((exchange.balance().cash - 7_998.0).abs() < 1e-6);
/// ```
#[derive(Clone, Debug)]
pub struct Exchange {
    config: ExchangeConfig,
    /// Fee rate, converted from percent once at construction.
    fee: f64,
    market: MarketData,
    ledger: Ledger,
    /// Executed fills (only with the "fill-log" feature).
    #[cfg(feature = "fill-log")]
    fills: Vec<Fill>,
    /// Equity at each `record_equity` call, starting with initial cash.
    equity_curve: Vec<f64>,
    /// Periodic simple returns derived from the equity curve.
    returns: Vec<f64>,
    prev_equity: f64,
}

impl Exchange {
    /// Create an exchange over the given market data.
    ///
    /// The ledger starts with `config.initial_cash` cash and zero of
    /// every asset. Fails fast on invalid configuration.
    pub fn new(config: ExchangeConfig, market: MarketData) -> Result<Self, BuildError> {
        config.validate()?;
        let initial_cash = config.initial_cash;
        let ledger = Ledger::new(initial_cash, market.assets());
        let fee = config.fee_rate();
        Ok(Self {
            config,
            fee,
            market,
            ledger,
            #[cfg(feature = "fill-log")]
            fills: Vec::new(),
            equity_curve: vec![initial_cash],
            returns: Vec::new(),
            prev_equity: initial_cash,
        })
    }

    // === Market data ===

    /// The market data driving this simulation.
    #[inline]
    pub fn market(&self) -> &MarketData {
        &self.market
    }

    /// The current step index.
    #[inline]
    pub fn step(&self) -> Step {
        self.market.step()
    }

    /// Current candle for every asset, in configured order.
    pub fn current_candles(&self) -> Vec<(Asset, Candle)> {
        self.market.current_candles()
    }

    /// Move to the next time step.
    ///
    /// At the last step the cursor stays put and `EndOfData` is returned,
    /// idempotently.
    pub fn advance_step(&mut self) -> StepOutcome {
        self.market.advance()
    }

    // === Account state ===

    /// The construction parameters.
    #[inline]
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Owned snapshot of cash and holdings.
    pub fn balance(&self) -> Balance {
        self.ledger.balance()
    }

    /// Total account value in cash terms at current closing prices,
    /// ignoring liquidation fees.
    pub fn capital(&self) -> f64 {
        self.ledger.capital(&self.market)
    }

    /// The current weight distribution. All-zero when capital is zero.
    pub fn portfolio(&self) -> Weights {
        self.ledger.portfolio(&self.market)
    }

    /// A point-in-time snapshot of the account.
    pub fn snapshot(&self) -> ExchangeSnapshot {
        let balance = self.ledger.balance();
        ExchangeSnapshot {
            step: self.market.step(),
            cash: balance.cash,
            holdings: balance.assets,
            capital: self.capital(),
        }
    }

    /// Executed fills, oldest first.
    #[cfg(feature = "fill-log")]
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    // === Orders ===

    /// Buy `quantity` units of `asset` at the current closing price.
    ///
    /// The cost charged to cash is `close * quantity * (1 + fee)`. Every
    /// validation is checked and combined additively into the result:
    /// insufficient cash sets [`OrderResult::INSUFFICIENT_FUNDS`], a gross
    /// notional strictly below the minimum order size sets
    /// [`OrderResult::BELOW_MIN_ORDER`]. The ledger mutates only when the
    /// result is ok.
    ///
    /// `quantity` must be positive (debug assertion) and `asset` must be
    /// part of the configured set (panics otherwise).
    pub fn buy(&mut self, asset: &Asset, quantity: f64) -> OrderResult {
        debug_assert!(quantity > 0.0, "buy quantity must be positive, got {quantity}");
        let price = self.market.close(asset);
        let gross = price * quantity;
        let cost = gross * (1.0 + self.fee);

        let mut result = OrderResult::OK;
        if cost > self.ledger.cash() {
            result.flag(OrderResult::INSUFFICIENT_FUNDS);
        }
        if gross < self.config.min_order_size {
            result.flag(OrderResult::BELOW_MIN_ORDER);
        }

        if result.is_ok() {
            self.ledger.settle_buy(asset, quantity, cost);
            self.record_fill(asset, Side::Buy, quantity, price, cost - gross);
            debug!("step {}: bought {quantity} {asset} at {price}", self.step());
        } else {
            debug!(
                "step {}: buy {quantity} {asset} rejected: {result}",
                self.step()
            );
        }
        result
    }

    /// Sell `quantity` units of `asset` at the current closing price.
    ///
    /// The proceeds credited to cash are `close * quantity * (1 - fee)`.
    /// Selling more than is held sets [`OrderResult::INSUFFICIENT_FUNDS`];
    /// the minimum-order check is the same as for buys. The ledger mutates
    /// only when the result is ok.
    ///
    /// `quantity` must be positive (debug assertion) and `asset` must be
    /// part of the configured set (panics otherwise).
    pub fn sell(&mut self, asset: &Asset, quantity: f64) -> OrderResult {
        debug_assert!(quantity > 0.0, "sell quantity must be positive, got {quantity}");
        let price = self.market.close(asset);
        let gross = price * quantity;
        let proceeds = gross * (1.0 - self.fee);

        let mut result = OrderResult::OK;
        if quantity > self.ledger.quantity(asset) {
            result.flag(OrderResult::INSUFFICIENT_FUNDS);
        }
        if gross < self.config.min_order_size {
            result.flag(OrderResult::BELOW_MIN_ORDER);
        }

        if result.is_ok() {
            self.ledger.settle_sell(asset, quantity, proceeds);
            self.record_fill(asset, Side::Sell, quantity, price, gross - proceeds);
            debug!("step {}: sold {quantity} {asset} at {price}", self.step());
        } else {
            debug!(
                "step {}: sell {quantity} {asset} rejected: {result}",
                self.step()
            );
        }
        result
    }

    // === Rebalancing ===

    /// Trade to a target weight distribution.
    ///
    /// Computes the fraction of capital that survives the rebalancing fees
    /// (fixed point, see [`crate::survival_coefficient`]), derives per-asset
    /// target quantities from the surviving capital, and issues every sell
    /// before any buy so the freed cash can fund the purchases. Assets
    /// already at target are skipped. A rejected leg does not abort the
    /// batch; it is counted in the report.
    ///
    /// The target must be non-negative, weight every configured asset
    /// (plus cash), and sum to 1; malformed targets are rejected before
    /// any trade. With zero capital the report is empty.
    pub fn rebalance(&mut self, target: &Weights) -> Result<RebalanceReport, RebalanceError> {
        let (survival, plan) =
            rebalance::build_plan(self.fee, &self.market, &self.ledger, target)?;

        let mut legs = 0u32;
        let mut failed_legs = 0u32;
        for (asset, quantity) in &plan.sells {
            legs += 1;
            if !self.sell(asset, *quantity).is_ok() {
                failed_legs += 1;
            }
        }
        for (asset, quantity) in &plan.buys {
            legs += 1;
            if !self.buy(asset, *quantity).is_ok() {
                failed_legs += 1;
            }
        }

        debug!(
            "step {}: rebalance issued {legs} legs, {failed_legs} failed",
            self.step()
        );
        Ok(RebalanceReport {
            survival,
            legs,
            failed_legs,
        })
    }

    // === Equity tracking ===

    /// Record the current equity (capital) as one period's observation.
    ///
    /// Call once per step, after trading. Appends to the equity curve and,
    /// when the previous equity was positive, pushes the period's simple
    /// return.
    pub fn record_equity(&mut self) {
        let equity = self.capital();
        if self.prev_equity > 0.0 {
            self.returns.push((equity - self.prev_equity) / self.prev_equity);
        }
        self.equity_curve.push(equity);
        self.prev_equity = equity;
    }

    /// Equity at each recorded period, starting with the initial cash.
    pub fn equity_curve(&self) -> &[f64] {
        &self.equity_curve
    }

    /// Periodic simple returns, one per `record_equity` call with positive
    /// preceding equity.
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    // === Internal ===

    #[cfg(feature = "fill-log")]
    fn record_fill(&mut self, asset: &Asset, side: Side, quantity: f64, price: f64, fee: f64) {
        self.fills.push(Fill {
            step: self.market.step(),
            asset: *asset,
            side,
            quantity,
            price,
            fee,
        });
    }

    #[cfg(not(feature = "fill-log"))]
    fn record_fill(&mut self, _asset: &Asset, _side: Side, _quantity: f64, _price: f64, _fee: f64) {
    }
}
