//! # candlex
//!
//! A deterministic single-account exchange simulator for backtesting
//! multi-asset trading strategies against historical candle series.
//!
//! ## Features
//!
//! - **Candle-driven market**: one OHLCV series per asset, all sharing a
//!   single step cursor; orders fill at the current step's close
//! - **Fee-aware orders**: proportional fee on every trade, minimum order
//!   notional, additive rejection flags, atomic evaluate-then-commit
//! - **Portfolio rebalancing**: fee-aware fixed-point solution for the
//!   capital that survives a rebalance, sells executed before buys
//! - **Equity tracking**: per-period equity curve and return series
//!
//! ## Quick Start
//!
//! ```
//! use candlex::{Asset, Candle, Exchange, ExchangeConfig, MarketData, StepOutcome};
//!
//! let btc = Asset::new("BTC");
//! let market = MarketData::new(vec![
//!     (btc, vec![Candle::at(20_000.0), Candle::at(21_000.0)]),
//! ])
//! .unwrap();
//!
//! let config = ExchangeConfig {
//!     initial_cash: 10_000.0,
//!     fee_percent: 0.1,
//!     min_order_size: 10.0,
//! };
//! let mut exchange = Exchange::new(config, market).unwrap();
//!
//! // Buy 0.1 BTC at the step-0 close: 2_000 gross plus the 0.1% fee.
//! let result = exchange.buy(&btc, 0.1);
//! assert!(result.is_ok());
//! assert!((exchange.balance().cash - 7_998.0).abs() < 1e-6);
//!
//! // Step forward; the last step reports end-of-data without moving.
//! assert_eq!(exchange.advance_step(), StepOutcome::Advanced);
//! assert_eq!(exchange.advance_step(), StepOutcome::EndOfData);
//! ```
//!
//! ## Order Rejection
//!
//! Rejection reasons are combined additively, not first-match: code 1 is
//! insufficient funds, 2 is below the minimum order size, 3 is both.
//! A rejected order never touches the ledger.
//!
//! ```
//! use candlex::{Asset, Candle, Exchange, ExchangeConfig, MarketData};
//!
//! let btc = Asset::new("BTC");
//! let market = MarketData::new(vec![(btc, vec![Candle::at(20_000.0)])]).unwrap();
//! let config = ExchangeConfig {
//!     initial_cash: 100.0,
//!     fee_percent: 0.1,
//!     min_order_size: 50_000.0,
//! };
//! let mut exchange = Exchange::new(config, market).unwrap();
//!
//! // 20_000 gross is below the 50_000 minimum AND costs more than cash.
//! let result = exchange.buy(&btc, 1.0);
//! assert_eq!(result.code(), 3);
//! assert!(result.insufficient_funds());
//! assert!(result.below_min_order());
//! ```
//!
//! ## Rebalancing
//!
//! A target portfolio is a weight distribution over cash and assets.
//! Because the fees paid while trading shrink capital, the reachable
//! target is found as a fixed point before any order is issued:
//!
//! ```
//! use candlex::{Asset, Candle, Exchange, ExchangeConfig, MarketData, Weights};
//!
//! let btc = Asset::new("BTC");
//! let eth = Asset::new("ETH");
//! let market = MarketData::new(vec![
//!     (btc, vec![Candle::at(20_000.0)]),
//!     (eth, vec![Candle::at(1_500.0)]),
//! ])
//! .unwrap();
//! let config = ExchangeConfig {
//!     initial_cash: 10_000.0,
//!     fee_percent: 0.1,
//!     min_order_size: 10.0,
//! };
//! let mut exchange = Exchange::new(config, market).unwrap();
//!
//! // 50% BTC, 30% ETH, 20% cash.
//! let target = Weights::new(0.2, vec![(btc, 0.5), (eth, 0.3)]);
//! let report = exchange.rebalance(&target).unwrap();
//!
//! assert!(report.fully_applied());
//! let weights = exchange.portfolio();
//! assert!((weights.asset(&btc) - 0.5).abs() < 0.01);
//! ```

mod candle;
mod error;
mod exchange;
mod ledger;
mod market;
mod order;
mod rebalance;
mod types;
mod weights;

// Re-export public API
pub use candle::Candle;
pub use error::{BuildError, RebalanceError};
pub use exchange::{Exchange, ExchangeConfig, ExchangeSnapshot};
pub use ledger::Balance;
pub use market::{MarketData, StepOutcome};
pub use order::{Fill, OrderResult, Side};
pub use rebalance::{survival_coefficient, RebalanceReport};
pub use types::{Asset, Step};
pub use weights::Weights;
