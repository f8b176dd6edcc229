//! Property-based tests for ledger and rebalancing invariants.
//!
//! These tests use proptest to verify that key invariants hold
//! across randomly generated order sequences and target portfolios.

use candlex::{
    survival_coefficient, Asset, Candle, Exchange, ExchangeConfig, MarketData, Weights,
};
use proptest::prelude::*;

fn btc() -> Asset {
    Asset::new("BTC")
}
fn eth() -> Asset {
    Asset::new("ETH")
}

fn exchange(fee_percent: f64, min_order_size: f64) -> Exchange {
    let market = MarketData::new(vec![
        (btc(), vec![Candle::at(20_000.0), Candle::at(21_000.0), Candle::at(19_500.0)]),
        (eth(), vec![Candle::at(1_500.0), Candle::at(1_480.0), Candle::at(1_610.0)]),
    ])
    .unwrap();
    let config = ExchangeConfig {
        initial_cash: 10_000.0,
        fee_percent,
        min_order_size,
    };
    Exchange::new(config, market).unwrap()
}

/// One randomly generated order: (is_buy, is_btc, quantity).
fn order_strategy() -> impl Strategy<Value = (bool, bool, f64)> {
    (any::<bool>(), any::<bool>(), 0.0001f64..2.0)
}

/// A fee in percent within the configured range.
fn fee_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(0.1), Just(0.25), Just(1.0)]
}

/// A normalized target: (cash, btc, eth) weights summing to 1.
fn target_strategy() -> impl Strategy<Value = (f64, f64, f64)> {
    (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0).prop_filter_map(
        "degenerate weight vector",
        |(a, b, c)| {
            let sum = a + b + c;
            if sum < 1e-6 {
                return None;
            }
            Some((a / sum, b / sum, c / sum))
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // ========================================================================
    // BALANCE INVARIANTS
    // ========================================================================

    /// No sequence of orders drives any balance entry negative.
    #[test]
    fn balances_never_go_negative(
        fee_percent in fee_strategy(),
        orders in prop::collection::vec(order_strategy(), 1..40),
    ) {
        let mut ex = exchange(fee_percent, 10.0);

        for (step, (is_buy, is_btc, quantity)) in orders.into_iter().enumerate() {
            let asset = if is_btc { btc() } else { eth() };
            if is_buy {
                ex.buy(&asset, quantity);
            } else {
                ex.sell(&asset, quantity);
            }
            if step % 7 == 6 {
                ex.advance_step();
            }

            let balance = ex.balance();
            prop_assert!(balance.cash >= 0.0, "cash went negative: {}", balance.cash);
            for (asset, quantity) in &balance.assets {
                prop_assert!(*quantity >= 0.0, "{asset} went negative: {quantity}");
            }
        }
    }

    /// A rejected order leaves the balance untouched, bit for bit.
    #[test]
    fn rejection_is_atomic(
        fee_percent in fee_strategy(),
        quantity in 0.0001f64..100.0,
        is_buy in any::<bool>(),
    ) {
        let mut ex = exchange(fee_percent, 10.0);
        ex.buy(&btc(), 0.1);

        let before = ex.balance();
        let result = if is_buy {
            ex.buy(&btc(), quantity)
        } else {
            ex.sell(&btc(), quantity)
        };

        if !result.is_ok() {
            prop_assert_eq!(ex.balance(), before);
        }
    }

    /// Buys cost strictly more than gross and sells pay strictly less
    /// whenever the fee is positive.
    #[test]
    fn fee_is_never_a_rebate(quantity in 0.001f64..0.4) {
        let mut ex = exchange(0.1, 0.0);
        let gross = 20_000.0 * quantity;

        let cash_before = ex.balance().cash;
        if ex.buy(&btc(), quantity).is_ok() {
            let cost = cash_before - ex.balance().cash;
            prop_assert!(cost > gross);

            let cash_before = ex.balance().cash;
            if ex.sell(&btc(), quantity).is_ok() {
                let proceeds = ex.balance().cash - cash_before;
                prop_assert!(proceeds < gross);
            }
        }
    }

    // ========================================================================
    // REBALANCING INVARIANTS
    // ========================================================================

    /// The fixed point converges for practical fees and stays in (0, 1].
    #[test]
    fn survival_coefficient_converges(
        fee_percent in fee_strategy(),
        (cash, w_btc, w_eth) in target_strategy(),
        (c_cash, c_btc, c_eth) in target_strategy(),
    ) {
        let fee = fee_percent / 100.0;
        let current = Weights::new(c_cash, vec![(btc(), c_btc), (eth(), c_eth)]);
        let target = Weights::new(cash, vec![(btc(), w_btc), (eth(), w_eth)]);

        let pvc = survival_coefficient(fee, &current, &target).unwrap();
        prop_assert!(pvc > 0.0 && pvc <= 1.0 + 1e-12, "pvc out of range: {pvc}");
        if fee == 0.0 {
            prop_assert_eq!(pvc, 1.0);
        }
    }

    /// Rebalancing never creates capital; at zero fee it preserves it.
    #[test]
    fn rebalance_never_creates_capital(
        fee_percent in fee_strategy(),
        (cash, w_btc, w_eth) in target_strategy(),
    ) {
        let mut ex = exchange(fee_percent, 10.0);
        let target = Weights::new(cash, vec![(btc(), w_btc), (eth(), w_eth)]);

        let before = ex.capital();
        ex.rebalance(&target).unwrap();
        let after = ex.capital();

        prop_assert!(
            after <= before + 1e-6,
            "capital grew from {before} to {after}"
        );
        if fee_percent == 0.0 {
            prop_assert!((after - before).abs() < 1e-6);
        }
    }

    /// Rebalancing twice to the same target trades (almost) nothing the
    /// second time.
    #[test]
    fn rebalance_is_stable(
        (cash, w_btc, w_eth) in target_strategy(),
    ) {
        let mut ex = exchange(0.1, 10.0);
        let target = Weights::new(cash, vec![(btc(), w_btc), (eth(), w_eth)]);

        ex.rebalance(&target).unwrap();
        let capital_1 = ex.capital();
        ex.rebalance(&target).unwrap();
        let capital_2 = ex.capital();

        prop_assert!(capital_1 - capital_2 <= capital_1 * 1e-3 + 1e-6);
    }
}
