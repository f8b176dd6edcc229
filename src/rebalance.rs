//! Fee-aware rebalancing: the survival-coefficient fixed point and the
//! trade plan that moves the ledger to a target weight distribution.
//!
//! Fees paid while rebalancing shrink total capital, which in turn changes
//! how much of the target is reachable, so the post-fee capital cannot be
//! computed in closed form. The solver finds the fraction of capital that
//! survives the round of trades as a fixed point, then the plan sells
//! every overweight asset before buying any underweight one so the cash
//! freed by the sells is available to fund the buys.

use log::{debug, trace};

use crate::error::RebalanceError;
use crate::ledger::Ledger;
use crate::market::MarketData;
use crate::types::Asset;
use crate::weights::Weights;

/// Convergence tolerance for the fixed-point iteration.
const TOLERANCE: f64 = 1e-10;

/// Iteration cap. The reference behavior iterates unboundedly; the cap
/// turns a non-contracting parameter combination into a reportable error
/// instead of a hang. For fee rates below 1% convergence takes single
/// digit iterations.
const MAX_ITERATIONS: u32 = 1_000;

/// Summary of one rebalance run.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalanceReport {
    /// Fraction of pre-rebalance capital that the fee model predicts
    /// survives the trades (the fixed point).
    pub survival: f64,
    /// Number of order legs issued (zero-quantity legs are never issued).
    pub legs: u32,
    /// Number of legs the order engine rejected. Failed legs do not abort
    /// the batch; the remaining legs are still attempted.
    pub failed_legs: u32,
}

impl RebalanceReport {
    /// True if every issued leg succeeded.
    #[inline]
    pub fn fully_applied(&self) -> bool {
        self.failed_legs == 0
    }
}

/// The orders needed to reach a target, sells strictly before buys.
#[derive(Clone, Debug, Default)]
pub(crate) struct TradePlan {
    pub(crate) sells: Vec<(Asset, f64)>,
    pub(crate) buys: Vec<(Asset, f64)>,
}

/// Fraction of current capital that survives the fees of moving from
/// `current` to `target` weights, found by fixed-point iteration.
///
/// Selling asset `i` down to target costs fee on the sold notional and
/// buying it back up costs fee again, so only the assets being net-sold at
/// the candidate coefficient contribute the double-fee term; the `max`
/// selects them. `fee` is a rate (0.001 = 0.1%), and `current` and
/// `target` must cover the same asset set.
///
/// Returns [`RebalanceError::NonConvergence`] if the iteration has not
/// settled within the internal cap, which for the small fee rates used in
/// practice does not happen.
pub fn survival_coefficient(
    fee: f64,
    current: &Weights,
    target: &Weights,
) -> Result<f64, RebalanceError> {
    let mut pvc0 = 1.0;
    let mut pvc1 = 1.0 - 2.0 * fee + fee * fee;
    let mut iterations = 0u32;

    // Converged means the step shrank below tolerance; anything else
    // (including a NaN step) keeps iterating until the cap trips.
    loop {
        if (pvc1 - pvc0).abs() <= TOLERANCE {
            break;
        }
        if iterations >= MAX_ITERATIONS {
            return Err(RebalanceError::NonConvergence { iterations });
        }
        pvc0 = pvc1;

        let sold: f64 = current
            .assets()
            .iter()
            .map(|(asset, weight)| (weight - pvc0 * target.asset(asset)).max(0.0))
            .sum();
        pvc1 = (1.0 - fee * current.cash - (2.0 * fee - fee * fee) * sold)
            / (1.0 - fee * target.cash);

        iterations += 1;
        trace!("survival iteration {iterations}: {pvc1}");
    }

    Ok(pvc1)
}

/// Check a caller-supplied target before any trade is attempted.
///
/// The reference behavior trades blindly on malformed targets; rejecting
/// them up front is the documented strengthening.
pub(crate) fn validate_target(
    target: &Weights,
    configured: &[Asset],
) -> Result<(), RebalanceError> {
    if !target.cash.is_finite() || target.cash < 0.0 {
        return Err(RebalanceError::InvalidTarget(format!(
            "cash weight must be a non-negative finite number, got {}",
            target.cash
        )));
    }
    for (asset, weight) in target.assets() {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(RebalanceError::InvalidTarget(format!(
                "weight for {asset} must be a non-negative finite number, got {weight}"
            )));
        }
        if !configured.contains(asset) {
            return Err(RebalanceError::InvalidTarget(format!(
                "{asset} is not a configured asset"
            )));
        }
    }
    if target.assets().len() != configured.len() {
        return Err(RebalanceError::InvalidTarget(format!(
            "target must weight every configured asset: expected {} entries, got {}",
            configured.len(),
            target.assets().len()
        )));
    }
    for (index, (asset, _)) in target.assets().iter().enumerate() {
        if target.assets()[..index].iter().any(|(a, _)| a == asset) {
            return Err(RebalanceError::InvalidTarget(format!(
                "duplicate entry for {asset}"
            )));
        }
    }
    let sum = target.sum();
    if (sum - 1.0).abs() > 1e-6 {
        return Err(RebalanceError::InvalidTarget(format!(
            "weights must sum to 1, got {sum}"
        )));
    }
    Ok(())
}

/// Compute the survival coefficient and the trade plan for a target.
///
/// With zero capital there is nothing to trade and the plan is empty.
pub(crate) fn build_plan(
    fee: f64,
    market: &MarketData,
    ledger: &Ledger,
    target: &Weights,
) -> Result<(f64, TradePlan), RebalanceError> {
    validate_target(target, market.assets())?;

    let capital = ledger.capital(market);
    if capital == 0.0 {
        return Ok((1.0, TradePlan::default()));
    }

    let current = ledger.portfolio(market);
    let survival = survival_coefficient(fee, &current, target)?;
    let target_capital = capital * survival;
    debug!(
        "rebalance plan: capital {capital:.4}, survival {survival:.8}, \
         target capital {target_capital:.4}"
    );

    let mut plan = TradePlan::default();
    for asset in market.assets() {
        let target_quantity = target_capital * target.asset(asset) / market.close(asset);
        let excess = ledger.quantity(asset) - target_quantity;
        if excess > 0.0 {
            plan.sells.push((*asset, excess));
        } else if excess < 0.0 {
            plan.buys.push((*asset, -excess));
        }
        // Exactly at target: no order.
    }

    Ok((survival, plan))
}
