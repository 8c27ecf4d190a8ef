//! Outflow adjustment for grouped on-chain transactions (spec §4.4.6).
//!
//! Blockchain transactions sometimes bundle change outputs and on-chain
//! fees into the same logical transfer. Before an outflow is offered as a
//! source candidate, its amount is recomputed from the whole
//! (transaction-hash, asset) group rather than taken at face value.

use domain::{Direction, Money, Movement, TransactionId};

#[derive(Debug, Clone, PartialEq)]
pub enum OutflowAdjustment {
    /// A single outflow with no inflows in the group: nothing to adjust.
    NoAdjustment,
    /// The computed adjustment was not positive; the group's outflow
    /// candidates should be dropped entirely.
    Skip { reason: &'static str },
    Adjusted {
        adjusted_amount: Money,
        representative_tx_id: TransactionId,
        multiple_outflows: bool,
    },
}

/// Compute the adjustment for one (transaction-hash, asset) group of
/// movements. Fee movements are deduplicated by exact (amount, from, to)
/// match before summing, to avoid double-counting a network fee an adapter
/// repeated across each bundled transaction in the group.
pub fn adjust_outflow_group(movements: &[&Movement]) -> OutflowAdjustment {
    let outflows: Vec<&Movement> = movements.iter().copied().filter(|m| m.direction == Direction::Out).collect();
    let inflows: Vec<&Movement> = movements.iter().copied().filter(|m| m.direction == Direction::In).collect();

    if inflows.is_empty() && outflows.len() <= 1 {
        return OutflowAdjustment::NoAdjustment;
    }

    let deduped_outflows = dedup_fee_movements(&outflows);
    let outflow_sum = deduped_outflows
        .iter()
        .fold(Money::ZERO, |acc, m| acc + m.effective_amount());
    let inflow_sum = inflows
        .iter()
        .fold(Money::ZERO, |acc, m| acc + m.effective_amount());

    let adjusted_amount = match outflow_sum.checked_sub(inflow_sum) {
        Some(value) if value.is_greater_than(Money::ZERO) => value,
        _ => return OutflowAdjustment::Skip { reason: "non-positive" },
    };

    let representative_tx_id = deduped_outflows
        .iter()
        .map(|m| m.transaction_id)
        .min()
        .expect("deduped_outflows is non-empty: outflows.len() > 1 or inflows non-empty requires at least one outflow");

    OutflowAdjustment::Adjusted {
        adjusted_amount,
        representative_tx_id,
        multiple_outflows: deduped_outflows.len() > 1,
    }
}

/// Remove exact-duplicate outflow movements (same amount, from, to) that
/// represent the same on-chain fee repeated across bundled transactions.
fn dedup_fee_movements<'a>(outflows: &[&'a Movement]) -> Vec<&'a Movement> {
    let mut seen: Vec<(Money, Option<String>, Option<String>)> = Vec::new();
    let mut result = Vec::new();
    for m in outflows {
        let key = (m.effective_amount(), m.from_address.clone(), m.to_address.clone());
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        result.push(*m);
    }
    result
}
