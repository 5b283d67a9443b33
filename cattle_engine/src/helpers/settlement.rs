//! The settlement formula shared by live-weight and dead-weight (slaughterhouse) deals.
//!
//! ```text
//! units = total_mass / 15
//! gross = units * yield_rate * unit_price
//! final = gross - transport_fee - funrural_tax
//! ```
//! `units`, `gross` and `final` are reported to two decimal places. `gross` is calculated from the unrounded unit
//! count.
use cattle_common::{kg_to_arrobas, round2};
use serde::Serialize;

use crate::db_types::{SettlementAmounts, WeightEntry, YieldRate};

/// Applies the settlement formula to a total mass (kg).
pub fn settle(
    total_mass: f64,
    yield_rate: YieldRate,
    unit_price: f64,
    transport_fee: f64,
    funrural_tax: f64,
) -> SettlementAmounts {
    let units = kg_to_arrobas(total_mass);
    let gross = units * yield_rate.value() * unit_price;
    let final_amount = gross - transport_fee - funrural_tax;
    SettlementAmounts {
        total_weight: total_mass,
        at_quantity: round2(units),
        yield_rate: yield_rate.value(),
        gross_amount: round2(gross),
        final_amount: round2(final_amount),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeightSummary {
    pub total_batches: usize,
    pub total_quantity: i64,
    pub total_weight: f64,
}

/// Totals a set of weighing records. The total weight is rounded to two decimal places.
pub fn weight_summary(entries: &[WeightEntry]) -> WeightSummary {
    let total_quantity = entries.iter().map(|e| e.quantity).sum();
    let total_weight = entries.iter().map(|e| e.total_weight).sum::<f64>();
    WeightSummary { total_batches: entries.len(), total_quantity, total_weight: round2(total_weight) }
}
