//! Weight and money conventions used by the Brazilian cattle trade.
//!
//! Live cattle are priced per *arroba*, a unit of 15kg. Monetary amounts are quoted in Reais with two decimal places.

/// Kilograms per arroba
pub const ARROBA_KG: f64 = 15.0;

/// Converts a mass in kilograms to arrobas. The result is not rounded.
pub fn kg_to_arrobas(kg: f64) -> f64 {
    kg / ARROBA_KG
}

/// Rounds a value to two decimal places (centavos, or hundredths of an arroba).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
