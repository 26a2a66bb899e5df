//! Vehicle valuation under compounded annual depreciation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RetailFinanceError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::RetailFinanceResult;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// An insured vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    /// Model year.
    pub year: i32,
    /// Value when the policy was written.
    pub initial_value: Money,
}

/// Input for valuing a vehicle at a calendar year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleValueInput {
    pub vehicle: Vehicle,
    /// Date the policy came into force.
    pub policy_start: NaiveDate,
    /// Fraction of value lost per year, compounded (0.07 = 7%).
    pub depreciation_rate: Rate,
    /// Calendar year to value the vehicle at.
    pub valuation_year: i32,
}

/// Output of a vehicle valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleValueOutput {
    pub valuation_year: i32,
    /// Whole years between the policy start year and the valuation year.
    pub years_elapsed: i32,
    /// (1 - depreciation_rate)^years_elapsed.
    pub depreciation_factor: Decimal,
    pub current_value: Money,
}

// ---------------------------------------------------------------------------
// calculate_current_value
// ---------------------------------------------------------------------------

/// Value a vehicle at a calendar year under compounded depreciation.
///
/// current_value = initial_value * (1 - depreciation_rate)^(year - start_year).
/// Valuation years before the policy start still evaluate (the negative
/// exponent grosses the value up) but are flagged with a warning.
pub fn calculate_current_value(
    input: &VehicleValueInput,
) -> RetailFinanceResult<ComputationOutput<VehicleValueOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_vehicle(&input.vehicle)?;
    validate_depreciation_rate(input.depreciation_rate)?;

    let start_year = input.policy_start.year();
    let years_elapsed = input.valuation_year - start_year;
    if years_elapsed < 0 {
        warnings.push(format!(
            "Valuation year {} predates the policy start year {} — the value is grossed up, not depreciated",
            input.valuation_year, start_year
        ));
    }

    let factor = depreciation_factor(input.depreciation_rate, years_elapsed);
    let current_value = input.vehicle.initial_value * factor;

    let output = VehicleValueOutput {
        valuation_year: input.valuation_year,
        years_elapsed,
        depreciation_factor: factor,
        current_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Vehicle Valuation (Compounded Depreciation)",
        &serde_json::json!({
            "make": input.vehicle.make,
            "model": input.vehicle.model,
            "initial_value": input.vehicle.initial_value.to_string(),
            "policy_start_year": start_year,
            "depreciation_rate": input.depreciation_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internals shared with the premium models
// ---------------------------------------------------------------------------

pub(crate) fn validate_vehicle(vehicle: &Vehicle) -> RetailFinanceResult<()> {
    if vehicle.initial_value <= Decimal::ZERO {
        return Err(RetailFinanceError::InvalidInput {
            field: "initial_value".into(),
            reason: "Vehicle value must be positive".into(),
        });
    }
    Ok(())
}

pub(crate) fn validate_depreciation_rate(rate: Rate) -> RetailFinanceResult<()> {
    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        return Err(RetailFinanceError::InvalidInput {
            field: "depreciation_rate".into(),
            reason: "Depreciation rate must be in [0, 1)".into(),
        });
    }
    Ok(())
}

/// (1 - rate)^years, handling negative exponents by inversion.
/// rate < 1 is validated upstream, so the base is never zero.
pub(crate) fn depreciation_factor(rate: Rate, years_elapsed: i32) -> Decimal {
    let base = Decimal::ONE - rate;
    if years_elapsed >= 0 {
        decimal_pow(base, years_elapsed as u32)
    } else {
        Decimal::ONE / decimal_pow(base, years_elapsed.unsigned_abs())
    }
}

/// Current value after compounded depreciation over whole elapsed years.
pub(crate) fn depreciated_value(initial_value: Money, rate: Rate, years_elapsed: i32) -> Money {
    initial_value * depreciation_factor(rate, years_elapsed)
}

/// Iterative power: base^exp where exp is a non-negative integer.
/// Avoids `powd()` precision drift.
fn decimal_pow(base: Decimal, exp: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..exp {
        result *= base;
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn camry() -> Vehicle {
        Vehicle {
            make: "Toyota".into(),
            model: "Camry".into(),
            year: 2022,
            initial_value: dec!(25000),
        }
    }

    fn basic_input(valuation_year: i32) -> VehicleValueInput {
        VehicleValueInput {
            vehicle: camry(),
            policy_start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            depreciation_rate: dec!(0.07),
            valuation_year,
        }
    }

    #[test]
    fn test_value_at_start_year_is_initial_value() {
        let result = calculate_current_value(&basic_input(2022)).unwrap();
        assert_eq!(result.result.current_value, dec!(25000));
        assert_eq!(result.result.depreciation_factor, Decimal::ONE);
    }

    #[test]
    fn test_value_after_one_year() {
        // 25000 * 0.93 = 23250
        let result = calculate_current_value(&basic_input(2023)).unwrap();
        assert_eq!(result.result.years_elapsed, 1);
        assert_eq!(result.result.current_value, dec!(23250.00));
    }

    #[test]
    fn test_value_compounds_over_years() {
        // 25000 * 0.93^2 = 25000 * 0.8649 = 21622.50
        let result = calculate_current_value(&basic_input(2024)).unwrap();
        assert_eq!(result.result.current_value, dec!(21622.50));
    }

    #[test]
    fn test_valuation_before_start_warns_and_grosses_up() {
        let result = calculate_current_value(&basic_input(2021)).unwrap();
        assert_eq!(result.result.years_elapsed, -1);
        assert!(result.result.current_value > dec!(25000));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_zero_depreciation_keeps_value_constant() {
        let mut input = basic_input(2030);
        input.depreciation_rate = Decimal::ZERO;
        let result = calculate_current_value(&input).unwrap();
        assert_eq!(result.result.current_value, dec!(25000));
    }

    #[test]
    fn test_non_positive_value_rejected() {
        let mut input = basic_input(2023);
        input.vehicle.initial_value = Decimal::ZERO;
        assert!(calculate_current_value(&input).is_err());
    }

    #[test]
    fn test_depreciation_rate_of_one_rejected() {
        let mut input = basic_input(2023);
        input.depreciation_rate = Decimal::ONE;
        assert!(calculate_current_value(&input).is_err());
    }

    #[test]
    fn test_negative_depreciation_rate_rejected() {
        let mut input = basic_input(2023);
        input.depreciation_rate = dec!(-0.01);
        assert!(calculate_current_value(&input).is_err());
    }

    #[test]
    fn test_depreciation_factor_negative_years_inverts() {
        let factor = depreciation_factor(dec!(0.07), -1);
        let expected = Decimal::ONE / dec!(0.93);
        assert_eq!(factor, expected);
    }
}
