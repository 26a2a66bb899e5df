//! Chart series extraction for external rendering backends.
//!
//! The calculators stay free of any plotting dependency. They only expose
//! named, ordered series; a `ChartRenderer` implementation decides whether
//! those become a terminal chart, an image, or a report.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::RetailFinanceResult;

#[cfg(feature = "lending")]
use crate::lending::amortization::AmortizationEntry;

#[cfg(feature = "insurance")]
use crate::insurance::premium::PremiumScheduleEntry;

/// A single (x, y) observation in a chart series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: Decimal,
    pub y: Decimal,
}

/// A named, ordered sequence of points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl ChartSeries {
    pub fn new(name: &str) -> Self {
        ChartSeries {
            name: name.to_string(),
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, x: impl Into<Decimal>, y: Decimal) {
        self.points.push(SeriesPoint { x: x.into(), y });
    }
}

/// Rendering backend for chart series.
pub trait ChartRenderer {
    fn render(&mut self, title: &str, series: &[ChartSeries]) -> RetailFinanceResult<()>;
}

/// Split an amortization schedule into its stacked EMI components: one series
/// for principal, one for interest, both keyed by month.
#[cfg(feature = "lending")]
pub fn amortization_series(schedule: &[AmortizationEntry]) -> Vec<ChartSeries> {
    let mut principal = ChartSeries::new("Principal");
    let mut interest = ChartSeries::new("Interest");

    for entry in schedule {
        principal.push(entry.month, entry.principal_component);
        interest.push(entry.month, entry.interest_component);
    }

    vec![principal, interest]
}

/// Premium chart series keyed by calendar year: each billing frequency
/// annualized (quarterly x4, monthly x12) so the lines overlay, plus the
/// depreciating vehicle value.
#[cfg(feature = "insurance")]
pub fn premium_series(schedule: &[PremiumScheduleEntry]) -> Vec<ChartSeries> {
    let mut yearly = ChartSeries::new("Yearly Premium");
    let mut quarterly = ChartSeries::new("Quarterly Premium (Annualized)");
    let mut monthly = ChartSeries::new("Monthly Premium (Annualized)");
    let mut value = ChartSeries::new("Vehicle Value");

    for entry in schedule {
        yearly.push(entry.year, entry.yearly_premium);
        quarterly.push(entry.year, entry.quarterly_premium * Decimal::from(4));
        monthly.push(entry.year, entry.monthly_premium * Decimal::from(12));
        value.push(entry.year, entry.vehicle_value);
    }

    vec![yearly, quarterly, monthly, value]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[cfg(feature = "lending")]
    #[test]
    fn test_amortization_series_shape() {
        use crate::lending::amortization::{generate_amortization_schedule, HousingLoanInput};

        let input = HousingLoanInput {
            principal: dec!(300000),
            annual_interest_rate: dec!(7.5),
            loan_term_years: 20,
        };
        let schedule = generate_amortization_schedule(&input).unwrap().result.schedule;
        let series = amortization_series(&schedule);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "Principal");
        assert_eq!(series[1].name, "Interest");
        assert_eq!(series[0].points.len(), 240);
        assert_eq!(series[1].points.len(), 240);
        assert_eq!(series[0].points[0].x, dec!(1));
    }

    #[cfg(feature = "lending")]
    #[test]
    fn test_amortization_series_stack_to_payment() {
        use crate::lending::amortization::{generate_amortization_schedule, HousingLoanInput};

        let input = HousingLoanInput {
            principal: dec!(300000),
            annual_interest_rate: dec!(7.5),
            loan_term_years: 20,
        };
        let output = generate_amortization_schedule(&input).unwrap().result;
        let series = amortization_series(&output.schedule);

        for (p, i) in series[0].points.iter().zip(series[1].points.iter()) {
            assert_eq!(p.y + i.y, output.monthly_payment);
        }
    }

    #[cfg(feature = "insurance")]
    #[test]
    fn test_premium_series_annualizes_frequencies() {
        use crate::insurance::premium::PremiumScheduleEntry;

        let schedule = vec![PremiumScheduleEntry {
            year: 2022,
            vehicle_value: dec!(25000),
            yearly_premium: dec!(1250),
            quarterly_premium: dec!(312.50),
            monthly_premium: dec!(104),
        }];
        let series = premium_series(&schedule);

        assert_eq!(series.len(), 4);
        assert_eq!(series[0].points[0].y, dec!(1250));
        // Quarterly 312.50 x 4 overlays the yearly line
        assert_eq!(series[1].points[0].y, dec!(1250));
        assert_eq!(series[2].points[0].y, dec!(1248));
        assert_eq!(series[3].name, "Vehicle Value");
        assert_eq!(series[3].points[0].x, dec!(2022));
    }
}
