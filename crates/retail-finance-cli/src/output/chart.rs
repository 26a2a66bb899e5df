use colored::{Color, Colorize};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use retail_finance_core::chart::{ChartRenderer, ChartSeries};
use retail_finance_core::{RetailFinanceError, RetailFinanceResult};

const SERIES_COLORS: [Color; 4] = [Color::Blue, Color::Yellow, Color::Green, Color::Magenta];

/// Renders chart series as horizontal bars on stdout.
///
/// Bars across all series share one scale so their magnitudes compare.
pub struct AsciiChart {
    width: usize,
}

impl AsciiChart {
    pub fn new(width: usize) -> Self {
        AsciiChart {
            width: width.max(10),
        }
    }
}

impl ChartRenderer for AsciiChart {
    fn render(&mut self, title: &str, series: &[ChartSeries]) -> RetailFinanceResult<()> {
        let max = series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p.y.abs())
            .max()
            .ok_or_else(|| RetailFinanceError::InsufficientData("No points to chart".into()))?;
        let max = if max.is_zero() { Decimal::ONE } else { max };

        println!("{}", title.bold());
        for (i, s) in series.iter().enumerate() {
            let color = SERIES_COLORS[i % SERIES_COLORS.len()];
            println!("\n{}", s.name.as_str().color(color));
            for point in &s.points {
                let bar = "█".repeat(bar_length(point.y.abs(), max, self.width));
                println!(
                    "{:>8} | {} {}",
                    point.x,
                    bar.as_str().color(color),
                    point.y.round_dp(2)
                );
            }
        }
        Ok(())
    }
}

fn bar_length(value: Decimal, max: Decimal, width: usize) -> usize {
    let ratio = (value / max).to_f64().unwrap_or(0.0);
    (ratio * width as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bar_length_scales_to_width() {
        assert_eq!(bar_length(dec!(100), dec!(100), 40), 40);
        assert_eq!(bar_length(dec!(50), dec!(100), 40), 20);
        assert_eq!(bar_length(dec!(0), dec!(100), 40), 0);
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let mut chart = AsciiChart::new(40);
        assert!(chart.render("empty", &[]).is_err());
    }
}
