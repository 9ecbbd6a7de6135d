//! Chi-square goodness of fit against a uniform null.

use palace_types::casino::{FrequencyTable, GoodnessOfFit};

/// Statistic beyond which the significance figure is pinned to [`P_VALUE_FLOOR`].
const STATISTIC_CUTOFF: f64 = 36.0;

/// Slope denominator of the linear significance figure.
const LINEAR_SCALE: f64 = 72.0;

const P_VALUE_FLOOR: f64 = 0.01;

/// Pearson chi-square of `table` against equal expected counts.
///
/// Returns [`GoodnessOfFit::INSUFFICIENT`] until there are at least as many trials as
/// outcomes. The p-value is a linear stand-in (`1 - statistic / 72`, or 0.01 past 36), not
/// a chi-square CDF; the displayed figure is defined by this formula.
pub fn chi_square(table: &FrequencyTable, total_trials: u64) -> GoodnessOfFit {
    let outcomes = table.outcomes();
    if outcomes == 0 || total_trials < outcomes as u64 {
        return GoodnessOfFit::INSUFFICIENT;
    }

    let expected = total_trials as f64 / outcomes as f64;
    let statistic = table
        .counts()
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum::<f64>();

    GoodnessOfFit {
        statistic,
        p_value: approximate_p_value(statistic),
    }
}

fn approximate_p_value(statistic: f64) -> f64 {
    if statistic < STATISTIC_CUTOFF {
        (1.0 - statistic / LINEAR_SCALE).clamp(0.0, 1.0)
    } else {
        P_VALUE_FLOOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palace_types::casino::WHEEL_SIZE;

    #[test]
    fn test_uniform_table_fits_perfectly() {
        let table = FrequencyTable::from_counts(vec![10; WHEEL_SIZE as usize]);
        let fit = chi_square(&table, 370);
        assert_eq!(fit.statistic, 0.0);
        assert_eq!(fit.p_value, 1.0);
    }

    #[test]
    fn test_insufficient_sample() {
        let mut table = FrequencyTable::new(WHEEL_SIZE as usize);
        table.record(3).unwrap();
        assert_eq!(chi_square(&table, 36), GoodnessOfFit::INSUFFICIENT);
        assert_eq!(
            chi_square(&FrequencyTable::new(0), 100),
            GoodnessOfFit::INSUFFICIENT
        );
    }

    #[test]
    fn test_statistic_and_linear_p_value() {
        // 37 trials all on pocket 0: expected 1 each.
        let mut counts = vec![0; WHEEL_SIZE as usize];
        counts[0] = 37;
        let fit = chi_square(&FrequencyTable::from_counts(counts), 37);
        // (37-1)^2 + 36 * 1 = 1332
        assert!((fit.statistic - 1332.0).abs() < 1e-9);
        assert_eq!(fit.p_value, 0.01);

        // Two buckets off by one in each direction: statistic 2/expected.
        let mut counts = vec![2; WHEEL_SIZE as usize];
        counts[0] = 3;
        counts[1] = 1;
        let fit = chi_square(&FrequencyTable::from_counts(counts), 74);
        assert!((fit.statistic - 1.0).abs() < 1e-9);
        assert!((fit.p_value - (1.0 - 1.0 / 72.0)).abs() < 1e-12);
    }

    #[test]
    fn test_p_value_shape() {
        assert_eq!(approximate_p_value(0.0), 1.0);
        assert!((approximate_p_value(18.0) - 0.75).abs() < 1e-12);
        assert!((approximate_p_value(35.99) - (1.0 - 35.99 / 72.0)).abs() < 1e-12);
        assert_eq!(approximate_p_value(36.0), 0.01);
        assert_eq!(approximate_p_value(500.0), 0.01);
    }
}
