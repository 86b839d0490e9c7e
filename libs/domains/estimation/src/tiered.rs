/// Progressive-band rate computation.
///
/// `rates[i]` is a percentage (base 100) applied to the slice of
/// `total_cost` between `limits[i - 1]` (0 for the first band) and
/// `limits[i]`; bands past the end of `limits` are unbounded above. The
/// result is floored at `minimum`, the non-negotiable plan minimum.
///
/// This models support-plan pricing: e.g. 10% of the first $150k of spend,
/// 7% of the next $350k, and so on, with a fixed monthly floor.
pub fn compute_rates(total_cost: f64, minimum: f64, rates: &[f64], limits: &[f64]) -> f64 {
    let mut sum = 0.0;

    // Bands are independent, so iteration order does not affect the sum
    for i in (0..rates.len()).rev() {
        let lower = if i == 0 { 0.0 } else { limits_at(limits, i - 1) };
        let upper = limits_at(limits, i);
        let slice = (total_cost.min(upper) - lower).max(0.0);
        sum += slice / 100.0 * rates[i];
    }

    sum.max(minimum)
}

/// Upper bound of band `i`; missing entries default to unbounded.
fn limits_at(limits: &[f64], i: usize) -> f64 {
    limits.get(i).copied().unwrap_or(f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rates_returns_minimum() {
        assert_eq!(compute_rates(0.0, 0.0, &[], &[]), 0.0);
        assert_eq!(compute_rates(50_000.0, 100.0, &[], &[]), 100.0);
    }

    #[test]
    fn test_single_unbounded_band() {
        assert_eq!(compute_rates(1000.0, 0.0, &[10.0], &[f64::MAX]), 100.0);
    }

    #[test]
    fn test_minimum_dominates_small_totals() {
        // 10% of the first 100 + 5% of the rest = 10 + 45 = 55, floor 200
        assert_eq!(
            compute_rates(1000.0, 200.0, &[10.0, 5.0], &[100.0, f64::MAX]),
            200.0
        );
    }

    #[test]
    fn test_four_band_support_plan() {
        // 10% of 150k + 7% of 350k + 5% of 500k + 3% of 200k
        // = 15000 + 24500 + 25000 + 6000 = 70500
        assert_eq!(
            compute_rates(
                1_200_000.0,
                15_000.0,
                &[10.0, 7.0, 5.0, 3.0],
                &[150_000.0, 500_000.0, 1_000_000.0],
            ),
            70_500.0
        );
    }

    #[test]
    fn test_limits_shorter_than_rates_default_unbounded() {
        // Second band has no upper bound
        assert_eq!(
            compute_rates(1_000.0, 0.0, &[10.0, 5.0], &[100.0]),
            10.0 + 45.0
        );
    }

    #[test]
    fn test_total_below_first_limit_uses_only_first_band() {
        assert_eq!(
            compute_rates(50.0, 0.0, &[10.0, 5.0], &[100.0, f64::MAX]),
            5.0
        );
    }

    #[test]
    fn test_negative_slices_are_clamped() {
        // Total below a band's lower bound contributes nothing for that band
        assert_eq!(
            compute_rates(100.0, 0.0, &[10.0, 7.0, 5.0], &[150.0, 500.0, f64::MAX]),
            10.0
        );
    }
}
