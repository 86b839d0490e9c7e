use serde::{Deserialize, Serialize};

/// Decimal places kept when aggregating costs.
pub const COST_PRECISION: u32 = 3;

/// An immutable cost range.
///
/// `min`/`max` bound the recurring cost of a resource whose quantity may
/// vary (e.g. an autoscaling group); `initial`/`max_initial` bound the
/// one-time cost the same way. `unbound` marks a resource with no upper
/// quantity limit: its contribution to `max` has no finite ceiling, and the
/// flag propagates through addition.
///
/// Addition is associative and commutative up to rounding, so a resource
/// tree can be summed in any order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FloatingCost {
    pub min: f64,
    pub max: f64,
    pub initial: f64,
    pub max_initial: f64,
    pub unbound: bool,
}

impl FloatingCost {
    pub fn new(min: f64, max: f64, initial: f64, max_initial: f64, unbound: bool) -> Self {
        debug_assert!(min <= max, "floating cost with min > max");
        Self {
            min,
            max,
            initial,
            max_initial,
            unbound,
        }
    }

    /// A fixed, bounded cost: `min == max == cost`, no initial component.
    pub fn from_single(cost: f64) -> Self {
        Self {
            min: cost,
            max: cost,
            initial: 0.0,
            max_initial: 0.0,
            unbound: false,
        }
    }

    /// Component-wise sum, rounded to [`COST_PRECISION`] to keep repeated
    /// aggregation free of float drift. Unbound if either operand is.
    pub fn add(&self, other: &FloatingCost) -> FloatingCost {
        FloatingCost {
            min: round_half_up(self.min + other.min, COST_PRECISION),
            max: round_half_up(self.max + other.max, COST_PRECISION),
            initial: round_half_up(self.initial + other.initial, COST_PRECISION),
            max_initial: round_half_up(self.max_initial + other.max_initial, COST_PRECISION),
            unbound: self.unbound || other.unbound,
        }
    }

    /// Component-wise difference, rounded like [`FloatingCost::add`].
    ///
    /// Used to propagate a `new - old` delta into a parent aggregate. The
    /// unbound flag is NOT meaningful on a delta; quote aggregation tracks
    /// unbound resources by count instead.
    pub fn sub(&self, other: &FloatingCost) -> FloatingCost {
        FloatingCost {
            min: round_half_up(self.min - other.min, COST_PRECISION),
            max: round_half_up(self.max - other.max, COST_PRECISION),
            initial: round_half_up(self.initial - other.initial, COST_PRECISION),
            max_initial: round_half_up(self.max_initial - other.max_initial, COST_PRECISION),
            unbound: self.unbound || other.unbound,
        }
    }

    /// Round every component half-up to `precision` decimals.
    pub fn round(&self, precision: u32) -> FloatingCost {
        FloatingCost {
            min: round_half_up(self.min, precision),
            max: round_half_up(self.max, precision),
            initial: round_half_up(self.initial, precision),
            max_initial: round_half_up(self.max_initial, precision),
            unbound: self.unbound,
        }
    }
}

/// Half-up rounding to a fixed number of decimals.
pub fn round_half_up(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost(min: f64, max: f64) -> FloatingCost {
        FloatingCost::new(min, max, 0.0, 0.0, false)
    }

    #[test]
    fn test_from_single_is_bounded_point() {
        let c = FloatingCost::from_single(12.5);
        assert_eq!(c.min, 12.5);
        assert_eq!(c.max, 12.5);
        assert!(!c.unbound);
    }

    #[test]
    fn test_add_is_component_wise_and_rounded() {
        let a = FloatingCost::new(1.0005, 2.0005, 0.5, 1.5, false);
        let b = FloatingCost::new(2.0, 3.0, 0.25, 0.75, false);

        let sum = a.add(&b);
        assert_eq!(sum.min, round_half_up(1.0005 + 2.0, COST_PRECISION));
        assert_eq!(sum.max, round_half_up(2.0005 + 3.0, COST_PRECISION));
        assert_eq!(sum.initial, 0.75);
        assert_eq!(sum.max_initial, 2.25);
        assert!(!sum.unbound);
    }

    #[test]
    fn test_unbound_propagates_through_add() {
        let bounded = cost(1.0, 2.0);
        let unbound = FloatingCost::new(1.0, 2.0, 0.0, 0.0, true);

        assert!(bounded.add(&unbound).unbound);
        assert!(unbound.add(&bounded).unbound);
        assert!(!bounded.add(&bounded).unbound);
    }

    #[test]
    fn test_add_commutes_and_associates() {
        let a = cost(1.111, 2.222);
        let b = cost(3.333, 4.444);
        let c = cost(5.555, 6.666);

        assert_eq!(a.add(&b), b.add(&a));
        assert_eq!(a.add(&b).add(&c), a.add(&c.add(&b)));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(1.2346, 3), 1.235);
        assert_eq!(round_half_up(1.2344, 3), 1.234);
        // Exactly representable halves round away from zero
        assert_eq!(round_half_up(2.5, 0), 3.0);
        assert_eq!(round_half_up(1.25, 1), 1.3);
    }

    #[test]
    fn test_round_applies_to_every_component() {
        let c = FloatingCost::new(1.2344, 5.6789, 0.016, 0.034, true);
        let rounded = c.round(2);
        assert_eq!(rounded.min, 1.23);
        assert_eq!(rounded.max, 5.68);
        assert_eq!(rounded.initial, 0.02);
        assert_eq!(rounded.max_initial, 0.03);
        assert!(rounded.unbound);
    }

    #[test]
    fn test_sub_yields_delta() {
        let old = cost(10.0, 20.0);
        let new = cost(12.5, 18.0);

        let delta = new.sub(&old);
        assert_eq!(delta.min, 2.5);
        assert_eq!(delta.max, -2.0);
    }
}
