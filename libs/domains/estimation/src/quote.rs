use serde::{Deserialize, Serialize};

use crate::floating_cost::FloatingCost;

/// Aggregate cost of a tree of resources.
///
/// Resources report cost changes as deltas, so editing one resource never
/// forces a recomputation of the whole tree. Mutation goes through `&mut`,
/// which gives each quote single-writer semantics; separate quotes are
/// independent.
///
/// Unbound resources are tracked by count rather than by flag: a delta
/// cannot tell "still unbound" from "became bounded", so the quote counts
/// how many of its resources currently have no quantity ceiling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quote {
    total: FloatingCost,
    unbound_resources: usize,
}

impl Quote {
    pub fn new() -> Self {
        Self::default()
    }

    /// The aggregate cost range. `unbound` reflects whether any contributing
    /// resource currently has no upper quantity bound.
    pub fn total(&self) -> FloatingCost {
        FloatingCost {
            unbound: self.unbound_resources > 0,
            ..self.total
        }
    }

    /// Add a new resource's cost to the aggregate.
    pub fn add_resource(&mut self, cost: &FloatingCost) {
        self.total = self.total.add(cost);
        if cost.unbound {
            self.unbound_resources += 1;
        }
    }

    /// Remove a resource's cost from the aggregate.
    ///
    /// `previous` must be the cost the resource last contributed.
    pub fn remove_resource(&mut self, previous: &FloatingCost) {
        self.total = self.total.sub(previous);
        if previous.unbound {
            self.unbound_resources = self.unbound_resources.saturating_sub(1);
        }
    }

    /// Propagate a resource mutation as a delta.
    ///
    /// Callers capture `previous` BEFORE mutating the resource; only the
    /// difference flows into the aggregate.
    pub fn apply_change(&mut self, previous: &FloatingCost, next: &FloatingCost) {
        self.total = self.total.add(&next.sub(previous));
        match (previous.unbound, next.unbound) {
            (false, true) => self.unbound_resources += 1,
            (true, false) => self.unbound_resources = self.unbound_resources.saturating_sub(1),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(min: f64, max: f64) -> FloatingCost {
        FloatingCost::new(min, max, 0.0, 0.0, false)
    }

    fn unbound(min: f64, max: f64) -> FloatingCost {
        FloatingCost::new(min, max, 0.0, 0.0, true)
    }

    #[test]
    fn test_delta_matches_recomputation() {
        let mut quote = Quote::new();
        quote.add_resource(&bounded(10.0, 20.0));
        quote.add_resource(&bounded(5.0, 5.0));

        // Mutate the first resource: capture previous, apply the delta
        let previous = bounded(10.0, 20.0);
        let next = bounded(12.0, 25.0);
        quote.apply_change(&previous, &next);

        let mut recomputed = Quote::new();
        recomputed.add_resource(&next);
        recomputed.add_resource(&bounded(5.0, 5.0));

        assert_eq!(quote.total(), recomputed.total());
    }

    #[test]
    fn test_unbound_survives_while_any_resource_is_unbound() {
        let mut quote = Quote::new();
        quote.add_resource(&unbound(1.0, 2.0));
        quote.add_resource(&unbound(1.0, 2.0));
        assert!(quote.total().unbound);

        // One autoscaling group gets a ceiling; the other keeps the quote
        // unbound
        quote.apply_change(&unbound(1.0, 2.0), &bounded(1.0, 2.0));
        assert!(quote.total().unbound);

        quote.apply_change(&unbound(1.0, 2.0), &bounded(1.0, 2.0));
        assert!(!quote.total().unbound);
    }

    #[test]
    fn test_remove_resource_reverses_add() {
        let mut quote = Quote::new();
        quote.add_resource(&bounded(10.0, 20.0));
        quote.add_resource(&unbound(3.0, 7.0));

        quote.remove_resource(&unbound(3.0, 7.0));
        let total = quote.total();
        assert_eq!(total.min, 10.0);
        assert_eq!(total.max, 20.0);
        assert!(!total.unbound);
    }

    #[test]
    fn test_order_independence() {
        let costs = [bounded(1.111, 2.0), bounded(3.333, 4.0), unbound(0.5, 9.0)];

        let mut forward = Quote::new();
        for c in &costs {
            forward.add_resource(c);
        }
        let mut backward = Quote::new();
        for c in costs.iter().rev() {
            backward.add_resource(c);
        }

        assert_eq!(forward.total(), backward.total());
    }
}
