use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use crate::filters::EnablementFilters;
use crate::models::{
    CatalogPrice, CatalogType, CloudProvider, FetchedOffer, HOURS_PER_MONTH, Location, PriceTerm,
    ResourceKind,
};
use crate::rating::RateClassifier;
use crate::repository::CommitSet;
use crate::snapshot::CatalogSnapshot;

/// What happened to a single fetched offer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferDisposition {
    /// A new price row was installed
    Created,
    /// An existing price row's cost fields were overwritten
    Updated,
    /// An existing price row matched and nothing was written
    Unchanged,
    /// The row's type or discriminators failed an enablement pattern
    SkippedType,
    /// The row's region was disabled or could not be resolved
    SkippedRegion,
}

/// Aggregate result of one update run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub retired_prices: usize,
    pub retired_types: usize,
    pub touched: usize,
}

/// Everything an update run hands to the repository, plus its summary.
#[derive(Debug)]
pub struct MergeOutcome {
    pub commit: CommitSet,
    pub summary: MergeSummary,
}

/// Mutable state shared by an update run and any child contexts.
///
/// Holds the previously installed entities keyed by natural code, the
/// region-alias map built from location names, and the set of codes touched
/// so far. Parent and child contexts reference one instance of this state,
/// so a write through either is visible to both.
#[derive(Debug, Default)]
struct MergeState {
    locations: HashMap<String, Location>,
    region_aliases: HashMap<String, String>,
    terms: HashMap<String, PriceTerm>,
    types: HashMap<(ResourceKind, String), CatalogType>,
    prices: HashMap<String, CatalogPrice>,
    touched: HashSet<String>,
    kinds_seen: HashSet<ResourceKind>,
    changed_locations: HashSet<String>,
    changed_terms: HashSet<String>,
    changed_types: HashSet<(ResourceKind, String)>,
    changed_prices: HashSet<String>,
    created: usize,
    updated: usize,
    unchanged: usize,
    skipped: usize,
}

/// Context driving one catalog update run for one provider.
///
/// The merge body is sequential: offers are applied one at a time and the
/// intermediate touched state is only consistent under single-writer use.
/// Child contexts (e.g. a database import nested in a generic import) share
/// the parent's merge state and differ only in enablement filters.
pub struct UpdateContext {
    provider: CloudProvider,
    force: bool,
    filters: EnablementFilters,
    month_hours: f64,
    classifier: Arc<RateClassifier>,
    state: Arc<Mutex<MergeState>>,
}

impl UpdateContext {
    pub fn new(
        provider: CloudProvider,
        force: bool,
        previous: CatalogSnapshot,
        filters: EnablementFilters,
        classifier: Arc<RateClassifier>,
    ) -> Self {
        let mut state = MergeState::default();

        for location in previous.locations {
            state
                .region_aliases
                .insert(location.name.clone(), location.code.clone());
            state.locations.insert(location.code.clone(), location);
        }
        for term in previous.terms {
            state.terms.insert(term.code.clone(), term);
        }
        for ty in previous.types {
            state.types.insert((ty.kind, ty.code.clone()), ty);
        }
        for price in previous.prices {
            state.prices.insert(price.code.clone(), price);
        }

        Self {
            provider,
            force,
            filters,
            month_hours: HOURS_PER_MONTH,
            classifier,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Derive a child context sharing this context's merge state.
    ///
    /// The child sees and contributes to the same touched set and previous
    /// maps; only the enablement filters differ.
    pub fn child(&self, filters: EnablementFilters) -> Self {
        Self {
            provider: self.provider,
            force: self.force,
            filters,
            month_hours: self.month_hours,
            classifier: Arc::clone(&self.classifier),
            state: Arc::clone(&self.state),
        }
    }

    pub fn provider(&self) -> CloudProvider {
        self.provider
    }

    pub fn force(&self) -> bool {
        self.force
    }

    /// Reconcile one fetched offer row against the working catalog.
    pub fn apply(&self, offer: &FetchedOffer) -> OfferDisposition {
        let os = normalize_discriminator(offer.os.as_deref());
        let engine = normalize_discriminator(offer.engine.as_deref());
        let edition = normalize_discriminator(offer.edition.as_deref());

        let mut state = self.state.lock().expect("merge state lock poisoned");
        state.kinds_seen.insert(offer.kind);

        // A type failing a pattern is skipped entirely, keeping it and its
        // prices out of candidacy.
        if !self.filters.allows_type(offer.kind, &offer.type_code)
            || os.as_deref().is_some_and(|v| !self.filters.allows_os(v))
            || engine
                .as_deref()
                .is_some_and(|v| !self.filters.allows_engine(v))
        {
            debug!(type_code = %offer.type_code, "Offer skipped by enablement pattern");
            state.skipped += 1;
            return OfferDisposition::SkippedType;
        }

        let Some(location_code) = self.resolve_location(&mut state, offer) else {
            debug!(region = %offer.region, "Offer skipped, region disabled or unresolvable");
            state.skipped += 1;
            return OfferDisposition::SkippedRegion;
        };

        self.resolve_term(&mut state, offer);
        self.resolve_type(&mut state, offer);

        let disposition = self.upsert_price(&mut state, offer, &location_code, os, engine, edition);
        match disposition {
            OfferDisposition::Created => state.created += 1,
            OfferDisposition::Updated => state.updated += 1,
            OfferDisposition::Unchanged => state.unchanged += 1,
            _ => {}
        }
        disposition
    }

    /// Resolve or create the offer's location; `None` means skip the row.
    fn resolve_location(&self, state: &mut MergeState, offer: &FetchedOffer) -> Option<String> {
        let code = if state.locations.contains_key(&offer.region) {
            offer.region.clone()
        } else if let Some(code) = state.region_aliases.get(&offer.region) {
            code.clone()
        } else if offer.region_name.is_some() {
            offer.region.clone()
        } else {
            return None;
        };

        if !self.filters.allows_region(&code) {
            return None;
        }

        if !state.locations.contains_key(&code) {
            let name = offer
                .region_name
                .clone()
                .unwrap_or_else(|| code.clone());
            let location = Location {
                id: Uuid::now_v7(),
                provider: self.provider,
                code: code.clone(),
                name: name.clone(),
                continent: offer.continent.clone().unwrap_or_default(),
                preferred: false,
            };
            state.region_aliases.insert(name, code.clone());
            state.locations.insert(code.clone(), location);
            state.changed_locations.insert(code.clone());
        }

        if offer.preferred_region {
            self.prefer_location(state, &code);
        }

        Some(code)
    }

    /// Mark one location preferred, unsetting any previous preferred flag.
    fn prefer_location(&self, state: &mut MergeState, code: &str) {
        let already = state
            .locations
            .get(code)
            .is_some_and(|l| l.preferred);
        if already {
            return;
        }

        let mut changed: Vec<String> = Vec::new();
        for (other_code, location) in state.locations.iter_mut() {
            if location.preferred {
                location.preferred = false;
                changed.push(other_code.clone());
            }
        }
        if let Some(location) = state.locations.get_mut(code) {
            location.preferred = true;
            changed.push(code.to_string());
        }
        state.changed_locations.extend(changed);
    }

    /// Terms are immutable once referenced; only creation is recorded.
    fn resolve_term(&self, state: &mut MergeState, offer: &FetchedOffer) {
        if !state.terms.contains_key(&offer.term_code) {
            let term = PriceTerm {
                code: offer.term_code.clone(),
                name: if offer.term_name.is_empty() {
                    offer.term_code.clone()
                } else {
                    offer.term_name.clone()
                },
                ephemeral: offer.ephemeral,
            };
            state.terms.insert(offer.term_code.clone(), term);
            state.changed_terms.insert(offer.term_code.clone());
        }
    }

    fn resolve_type(&self, state: &mut MergeState, offer: &FetchedOffer) {
        let key = (offer.kind, offer.type_code.clone());
        let rating = self
            .classifier
            .classify(offer.kind.rating_table(), &offer.type_name);

        match state.types.get_mut(&key) {
            Some(existing) => {
                let mut desired = type_from_offer(self.provider, offer, rating);
                desired.id = existing.id;
                if self.force || *existing != desired {
                    *existing = desired;
                    state.changed_types.insert(key);
                }
            }
            None => {
                let ty = type_from_offer(self.provider, offer, rating);
                state.types.insert(key.clone(), ty);
                state.changed_types.insert(key);
            }
        }
    }

    fn upsert_price(
        &self,
        state: &mut MergeState,
        offer: &FetchedOffer,
        location_code: &str,
        os: Option<String>,
        engine: Option<String>,
        edition: Option<String>,
    ) -> OfferDisposition {
        let code = CatalogPrice::derive_code(
            offer.kind,
            &offer.type_code,
            &offer.term_code,
            location_code,
            os.as_deref(),
            engine.as_deref(),
            edition.as_deref(),
            offer.license_included,
        );

        // Monthly-quoted costs are converted with the month-length constant.
        let cost_per_hour = offer
            .cost_per_hour
            .or(offer.cost_per_month.map(|m| m / self.month_hours))
            .unwrap_or(0.0);

        state.touched.insert(code.clone());

        match state.prices.get_mut(&code) {
            Some(existing) => {
                let changed = existing.base_cost != offer.base_cost
                    || existing.cost_per_hour != cost_per_hour
                    || existing.cost_per_cpu_hour != offer.cost_per_cpu_hour
                    || existing.cost_per_mib_hour != offer.cost_per_mib_hour
                    || existing.co2_per_hour != offer.co2_per_hour
                    || existing.tier_rates != offer.tier_rates
                    || existing.tier_limits != offer.tier_limits;

                // Mutable attributes are only overwritten when forced or
                // actually different, keeping re-imports write-free.
                if self.force || changed {
                    existing.base_cost = offer.base_cost;
                    existing.cost_per_hour = cost_per_hour;
                    existing.cost_per_cpu_hour = offer.cost_per_cpu_hour;
                    existing.cost_per_mib_hour = offer.cost_per_mib_hour;
                    existing.co2_per_hour = offer.co2_per_hour;
                    existing.tier_rates = offer.tier_rates.clone();
                    existing.tier_limits = offer.tier_limits.clone();
                    state.changed_prices.insert(code);
                    OfferDisposition::Updated
                } else {
                    OfferDisposition::Unchanged
                }
            }
            None => {
                let price = CatalogPrice {
                    id: Uuid::now_v7(),
                    provider: self.provider,
                    kind: offer.kind,
                    code: code.clone(),
                    type_code: offer.type_code.clone(),
                    term_code: offer.term_code.clone(),
                    location_code: location_code.to_string(),
                    os,
                    engine,
                    edition,
                    license_included: offer.license_included,
                    base_cost: offer.base_cost,
                    cost_per_hour,
                    cost_per_cpu_hour: offer.cost_per_cpu_hour,
                    cost_per_mib_hour: offer.cost_per_mib_hour,
                    co2_per_hour: offer.co2_per_hour,
                    tier_rates: offer.tier_rates.clone(),
                    tier_limits: offer.tier_limits.clone(),
                };
                state.prices.insert(code.clone(), price);
                state.changed_prices.insert(code);
                OfferDisposition::Created
            }
        }
    }

    /// Retire stale entries and assemble the commit set.
    ///
    /// A previously installed price whose code was not touched during this
    /// run is stale and removed, along with types no remaining price
    /// references. Retirement only applies to resource kinds the run
    /// actually saw fetched data for. Locations are never deleted.
    pub fn finish(&self) -> MergeOutcome {
        let mut state = self.state.lock().expect("merge state lock poisoned");

        let stale: Vec<String> = state
            .prices
            .iter()
            .filter(|(code, price)| {
                state.kinds_seen.contains(&price.kind) && !state.touched.contains(*code)
            })
            .map(|(code, _)| code.clone())
            .collect();
        for code in &stale {
            state.prices.remove(code);
        }

        let referenced: HashSet<(ResourceKind, String)> = state
            .prices
            .values()
            .map(|p| (p.kind, p.type_code.clone()))
            .collect();
        let stale_types: Vec<(ResourceKind, String)> = state
            .types
            .keys()
            .filter(|key| state.kinds_seen.contains(&key.0) && !referenced.contains(*key))
            .cloned()
            .collect();
        for key in &stale_types {
            state.types.remove(key);
        }

        let commit = CommitSet {
            locations: state
                .changed_locations
                .iter()
                .filter_map(|code| state.locations.get(code).cloned())
                .collect(),
            terms: state
                .changed_terms
                .iter()
                .filter_map(|code| state.terms.get(code).cloned())
                .collect(),
            types: state
                .changed_types
                .iter()
                .filter_map(|key| state.types.get(key).cloned())
                .collect(),
            prices: state
                .changed_prices
                .iter()
                .filter_map(|code| state.prices.get(code).cloned())
                .collect(),
            retired_price_codes: stale.clone(),
            retired_type_codes: stale_types.clone(),
        };

        let summary = MergeSummary {
            created: state.created,
            updated: state.updated,
            unchanged: state.unchanged,
            skipped: state.skipped,
            retired_prices: stale.len(),
            retired_types: stale_types.len(),
            touched: state.touched.len(),
        };

        MergeOutcome { commit, summary }
    }

    /// The merged working catalog as a snapshot (post-`finish` state).
    pub fn working_snapshot(&self) -> CatalogSnapshot {
        let state = self.state.lock().expect("merge state lock poisoned");
        let mut snapshot = CatalogSnapshot::empty(self.provider);
        snapshot.locations = state.locations.values().cloned().collect();
        snapshot.terms = state.terms.values().cloned().collect();
        snapshot.types = state.types.values().cloned().collect();
        snapshot.prices = state.prices.values().cloned().collect();
        snapshot
    }
}

/// Uppercase and trim a discriminator; blank becomes `None`.
pub fn normalize_discriminator(value: Option<&str>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_uppercase())
        }
    })
}

fn type_from_offer(
    provider: CloudProvider,
    offer: &FetchedOffer,
    rating: crate::models::Rating,
) -> CatalogType {
    CatalogType {
        id: Uuid::now_v7(),
        provider,
        kind: offer.kind,
        code: offer.type_code.clone(),
        name: offer.type_name.clone(),
        cpu: offer.cpu,
        ram_mib: offer.ram_mib,
        gpu: offer.gpu,
        constant_cpu: offer.constant_cpu,
        custom_sizing: offer.custom_sizing,
        cpu_increment: offer.cpu_increment,
        ram_increment_mib: offer.ram_increment_mib,
        min_cpu: offer.min_cpu,
        min_ram_mib: offer.min_ram_mib,
        rating,
        co2_factor: offer.co2_per_hour,
    }
}
