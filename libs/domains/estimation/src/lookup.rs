use std::time::Instant;

use observability::CatalogMetrics;
use serde::{Deserialize, Serialize};
use tracing::debug;

use domain_catalog::filters::EnablementFilters;
use domain_catalog::models::{CatalogPrice, CatalogType, HOURS_PER_MONTH, ResourceKind};
use domain_catalog::snapshot::CatalogSnapshot;
use domain_catalog::update::normalize_discriminator;

use crate::error::EstimationResult;
use crate::floating_cost::round_half_up;
use crate::request::{LookupRequest, OptimizationTarget};
use crate::tiered;

/// Decimals shown on returned costs. Intermediate math stays unrounded.
const PRESENTATION_PRECISION: u32 = 3;

/// Per-provider commercial policy the lookup consults.
///
/// Currently the bring-your-own-license eligibility: only the listed engines
/// may be priced without the vendor license. A BYOL request for any other
/// engine silently falls back to license-included pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub byol_engines: Vec<String>,
}

impl ProviderProfile {
    pub fn allows_byol(&self, engine: Option<&str>) -> bool {
        match engine {
            Some(engine) => self
                .byol_engines
                .iter()
                .any(|e| e.eq_ignore_ascii_case(engine)),
            None => false,
        }
    }
}

impl Default for ProviderProfile {
    fn default() -> Self {
        Self {
            byol_engines: vec!["ORACLE".to_string(), "SQLSERVER".to_string()],
        }
    }
}

/// The winning catalog entry for a request, with its computed cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: CatalogPrice,
    /// Total cost over the requested usage, rounded for presentation
    pub cost: f64,
    /// Cost normalized to one month of the requested usage rate
    pub monthly_cost: f64,
    /// Grams CO2e over the requested usage, when the catalog carries a curve
    pub co2_grams: Option<f64>,
    /// Whether the price was computed from the literal request rather than
    /// selected as-is from a fixed catalog row
    pub dynamic: bool,
}

/// Finds the lowest-cost catalog entry satisfying a resource request.
///
/// One generic search drives every resource kind; each kind contributes a
/// [`CostModel`] with its candidate filter and cost formulas. The engine is
/// read-only over a committed snapshot and safe to share across threads.
pub struct PriceLookupEngine {
    filters: EnablementFilters,
    profile: ProviderProfile,
}

impl PriceLookupEngine {
    pub fn new(filters: EnablementFilters, profile: ProviderProfile) -> Self {
        Self { filters, profile }
    }

    pub fn with_defaults() -> Self {
        Self::new(EnablementFilters::allow_all(), ProviderProfile::default())
    }

    /// Look up the cheapest price for a request.
    ///
    /// `Ok(None)` is the normal "no catalog entry satisfies this request"
    /// outcome, e.g. a CPU/RAM combination no instance type covers.
    pub fn lookup(
        &self,
        request: &LookupRequest,
        snapshot: &CatalogSnapshot,
    ) -> EstimationResult<Option<PriceQuote>> {
        request.ensure_valid()?;
        let clock = Instant::now();

        let result = self.search(request, snapshot);

        let outcome = match &result {
            Some(_) => "matched",
            None => "not_found",
        };
        CatalogMetrics::record_lookup(
            &request.kind.to_string(),
            outcome,
            clock.elapsed().as_millis() as u64,
        );

        Ok(result)
    }

    fn search(&self, request: &LookupRequest, snapshot: &CatalogSnapshot) -> Option<PriceQuote> {
        let model = model_for(request.kind);

        let os = normalize_discriminator(request.os.as_deref());
        let engine = normalize_discriminator(request.engine.as_deref());
        let edition = normalize_discriminator(request.edition.as_deref());
        let byol = request.byol && self.profile.allows_byol(engine.as_deref());

        // A stated location must resolve; otherwise prefer the provider's
        // flagged region, falling back to the whole catalog.
        let location_code: Option<String> = match &request.location {
            Some(name_or_code) => match snapshot.resolve_location(name_or_code) {
                Some(location) => Some(location.code.clone()),
                None => {
                    debug!(location = %name_or_code, "Requested location not in catalog");
                    return None;
                }
            },
            None => snapshot.preferred_location().map(|l| l.code.clone()),
        };

        let usage = request.usage_or_default();
        let hours = usage.rate * usage.duration_months * HOURS_PER_MONTH;

        // Ephemeral (spot) capacity only competes when explicitly requested
        let terms: Vec<&str> = snapshot
            .terms
            .iter()
            .filter(|t| match &request.term_code {
                Some(code) => t.code.eq_ignore_ascii_case(code),
                None => !t.ephemeral,
            })
            .map(|t| t.code.as_str())
            .collect();
        if terms.is_empty() {
            return None;
        }

        let mut best: Option<Candidate> = None;

        for ty in snapshot.types_of(request.kind) {
            if !self.filters.allows_type(request.kind, &ty.code) {
                continue;
            }
            if let Some(hint) = &request.type_name {
                if !ty.code.eq_ignore_ascii_case(hint) && !ty.name.eq_ignore_ascii_case(hint) {
                    continue;
                }
            }
            if !ty.custom_sizing && !model.type_matches(ty, request) {
                continue;
            }

            for price in snapshot.prices.iter().filter(|p| {
                p.kind == request.kind
                    && p.type_code == ty.code
                    && terms.contains(&p.term_code.as_str())
                    && location_code
                        .as_deref()
                        .is_none_or(|code| p.location_code == code)
            }) {
                if !discriminators_match(price, os.as_deref(), engine.as_deref(), edition.as_deref())
                {
                    continue;
                }
                if price.license_included == byol {
                    continue;
                }

                let (cost, dynamic) = if ty.custom_sizing {
                    match model.dynamic_cost(ty, price, hours, request) {
                        Some(cost) => (cost, true),
                        None => continue,
                    }
                } else {
                    match model.static_cost(price, hours, request) {
                        Some(cost) => (cost, false),
                        None => continue,
                    }
                };

                let co2 = price.co2_per_hour.map(|g| g * hours);
                let candidate = Candidate {
                    primary: match request.target {
                        OptimizationTarget::Cost => cost,
                        OptimizationTarget::Co2 => co2.unwrap_or(f64::INFINITY),
                    },
                    cost,
                    co2,
                    dynamic,
                    price,
                };

                if best.as_ref().is_none_or(|b| candidate.beats(b)) {
                    best = Some(candidate);
                }
            }
        }

        best.map(|winner| {
            let months = if usage.duration_months > 0.0 {
                usage.duration_months
            } else {
                1.0
            };
            PriceQuote {
                price: winner.price.clone(),
                cost: round_half_up(winner.cost, PRESENTATION_PRECISION),
                monthly_cost: round_half_up(winner.cost / months, PRESENTATION_PRECISION),
                co2_grams: winner
                    .co2
                    .map(|g| round_half_up(g, PRESENTATION_PRECISION)),
                dynamic: winner.dynamic,
            }
        })
    }
}

struct Candidate<'a> {
    primary: f64,
    cost: f64,
    co2: Option<f64>,
    dynamic: bool,
    price: &'a CatalogPrice,
}

impl Candidate<'_> {
    /// Ascending primary metric, then cost, then a stable order over the
    /// type and price codes so repeated lookups always pick the same row.
    fn beats(&self, other: &Candidate<'_>) -> bool {
        if self.primary != other.primary {
            return self.primary < other.primary;
        }
        if self.cost != other.cost {
            return self.cost < other.cost;
        }
        if self.price.type_code != other.price.type_code {
            return self.price.type_code < other.price.type_code;
        }
        self.price.code < other.price.code
    }
}

fn discriminators_match(
    price: &CatalogPrice,
    os: Option<&str>,
    engine: Option<&str>,
    edition: Option<&str>,
) -> bool {
    let field_matches = |requested: Option<&str>, installed: Option<&String>| match requested {
        Some(value) => installed.is_some_and(|i| i == value),
        None => true,
    };
    field_matches(os, price.os.as_ref())
        && field_matches(engine, price.engine.as_ref())
        && field_matches(edition, price.edition.as_ref())
}

/// The capability interface each resource kind plugs into the search.
///
/// The engine owns candidate enumeration, discriminator matching, ranking
/// and tie-breaking; a model only decides whether a fixed type can serve
/// the request and how a row's total cost is computed.
trait CostModel: Sync {
    /// Whether a fixed-capacity type can serve the request. Not consulted
    /// for `custom_sizing` types, whose capacity is computed.
    fn type_matches(&self, ty: &CatalogType, request: &LookupRequest) -> bool;

    /// Total cost of a fixed catalog row over the effective hours.
    fn static_cost(&self, price: &CatalogPrice, hours: f64, request: &LookupRequest)
    -> Option<f64>;

    /// Total cost computed from the literal request, for types priced per
    /// unit. `None` when the row carries no per-unit rates.
    fn dynamic_cost(
        &self,
        ty: &CatalogType,
        price: &CatalogPrice,
        hours: f64,
        request: &LookupRequest,
    ) -> Option<f64> {
        let _ = (ty, price, hours, request);
        None
    }
}

fn model_for(kind: ResourceKind) -> &'static dyn CostModel {
    match kind {
        ResourceKind::Instance | ResourceKind::Container | ResourceKind::Database => &ComputeModel,
        ResourceKind::Function => &FunctionModel,
        ResourceKind::Storage => &StorageModel,
        ResourceKind::Support => &SupportModel,
    }
}

/// One-time component, floored at the request's minimum initial cost.
fn base_cost(price: &CatalogPrice, request: &LookupRequest) -> f64 {
    price.base_cost.max(request.min_initial_cost.unwrap_or(0.0))
}

/// Round a requested quantity up to the type's increment.
fn ceil_to_increment(value: f64, increment: f64) -> f64 {
    if increment > 0.0 {
        (value / increment).ceil() * increment
    } else {
        value
    }
}

/// Per-unit hourly rate of a parametric row for a given CPU/RAM allocation.
/// `None` when the row has no per-unit rates at all.
fn unit_hourly(price: &CatalogPrice, cpu: f64, ram_mib: f64) -> Option<f64> {
    if price.cost_per_cpu_hour.is_none() && price.cost_per_mib_hour.is_none() {
        return None;
    }
    Some(
        price.cost_per_hour
            + cpu * price.cost_per_cpu_hour.unwrap_or(0.0)
            + ram_mib * price.cost_per_mib_hour.unwrap_or(0.0),
    )
}

/// Fixed and parametric compute capacity: instances, containers, databases.
struct ComputeModel;

impl CostModel for ComputeModel {
    fn type_matches(&self, ty: &CatalogType, request: &LookupRequest) -> bool {
        ty.cpu >= request.cpu.unwrap_or(0.0)
            && ty.ram_mib >= request.ram_mib.unwrap_or(0.0)
            && ty.gpu >= request.gpu.unwrap_or(0.0)
            && (!request.constant_cpu || ty.constant_cpu)
    }

    fn static_cost(
        &self,
        price: &CatalogPrice,
        hours: f64,
        request: &LookupRequest,
    ) -> Option<f64> {
        Some(base_cost(price, request) + price.cost_per_hour * hours)
    }

    fn dynamic_cost(
        &self,
        ty: &CatalogType,
        price: &CatalogPrice,
        hours: f64,
        request: &LookupRequest,
    ) -> Option<f64> {
        let cpu = ceil_to_increment(
            request.cpu.unwrap_or(0.0).max(ty.min_cpu).max(1.0),
            ty.cpu_increment,
        );
        let ram = ceil_to_increment(
            request.ram_mib.unwrap_or(0.0).max(ty.min_ram_mib),
            ty.ram_increment_mib,
        );
        let hourly = unit_hourly(price, cpu, ram)?;
        Some(base_cost(price, request) + hourly * hours)
    }
}

/// Serverless functions: parametric compute scaled by reserved concurrency.
///
/// A fractional concurrency is probed at its floor and ceiling reservation
/// levels and the cheaper total wins. At the floor, the same workload runs
/// on fewer reservations for proportionally more hours; at the ceiling, the
/// extra reservation may round into the increments more efficiently. Levels
/// between or beyond the two are not searched; this is an approximation,
/// not a guaranteed optimum.
struct FunctionModel;

impl CostModel for FunctionModel {
    fn type_matches(&self, ty: &CatalogType, request: &LookupRequest) -> bool {
        ComputeModel.type_matches(ty, request)
    }

    fn static_cost(
        &self,
        price: &CatalogPrice,
        hours: f64,
        request: &LookupRequest,
    ) -> Option<f64> {
        ComputeModel.static_cost(price, hours, request)
    }

    fn dynamic_cost(
        &self,
        ty: &CatalogType,
        price: &CatalogPrice,
        hours: f64,
        request: &LookupRequest,
    ) -> Option<f64> {
        let concurrency = request.effective_concurrency().unwrap_or(1.0).max(0.0);
        if concurrency == 0.0 {
            return Some(base_cost(price, request));
        }

        let levels = if concurrency.fract() == 0.0 {
            [concurrency, concurrency]
        } else {
            [concurrency.floor().max(1.0), concurrency.ceil()]
        };

        let cpu_per_unit = request.cpu.unwrap_or(0.0).max(ty.min_cpu).max(1.0);
        let ram_per_unit = request.ram_mib.unwrap_or(0.0).max(ty.min_ram_mib);

        let mut cheapest: Option<f64> = None;
        for level in levels {
            let cpu = ceil_to_increment(cpu_per_unit * level, ty.cpu_increment);
            let ram = ceil_to_increment(ram_per_unit * level, ty.ram_increment_mib);
            let hourly = unit_hourly(price, cpu, ram)?;
            // Fewer reservations than requested run proportionally longer
            let level_hours = hours * (concurrency / level);
            let total = base_cost(price, request) + hourly * level_hours;
            cheapest = Some(cheapest.map_or(total, |c: f64| c.min(total)));
        }
        cheapest
    }
}

/// Storage classes: fixed rows with a minimal performance class.
struct StorageModel;

impl CostModel for StorageModel {
    fn type_matches(&self, ty: &CatalogType, request: &LookupRequest) -> bool {
        request.min_rating.is_none_or(|min| ty.rating >= min)
    }

    fn static_cost(
        &self,
        price: &CatalogPrice,
        hours: f64,
        request: &LookupRequest,
    ) -> Option<f64> {
        Some(base_cost(price, request) + price.cost_per_hour * hours)
    }
}

/// Support plans: progressive bands over the covered monthly spend, with
/// the row's base cost as the plan minimum.
struct SupportModel;

impl CostModel for SupportModel {
    fn type_matches(&self, _ty: &CatalogType, _request: &LookupRequest) -> bool {
        true
    }

    fn static_cost(
        &self,
        price: &CatalogPrice,
        _hours: f64,
        request: &LookupRequest,
    ) -> Option<f64> {
        let covered = request.covered_cost?;
        let monthly = tiered::compute_rates(
            covered,
            price.base_cost,
            &price.tier_rates,
            &price.tier_limits,
        );
        Some(monthly * request.usage_or_default().duration_months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_catalog::models::{CloudProvider, Location, PriceTerm, Rating};
    use uuid::Uuid;

    fn location(code: &str, preferred: bool) -> Location {
        Location {
            id: Uuid::now_v7(),
            provider: CloudProvider::Aws,
            code: code.to_string(),
            name: format!("Region {}", code),
            continent: "NA".to_string(),
            preferred,
        }
    }

    fn term(code: &str, ephemeral: bool) -> PriceTerm {
        PriceTerm {
            code: code.to_string(),
            name: code.to_string(),
            ephemeral,
        }
    }

    fn fixed_type(code: &str, cpu: f64, ram_mib: f64, rating: Rating) -> CatalogType {
        CatalogType {
            id: Uuid::now_v7(),
            provider: CloudProvider::Aws,
            kind: ResourceKind::Instance,
            code: code.to_string(),
            name: code.to_string(),
            cpu,
            ram_mib,
            gpu: 0.0,
            constant_cpu: true,
            custom_sizing: false,
            cpu_increment: 0.0,
            ram_increment_mib: 0.0,
            min_cpu: 0.0,
            min_ram_mib: 0.0,
            rating,
            co2_factor: None,
        }
    }

    fn price(ty: &CatalogType, term_code: &str, loc: &str, cost_per_hour: f64) -> CatalogPrice {
        CatalogPrice {
            id: Uuid::now_v7(),
            provider: CloudProvider::Aws,
            kind: ty.kind,
            code: CatalogPrice::derive_code(
                ty.kind,
                &ty.code,
                term_code,
                loc,
                Some("LINUX"),
                None,
                None,
                true,
            ),
            type_code: ty.code.clone(),
            term_code: term_code.to_string(),
            location_code: loc.to_string(),
            os: Some("LINUX".to_string()),
            engine: None,
            edition: None,
            license_included: true,
            base_cost: 0.0,
            cost_per_hour,
            cost_per_cpu_hour: None,
            cost_per_mib_hour: None,
            co2_per_hour: None,
            tier_rates: vec![],
            tier_limits: vec![],
        }
    }

    /// Catalog with fixed types a1.large (LOW) and m5.large, on-demand and
    /// 1-year terms, in two regions.
    fn instance_snapshot() -> CatalogSnapshot {
        let a1 = fixed_type("a1.large", 2.0, 4096.0, Rating::Low);
        let m5 = fixed_type("m5.large", 2.0, 8192.0, Rating::Medium);

        CatalogSnapshot {
            provider: CloudProvider::Aws,
            locations: vec![location("us-east-1", true), location("eu-west-1", false)],
            terms: vec![term("od", false), term("1y", false), term("spot", true)],
            prices: vec![
                price(&a1, "od", "us-east-1", 0.05),
                price(&a1, "1y", "us-east-1", 0.034),
                price(&a1, "od", "eu-west-1", 0.056),
                price(&m5, "od", "us-east-1", 0.096),
                price(&m5, "1y", "us-east-1", 0.061),
                price(&m5, "spot", "us-east-1", 0.009),
            ],
            types: vec![a1, m5],
        }
    }

    fn request(cpu: f64, ram_mib: f64) -> LookupRequest {
        let mut request = LookupRequest::new(CloudProvider::Aws, ResourceKind::Instance);
        request.cpu = Some(cpu);
        request.ram_mib = Some(ram_mib);
        request.os = Some("linux".to_string());
        request.location = Some("us-east-1".to_string());
        request
    }

    #[test]
    fn test_static_lookup_picks_lowest_total_cost() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        let quote = engine
            .lookup(&request(1.0, 2000.0), &snapshot)
            .unwrap()
            .unwrap();

        // a1.large satisfies 1 CPU / 2000 MiB; its 1-year term is cheapest
        assert_eq!(quote.price.type_code, "a1.large");
        assert_eq!(quote.price.term_code, "1y");
        assert_eq!(quote.cost, round_half_up(0.034 * 730.0, 3));
        assert!(!quote.dynamic);
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        let first = engine
            .lookup(&request(1.0, 2000.0), &snapshot)
            .unwrap()
            .unwrap();
        let second = engine
            .lookup(&request(1.0, 2000.0), &snapshot)
            .unwrap()
            .unwrap();

        assert_eq!(first.price.code, second.price.code);
        assert_eq!(first.cost, second.cost);
    }

    #[test]
    fn test_capacity_filter_excludes_small_types() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        // 6000 MiB rules out a1.large (4096)
        let quote = engine
            .lookup(&request(1.0, 6000.0), &snapshot)
            .unwrap()
            .unwrap();
        assert_eq!(quote.price.type_code, "m5.large");

        // Nothing offers 64 CPUs
        let none = engine.lookup(&request(64.0, 2000.0), &snapshot).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_ephemeral_terms_require_explicit_request() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        // Spot is by far the cheapest m5.large row but is not considered
        let quote = engine
            .lookup(&request(1.0, 6000.0), &snapshot)
            .unwrap()
            .unwrap();
        assert_eq!(quote.price.term_code, "1y");

        let mut spot_request = request(1.0, 6000.0);
        spot_request.term_code = Some("spot".to_string());
        let spot = engine.lookup(&spot_request, &snapshot).unwrap().unwrap();
        assert_eq!(spot.price.term_code, "spot");
        assert_eq!(spot.cost, round_half_up(0.009 * 730.0, 3));
    }

    #[test]
    fn test_unknown_location_is_not_found() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        let mut r = request(1.0, 2000.0);
        r.location = Some("mars-north-1".to_string());
        assert!(engine.lookup(&r, &snapshot).unwrap().is_none());
    }

    #[test]
    fn test_missing_location_defaults_to_preferred_region() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        let mut r = request(1.0, 2000.0);
        r.location = None;
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();
        assert_eq!(quote.price.location_code, "us-east-1");
    }

    #[test]
    fn test_location_resolves_by_human_name() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        let mut r = request(1.0, 2000.0);
        r.location = Some("Region eu-west-1".to_string());
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();
        assert_eq!(quote.price.location_code, "eu-west-1");
    }

    #[test]
    fn test_usage_rate_scales_effective_hours() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        let mut r = request(1.0, 2000.0);
        r.usage = Some(crate::request::UsageProfile::new(0.5, 2.0));
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();

        assert_eq!(quote.cost, round_half_up(0.034 * 730.0, 3));
        assert_eq!(quote.monthly_cost, round_half_up(0.034 * 730.0 / 2.0, 3));
    }

    #[test]
    fn test_enablement_pattern_restricts_candidates() {
        let filters =
            EnablementFilters::from_patterns(None, None, Some("m5\\..*"), None, None).unwrap();
        let engine = PriceLookupEngine::new(filters, ProviderProfile::default());
        let snapshot = instance_snapshot();

        let quote = engine
            .lookup(&request(1.0, 2000.0), &snapshot)
            .unwrap()
            .unwrap();
        assert_eq!(quote.price.type_code, "m5.large");
    }

    #[test]
    fn test_type_name_hint_restricts_to_one_type() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        let mut r = request(1.0, 2000.0);
        r.type_name = Some("M5.Large".to_string());
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();
        assert_eq!(quote.price.type_code, "m5.large");
    }

    fn dynamic_snapshot() -> CatalogSnapshot {
        let custom = CatalogType {
            id: Uuid::now_v7(),
            provider: CloudProvider::Aws,
            kind: ResourceKind::Instance,
            code: "custom".to_string(),
            name: "custom".to_string(),
            cpu: 0.0,
            ram_mib: 0.0,
            gpu: 0.0,
            constant_cpu: true,
            custom_sizing: true,
            cpu_increment: 2.0,
            ram_increment_mib: 1024.0,
            min_cpu: 1.0,
            min_ram_mib: 1024.0,
            rating: Rating::Medium,
            co2_factor: None,
        };
        let mut row = price(&custom, "od", "us-east-1", 0.0);
        row.os = None;
        row.cost_per_cpu_hour = Some(0.02);
        row.cost_per_mib_hour = Some(0.00001);

        CatalogSnapshot {
            provider: CloudProvider::Aws,
            locations: vec![location("us-east-1", true)],
            terms: vec![term("od", false)],
            types: vec![custom],
            prices: vec![row],
        }
    }

    #[test]
    fn test_dynamic_price_rounds_up_to_increments() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = dynamic_snapshot();

        let mut r = LookupRequest::new(CloudProvider::Aws, ResourceKind::Instance);
        r.cpu = Some(3.0);
        r.ram_mib = Some(3000.0);
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();

        // 3 CPUs round to 4, 3000 MiB rounds to 3072
        let expected = (4.0 * 0.02 + 3072.0 * 0.00001) * 730.0;
        assert!(quote.dynamic);
        assert_eq!(quote.cost, round_half_up(expected, 3));
    }

    #[test]
    fn test_dynamic_price_is_monotone_in_cpu_and_ram() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = dynamic_snapshot();

        let mut previous = 0.0;
        for (cpu, ram) in [
            (0.5, 512.0),
            (1.0, 1024.0),
            (2.0, 2048.0),
            (2.5, 2049.0),
            (7.0, 9000.0),
            (16.0, 65536.0),
        ] {
            let mut r = LookupRequest::new(CloudProvider::Aws, ResourceKind::Instance);
            r.cpu = Some(cpu);
            r.ram_mib = Some(ram);
            let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();
            assert!(
                quote.cost >= previous,
                "cost decreased at cpu={} ram={}",
                cpu,
                ram
            );
            previous = quote.cost;
        }
    }

    #[test]
    fn test_cheapest_of_static_and_dynamic_wins() {
        let engine = PriceLookupEngine::with_defaults();

        let mut snapshot = instance_snapshot();
        let dynamic = dynamic_snapshot();
        snapshot.types.extend(dynamic.types);
        snapshot.prices.extend(dynamic.prices);

        // Small request: the dynamic path (1 CPU min, 2048 MiB) beats
        // a1.large's 1-year row
        let mut r = request(1.0, 2000.0);
        r.os = None;
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();
        let dynamic_cost = (2.0 * 0.02 + 2048.0 * 0.00001) * 730.0;
        assert!(dynamic_cost > 0.034 * 730.0);
        assert_eq!(quote.price.type_code, "a1.large");
        assert!(!quote.dynamic);
    }

    fn function_snapshot() -> CatalogSnapshot {
        let mut snapshot = dynamic_snapshot();
        for ty in &mut snapshot.types {
            ty.kind = ResourceKind::Function;
        }
        for p in &mut snapshot.prices {
            p.kind = ResourceKind::Function;
        }
        snapshot
    }

    #[test]
    fn test_function_concurrency_probes_floor_and_ceiling() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = function_snapshot();

        let mut r = LookupRequest::new(CloudProvider::Aws, ResourceKind::Function);
        r.cpu = Some(1.0);
        r.ram_mib = Some(1024.0);
        r.concurrency = Some(2.5);
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();

        // floor 2: cpu ceil(2/2)*2=2, ram 2048, hours x 2.5/2
        let floor = (2.0 * 0.02 + 2048.0 * 0.00001) * 730.0 * (2.5 / 2.0);
        // ceil 3: cpu ceil(3/2)*2=4, ram 3072, hours x 2.5/3
        let ceil = (4.0 * 0.02 + 3072.0 * 0.00001) * 730.0 * (2.5 / 3.0);
        assert_eq!(quote.cost, round_half_up(floor.min(ceil), 3));
    }

    #[test]
    fn test_integer_concurrency_evaluates_one_level() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = function_snapshot();

        let mut r = LookupRequest::new(CloudProvider::Aws, ResourceKind::Function);
        r.cpu = Some(1.0);
        r.ram_mib = Some(1024.0);
        r.concurrency = Some(3.0);
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();

        let expected = (4.0 * 0.02 + 3072.0 * 0.00001) * 730.0;
        assert_eq!(quote.cost, round_half_up(expected, 3));
    }

    fn database_snapshot() -> CatalogSnapshot {
        let db = CatalogType {
            kind: ResourceKind::Database,
            ..fixed_type("db.r5.large", 2.0, 16384.0, Rating::Good)
        };
        let mut included = price(&db, "od", "us-east-1", 0.24);
        included.kind = ResourceKind::Database;
        included.os = None;
        included.engine = Some("ORACLE".to_string());
        included.code = CatalogPrice::derive_code(
            ResourceKind::Database,
            "db.r5.large",
            "od",
            "us-east-1",
            None,
            Some("ORACLE"),
            None,
            true,
        );
        let mut byol = included.clone();
        byol.id = Uuid::now_v7();
        byol.license_included = false;
        byol.cost_per_hour = 0.18;
        byol.code = CatalogPrice::derive_code(
            ResourceKind::Database,
            "db.r5.large",
            "od",
            "us-east-1",
            None,
            Some("ORACLE"),
            None,
            false,
        );
        let mut postgres = included.clone();
        postgres.id = Uuid::now_v7();
        postgres.engine = Some("POSTGRES".to_string());
        postgres.cost_per_hour = 0.2;
        postgres.code = CatalogPrice::derive_code(
            ResourceKind::Database,
            "db.r5.large",
            "od",
            "us-east-1",
            None,
            Some("POSTGRES"),
            None,
            true,
        );

        CatalogSnapshot {
            provider: CloudProvider::Aws,
            locations: vec![location("us-east-1", true)],
            terms: vec![term("od", false)],
            types: vec![db],
            prices: vec![included, byol, postgres],
        }
    }

    #[test]
    fn test_byol_honored_for_eligible_engine() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = database_snapshot();

        let mut r = LookupRequest::new(CloudProvider::Aws, ResourceKind::Database);
        r.engine = Some("oracle".to_string());
        r.byol = true;
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();

        assert!(!quote.price.license_included);
        assert_eq!(quote.cost, round_half_up(0.18 * 730.0, 3));
    }

    #[test]
    fn test_byol_falls_back_for_ineligible_engine() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = database_snapshot();

        // Postgres is not BYOL-eligible; the request falls back to the
        // license-included row instead of finding nothing
        let mut r = LookupRequest::new(CloudProvider::Aws, ResourceKind::Database);
        r.engine = Some("postgres".to_string());
        r.byol = true;
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();

        assert!(quote.price.license_included);
        assert_eq!(quote.price.engine.as_deref(), Some("POSTGRES"));
    }

    #[test]
    fn test_support_plan_uses_progressive_bands() {
        let support_type = CatalogType {
            kind: ResourceKind::Support,
            ..fixed_type("business", 0.0, 0.0, Rating::Good)
        };
        let mut row = price(&support_type, "od", "us-east-1", 0.0);
        row.kind = ResourceKind::Support;
        row.os = None;
        row.base_cost = 100.0;
        row.tier_rates = vec![10.0, 7.0, 5.0];
        row.tier_limits = vec![10_000.0, 80_000.0];

        let snapshot = CatalogSnapshot {
            provider: CloudProvider::Aws,
            locations: vec![location("us-east-1", true)],
            terms: vec![term("od", false)],
            types: vec![support_type],
            prices: vec![row],
        };

        let engine = PriceLookupEngine::with_defaults();
        let mut r = LookupRequest::new(CloudProvider::Aws, ResourceKind::Support);
        r.covered_cost = Some(100_000.0);
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();

        // 10% of 10k + 7% of 70k + 5% of 20k = 1000 + 4900 + 1000
        assert_eq!(quote.cost, 6900.0);

        // Without a covered spend there is nothing to price
        let empty = LookupRequest::new(CloudProvider::Aws, ResourceKind::Support);
        assert!(engine.lookup(&empty, &snapshot).unwrap().is_none());
    }

    #[test]
    fn test_co2_target_prefers_lower_emissions() {
        let mut snapshot = instance_snapshot();
        for p in &mut snapshot.prices {
            p.co2_per_hour = Some(match p.type_code.as_str() {
                // The cheaper type emits more
                "a1.large" => 30.0,
                _ => 12.0,
            });
        }

        let engine = PriceLookupEngine::with_defaults();
        let mut r = request(1.0, 2000.0);
        r.target = OptimizationTarget::Co2;
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();

        assert_eq!(quote.price.type_code, "m5.large");
        assert_eq!(quote.co2_grams, Some(round_half_up(12.0 * 730.0, 3)));
    }

    #[test]
    fn test_min_initial_cost_floors_the_base_component() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        let mut r = request(1.0, 2000.0);
        r.min_initial_cost = Some(500.0);
        let quote = engine.lookup(&r, &snapshot).unwrap().unwrap();

        assert_eq!(quote.cost, round_half_up(500.0 + 0.034 * 730.0, 3));
    }

    #[test]
    fn test_invalid_request_is_rejected_not_searched() {
        let engine = PriceLookupEngine::with_defaults();
        let snapshot = instance_snapshot();

        let mut r = request(1.0, 2000.0);
        r.cpu = Some(-2.0);
        assert!(engine.lookup(&r, &snapshot).is_err());
    }
}
