use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Hours used to convert monthly costs to hourly (~30.4 days * 24 hours).
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Cloud provider enumeration
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    Hash,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cloud_provider")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CloudProvider {
    #[default]
    #[sea_orm(string_value = "aws")]
    Aws,
    #[sea_orm(string_value = "azure")]
    Azure,
    #[sea_orm(string_value = "gcp")]
    Gcp,
}

/// Resource kind enumeration
///
/// One family per priced resource: compute instances, managed databases,
/// containers, serverless functions, storage classes and support plans.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    Hash,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "resource_kind")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    #[sea_orm(string_value = "instance")]
    Instance,
    #[sea_orm(string_value = "database")]
    Database,
    #[sea_orm(string_value = "container")]
    Container,
    #[sea_orm(string_value = "function")]
    Function,
    #[sea_orm(string_value = "storage")]
    Storage,
    #[sea_orm(string_value = "support")]
    Support,
}

impl ResourceKind {
    /// Name of the rating table used to classify this kind's type names.
    pub fn rating_table(&self) -> &'static str {
        match self {
            ResourceKind::Instance => "instance",
            ResourceKind::Database => "database",
            ResourceKind::Container => "container",
            ResourceKind::Function => "function",
            ResourceKind::Storage => "storage",
            ResourceKind::Support => "support",
        }
    }
}

/// Qualitative performance/efficiency rating derived from a type name.
///
/// Ordered: `Worst < Low < Medium < Good < Best`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    Hash,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rating")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Rating {
    #[sea_orm(string_value = "WORST")]
    Worst,
    #[sea_orm(string_value = "LOW")]
    Low,
    #[default]
    #[sea_orm(string_value = "MEDIUM")]
    Medium,
    #[sea_orm(string_value = "GOOD")]
    Good,
    #[sea_orm(string_value = "BEST")]
    Best,
}

/// A provider region.
///
/// Created on first catalog import referencing it and never deleted.
/// At most one location per provider carries the `preferred` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub provider: CloudProvider,
    /// Region code (e.g. "us-east-1")
    pub code: String,
    /// Human name (e.g. "US East (N. Virginia)")
    pub name: String,
    /// Continent code (e.g. "NA", "EU")
    pub continent: String,
    pub preferred: bool,
}

/// A commercial term (on-demand, 1-year, ephemeral...).
///
/// Immutable once referenced by a price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTerm {
    pub code: String,
    pub name: String,
    /// Ephemeral capacity (spot/preemptible)
    pub ephemeral: bool,
}

/// A priced resource type descriptor.
///
/// For fixed types, `cpu`/`ram_mib` describe the delivered capacity. For
/// `custom_sizing` types the increments and minimums describe how a
/// dynamically sized price is quantized. RAM values are MiB throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogType {
    pub id: Uuid,
    pub provider: CloudProvider,
    pub kind: ResourceKind,
    /// Natural code, unique per provider and kind
    pub code: String,
    /// Type name as published by the provider (e.g. "m5.large")
    pub name: String,
    pub cpu: f64,
    pub ram_mib: f64,
    pub gpu: f64,
    /// Guaranteed (non-burstable) CPU
    pub constant_cpu: bool,
    /// Supports dynamic sizing from the literal request
    pub custom_sizing: bool,
    pub cpu_increment: f64,
    pub ram_increment_mib: f64,
    pub min_cpu: f64,
    pub min_ram_mib: f64,
    pub rating: Rating,
    /// Grams CO2e emitted per effective hour at baseline utilization
    pub co2_factor: Option<f64>,
}

/// An installed catalog price row.
///
/// The natural `code` encodes (kind, type, term, location, discriminators)
/// and is unique within a provider's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPrice {
    pub id: Uuid,
    pub provider: CloudProvider,
    pub kind: ResourceKind,
    pub code: String,
    pub type_code: String,
    pub term_code: String,
    pub location_code: String,
    /// Operating system discriminator, upper-cased (instances/containers)
    pub os: Option<String>,
    /// Database engine discriminator, upper-cased
    pub engine: Option<String>,
    /// Engine edition discriminator, upper-cased
    pub edition: Option<String>,
    /// Whether the vendor license is included (false = bring-your-own)
    pub license_included: bool,
    /// One-time/initial cost component (also the plan minimum for support)
    pub base_cost: f64,
    /// Incremental cost per paid hour
    pub cost_per_hour: f64,
    /// Per-vCPU hourly cost for custom-sized types
    pub cost_per_cpu_hour: Option<f64>,
    /// Per-MiB hourly cost for custom-sized types
    pub cost_per_mib_hour: Option<f64>,
    /// Grams CO2e per paid hour
    pub co2_per_hour: Option<f64>,
    /// Progressive band percentages (support plans; empty otherwise)
    pub tier_rates: Vec<f64>,
    /// Band upper bounds, parallel to `tier_rates` (missing = unbounded)
    pub tier_limits: Vec<f64>,
}

impl CatalogPrice {
    /// Derive the natural price code from its identity tuple.
    pub fn derive_code(
        kind: ResourceKind,
        type_code: &str,
        term_code: &str,
        location_code: &str,
        os: Option<&str>,
        engine: Option<&str>,
        edition: Option<&str>,
        license_included: bool,
    ) -> String {
        let license = if license_included { "inc" } else { "byol" };
        format!(
            "{}:{}:{}:{}:{}:{}:{}:{}",
            kind,
            type_code,
            term_code,
            location_code,
            os.unwrap_or("-"),
            engine.unwrap_or("-"),
            edition.unwrap_or("-"),
            license,
        )
    }
}

/// A single row of freshly fetched provider data, in the neutral shape all
/// offer sources emit. Costs may be quoted hourly or monthly; the merge
/// engine normalizes to hourly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedOffer {
    pub kind: ResourceKind,
    pub type_code: String,
    pub type_name: String,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub ram_mib: f64,
    #[serde(default)]
    pub gpu: f64,
    #[serde(default)]
    pub constant_cpu: bool,
    #[serde(default)]
    pub custom_sizing: bool,
    #[serde(default)]
    pub cpu_increment: f64,
    #[serde(default)]
    pub ram_increment_mib: f64,
    #[serde(default)]
    pub min_cpu: f64,
    #[serde(default)]
    pub min_ram_mib: f64,
    pub term_code: String,
    #[serde(default)]
    pub term_name: String,
    #[serde(default)]
    pub ephemeral: bool,
    /// Region token as published by the provider (code or human name)
    pub region: String,
    /// Human region name, feeds the region-alias map
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub preferred_region: bool,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub edition: Option<String>,
    #[serde(default = "default_license_included")]
    pub license_included: bool,
    #[serde(default)]
    pub base_cost: f64,
    #[serde(default)]
    pub cost_per_hour: Option<f64>,
    #[serde(default)]
    pub cost_per_month: Option<f64>,
    #[serde(default)]
    pub cost_per_cpu_hour: Option<f64>,
    #[serde(default)]
    pub cost_per_mib_hour: Option<f64>,
    #[serde(default)]
    pub co2_per_hour: Option<f64>,
    #[serde(default)]
    pub tier_rates: Vec<f64>,
    #[serde(default)]
    pub tier_limits: Vec<f64>,
}

fn default_license_included() -> bool {
    true
}

impl Default for FetchedOffer {
    /// Matches the serde defaults, in particular `license_included = true`.
    fn default() -> Self {
        Self {
            kind: ResourceKind::default(),
            type_code: String::new(),
            type_name: String::new(),
            cpu: 0.0,
            ram_mib: 0.0,
            gpu: 0.0,
            constant_cpu: false,
            custom_sizing: false,
            cpu_increment: 0.0,
            ram_increment_mib: 0.0,
            min_cpu: 0.0,
            min_ram_mib: 0.0,
            term_code: String::new(),
            term_name: String::new(),
            ephemeral: false,
            region: String::new(),
            region_name: None,
            continent: None,
            preferred_region: false,
            os: None,
            engine: None,
            edition: None,
            license_included: true,
            base_cost: 0.0,
            cost_per_hour: None,
            cost_per_month: None,
            cost_per_cpu_hour: None,
            cost_per_mib_hour: None,
            co2_per_hour: None,
            tier_rates: Vec::new(),
            tier_limits: Vec::new(),
        }
    }
}

/// Query filters for listing installed prices
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceFilter {
    pub provider: Option<CloudProvider>,
    pub kind: Option<ResourceKind>,
    pub type_code: Option<String>,
    pub term_code: Option<String>,
    pub location_code: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Post-update catalog counts, as surfaced by the update status record.
///
/// `-1` is the sentinel for "unknown" (never measured or last run failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCounts {
    pub prices: i64,
    pub types: i64,
    pub locations: i64,
    pub storage_types: i64,
}

impl CatalogCounts {
    pub const UNKNOWN: CatalogCounts = CatalogCounts {
        prices: -1,
        types: -1,
        locations: -1,
        storage_types: -1,
    };
}

impl Default for CatalogCounts {
    fn default() -> Self {
        Self::UNKNOWN
    }
}
