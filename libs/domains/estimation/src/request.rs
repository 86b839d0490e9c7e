use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

use domain_catalog::models::{CloudProvider, Rating, ResourceKind};

use crate::error::{EstimationError, EstimationResult};

/// What the lookup should minimize.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OptimizationTarget {
    #[default]
    Cost,
    Co2,
}

/// How much of a month, for how many months, a resource is actually used.
///
/// The product of rate, month count and the month-length constant gives the
/// effective number of paid hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct UsageProfile {
    /// Fraction of a month the resource runs, in (0, 1]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub rate: f64,
    /// Number of months the estimate covers
    #[validate(range(min = 0.0))]
    pub duration_months: f64,
}

impl UsageProfile {
    pub fn new(rate: f64, duration_months: f64) -> Self {
        Self {
            rate,
            duration_months,
        }
    }

    /// Resolve a named profile. Names mirror the usage presets offered to
    /// callers; unknown names resolve to `None`.
    pub fn named(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "always" | "always-on" => Some(Self::new(1.0, 1.0)),
            // 8 hours x 5 days out of a 168-hour week
            "business-hours" => Some(Self::new(40.0 / 168.0, 1.0)),
            // 12 hours a day, every day
            "daytime" => Some(Self::new(0.5, 1.0)),
            _ => None,
        }
    }
}

impl Default for UsageProfile {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// A resource requirement to price.
///
/// Everything except the provider context is optional; unset fields simply
/// do not constrain the candidate set. RAM values are MiB.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LookupRequest {
    pub provider: CloudProvider,
    pub kind: ResourceKind,

    #[validate(range(min = 0.0))]
    pub cpu: Option<f64>,
    #[validate(range(min = 0.0))]
    pub ram_mib: Option<f64>,
    #[validate(range(min = 0.0))]
    pub gpu: Option<f64>,

    /// Operating system requirement (instances/containers)
    pub os: Option<String>,
    /// Require guaranteed (non-burstable) CPU
    pub constant_cpu: bool,
    /// Bring-your-own-license requested; honored only where the provider's
    /// BYOL policy permits it for the requested engine
    pub byol: bool,
    /// Database engine requirement
    pub engine: Option<String>,
    /// Engine edition requirement
    pub edition: Option<String>,

    /// Restrict candidates to one commercial term
    pub term_code: Option<String>,
    /// Restrict candidates to one type (code or published name)
    pub type_name: Option<String>,
    /// Region preference, by code or human name
    pub location: Option<String>,

    #[validate(nested)]
    pub usage: Option<UsageProfile>,
    /// Floor applied to the one-time cost component
    #[validate(range(min = 0.0))]
    pub min_initial_cost: Option<f64>,
    pub target: OptimizationTarget,

    /// Reserved concurrency (functions); may be fractional
    #[validate(range(min = 0.0))]
    pub concurrency: Option<f64>,
    /// Invocations per month (functions)
    #[validate(range(min = 0.0))]
    pub request_volume: Option<f64>,
    /// Seconds per invocation (functions)
    #[validate(range(min = 0.0))]
    pub invocation_seconds: Option<f64>,

    /// Monthly spend a support plan covers
    #[validate(range(min = 0.0))]
    pub covered_cost: Option<f64>,
    /// Minimal performance class (storage)
    pub min_rating: Option<Rating>,
}

impl LookupRequest {
    pub fn new(provider: CloudProvider, kind: ResourceKind) -> Self {
        Self {
            provider,
            kind,
            ..Default::default()
        }
    }

    /// Validate the request, reporting the first offending field with a
    /// machine-readable reason code.
    pub fn ensure_valid(&self) -> EstimationResult<()> {
        if let Err(errors) = self.validate() {
            let by_field = errors.field_errors();
            if let Some((field, field_errors)) = by_field.iter().next() {
                let code = field_errors
                    .first()
                    .map(|e| e.code.to_string())
                    .unwrap_or_else(|| "invalid".to_string());
                return Err(EstimationError::rejected(field, &code));
            }
            return Err(EstimationError::rejected("request", "invalid"));
        }

        // An edition only makes sense relative to an engine
        if self.edition.is_some() && self.engine.is_none() {
            return Err(EstimationError::rejected("edition", "engine_required"));
        }

        Ok(())
    }

    /// Usage rate and month count, defaulting to one always-on month.
    pub fn usage_or_default(&self) -> UsageProfile {
        self.usage.unwrap_or_default()
    }

    /// Requested concurrency, derived from the request volume when not given
    /// explicitly: volume x seconds-per-invocation spread over the month.
    pub fn effective_concurrency(&self) -> Option<f64> {
        if self.concurrency.is_some() {
            return self.concurrency;
        }
        match (self.request_volume, self.invocation_seconds) {
            (Some(volume), Some(seconds)) => {
                let month_seconds = domain_catalog::HOURS_PER_MONTH * 3600.0;
                Some(volume * seconds / month_seconds)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let request = LookupRequest::new(CloudProvider::Aws, ResourceKind::Instance);
        assert!(request.ensure_valid().is_ok());
    }

    #[test]
    fn test_negative_cpu_is_rejected_with_field_and_code() {
        let mut request = LookupRequest::new(CloudProvider::Aws, ResourceKind::Instance);
        request.cpu = Some(-1.0);

        match request.ensure_valid() {
            Err(EstimationError::Rejected { field, code }) => {
                assert_eq!(field, "cpu");
                assert_eq!(code, "range");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_usage_rate_must_be_in_unit_interval() {
        let mut request = LookupRequest::new(CloudProvider::Aws, ResourceKind::Instance);
        request.usage = Some(UsageProfile::new(0.0, 1.0));
        assert!(request.ensure_valid().is_err());

        request.usage = Some(UsageProfile::new(1.5, 1.0));
        assert!(request.ensure_valid().is_err());

        request.usage = Some(UsageProfile::new(0.5, 3.0));
        assert!(request.ensure_valid().is_ok());
    }

    #[test]
    fn test_edition_requires_engine() {
        let mut request = LookupRequest::new(CloudProvider::Aws, ResourceKind::Database);
        request.edition = Some("EE".to_string());

        match request.ensure_valid() {
            Err(EstimationError::Rejected { field, code }) => {
                assert_eq!(field, "edition");
                assert_eq!(code, "engine_required");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_named_usage_profiles() {
        assert_eq!(UsageProfile::named("always").unwrap().rate, 1.0);
        assert!(UsageProfile::named("business-hours").unwrap().rate < 0.25);
        assert!(UsageProfile::named("quantum").is_none());
    }

    #[test]
    fn test_concurrency_derived_from_volume() {
        let mut request = LookupRequest::new(CloudProvider::Aws, ResourceKind::Function);
        assert_eq!(request.effective_concurrency(), None);

        // 2,628,000 invocations x 1s over a 730h month = concurrency 1.0
        request.request_volume = Some(2_628_000.0);
        request.invocation_seconds = Some(1.0);
        let derived = request.effective_concurrency().unwrap();
        assert!((derived - 1.0).abs() < 1e-9);

        // Explicit concurrency wins
        request.concurrency = Some(4.0);
        assert_eq!(request.effective_concurrency(), Some(4.0));
    }
}
