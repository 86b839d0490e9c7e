//! Built-in demo offer source
//!
//! Serves a small, deterministic offer sheet so the updater can be
//! exercised end to end without any upstream publisher. Used whenever a
//! provider has no offer URL configured.

use async_trait::async_trait;
use domain_catalog::{CloudProvider, FetchedOffer, ResourceKind};

use super::{OfferSource, SourceResult, filter_offers};

pub struct DemoOfferSource {
    provider: CloudProvider,
}

impl DemoOfferSource {
    pub fn new(provider: CloudProvider) -> Self {
        Self { provider }
    }

    fn sheet(&self) -> Vec<FetchedOffer> {
        let region = |code: &str, name: &str, preferred| {
            (code.to_string(), name.to_string(), preferred)
        };
        let regions = [
            region("us-east-1", "US East (N. Virginia)", true),
            region("eu-west-1", "EU (Ireland)", false),
        ];

        let mut offers = Vec::new();

        for (code, name, preferred) in &regions {
            let base = |kind, type_code: &str, term: &str| FetchedOffer {
                kind,
                type_code: type_code.to_string(),
                type_name: type_code.to_string(),
                term_code: term.to_string(),
                term_name: match term {
                    "od" => "On demand".to_string(),
                    "1y" => "1-year reserved".to_string(),
                    other => other.to_string(),
                },
                region: code.clone(),
                region_name: Some(name.clone()),
                continent: Some(if code.starts_with("eu") { "EU" } else { "NA" }.to_string()),
                preferred_region: *preferred,
                ..Default::default()
            };

            for (type_code, cpu, ram_mib, od, reserved) in [
                ("t3.micro", 2.0, 1024.0, 0.0104, 0.0066),
                ("m5.large", 2.0, 8192.0, 0.096, 0.061),
                ("c5.xlarge", 4.0, 8192.0, 0.17, 0.107),
            ] {
                for (term, cost) in [("od", od), ("1y", reserved)] {
                    offers.push(FetchedOffer {
                        cpu,
                        ram_mib,
                        constant_cpu: !type_code.starts_with("t3"),
                        os: Some("LINUX".to_string()),
                        cost_per_hour: Some(cost),
                        co2_per_hour: Some(cpu * 6.5),
                        ..base(ResourceKind::Instance, type_code, term)
                    });
                }
            }

            // A parametric compute type priced per unit
            offers.push(FetchedOffer {
                custom_sizing: true,
                cpu_increment: 2.0,
                ram_increment_mib: 1024.0,
                min_cpu: 1.0,
                min_ram_mib: 1024.0,
                cost_per_cpu_hour: Some(0.022),
                cost_per_mib_hour: Some(0.000011),
                ..base(ResourceKind::Instance, "flex", "od")
            });

            offers.push(FetchedOffer {
                cpu: 2.0,
                ram_mib: 16384.0,
                engine: Some("POSTGRES".to_string()),
                cost_per_hour: Some(0.24),
                ..base(ResourceKind::Database, "db.r5.large", "od")
            });

            offers.push(FetchedOffer {
                cost_per_month: Some(0.023 * 1000.0),
                ..base(ResourceKind::Storage, "object-standard", "od")
            });
        }

        // Support plans are region-independent; publish them once
        offers.push(FetchedOffer {
            kind: ResourceKind::Support,
            type_code: "business".to_string(),
            type_name: "business".to_string(),
            term_code: "od".to_string(),
            term_name: "On demand".to_string(),
            region: "us-east-1".to_string(),
            region_name: Some("US East (N. Virginia)".to_string()),
            base_cost: 100.0,
            tier_rates: vec![10.0, 7.0, 5.0, 3.0],
            tier_limits: vec![10_000.0, 80_000.0, 250_000.0],
            ..Default::default()
        });

        offers
    }
}

#[async_trait]
impl OfferSource for DemoOfferSource {
    fn provider(&self) -> CloudProvider {
        self.provider
    }

    fn name(&self) -> &'static str {
        "demo-offer-sheet"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_offers(
        &self,
        kinds: &[ResourceKind],
        regions: &[String],
    ) -> SourceResult<Vec<FetchedOffer>> {
        Ok(filter_offers(self.sheet(), kinds, regions))
    }

    async fn health_check(&self) -> SourceResult<bool> {
        Ok(true)
    }

    fn supported_regions(&self) -> Vec<String> {
        vec!["us-east-1".to_string(), "eu-west-1".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_sheet_covers_every_kind_family() {
        let source = DemoOfferSource::new(CloudProvider::Aws);
        let offers = source.fetch_offers(&[], &[]).await.unwrap();

        for kind in [
            ResourceKind::Instance,
            ResourceKind::Database,
            ResourceKind::Storage,
            ResourceKind::Support,
        ] {
            assert!(
                offers.iter().any(|o| o.kind == kind),
                "no {} offers in demo sheet",
                kind
            );
        }

        // Exactly one preferred region
        let preferred: Vec<_> = offers
            .iter()
            .filter(|o| o.preferred_region)
            .map(|o| o.region.clone())
            .collect();
        assert!(preferred.iter().all(|r| r == "us-east-1"));
    }

    #[tokio::test]
    async fn test_demo_sheet_respects_filters() {
        let source = DemoOfferSource::new(CloudProvider::Aws);
        let offers = source
            .fetch_offers(&[ResourceKind::Instance], &["eu-west-1".to_string()])
            .await
            .unwrap();

        assert!(!offers.is_empty());
        assert!(
            offers
                .iter()
                .all(|o| o.kind == ResourceKind::Instance && o.region == "eu-west-1")
        );
    }
}
