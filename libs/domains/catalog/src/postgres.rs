use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use tracing::debug;

use crate::entity::{catalog_type, location, price, term};
use crate::error::CatalogResult;
use crate::models::{
    CatalogCounts, CatalogPrice, CloudProvider, Location, PriceFilter, ResourceKind,
};
use crate::repository::{CatalogRepository, CommitSet};
use crate::snapshot::CatalogSnapshot;

/// PostgreSQL implementation of [`CatalogRepository`].
///
/// Commits apply each [`CommitSet`] inside a single transaction, so a
/// failed update run never leaves a partially merged catalog behind.
#[derive(Clone)]
pub struct PgCatalogRepository {
    db: DatabaseConnection,
}

impl PgCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn load_snapshot(&self, provider: CloudProvider) -> CatalogResult<CatalogSnapshot> {
        let locations = location::Entity::find()
            .filter(location::Column::Provider.eq(provider))
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let terms = term::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let types = catalog_type::Entity::find()
            .filter(catalog_type::Column::Provider.eq(provider))
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let prices = price::Entity::find()
            .filter(price::Column::Provider.eq(provider))
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(CatalogSnapshot {
            provider,
            locations,
            terms,
            types,
            prices,
        })
    }

    async fn commit(&self, provider: CloudProvider, changes: CommitSet) -> CatalogResult<()> {
        if changes.is_empty() {
            debug!(provider = %provider, "Commit set empty, nothing to persist");
            return Ok(());
        }

        let txn = self.db.begin().await?;

        if !changes.retired_price_codes.is_empty() {
            price::Entity::delete_many()
                .filter(price::Column::Provider.eq(provider))
                .filter(price::Column::Code.is_in(changes.retired_price_codes.clone()))
                .exec(&txn)
                .await?;
        }

        for (kind, code) in &changes.retired_type_codes {
            catalog_type::Entity::delete_many()
                .filter(catalog_type::Column::Provider.eq(provider))
                .filter(catalog_type::Column::Kind.eq(*kind))
                .filter(catalog_type::Column::Code.eq(code.clone()))
                .exec(&txn)
                .await?;
        }

        for loc in changes.locations {
            let model: location::ActiveModel = loc.into();
            location::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([location::Column::Provider, location::Column::Code])
                        .update_columns([
                            location::Column::Name,
                            location::Column::Continent,
                            location::Column::Preferred,
                        ])
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }

        for t in changes.terms {
            let model: term::ActiveModel = t.into();
            term::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(term::Column::Code)
                        .update_columns([term::Column::Name, term::Column::Ephemeral])
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }

        for ty in changes.types {
            let model: catalog_type::ActiveModel = ty.into();
            catalog_type::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        catalog_type::Column::Provider,
                        catalog_type::Column::Kind,
                        catalog_type::Column::Code,
                    ])
                    .update_columns([
                        catalog_type::Column::Name,
                        catalog_type::Column::Cpu,
                        catalog_type::Column::RamMib,
                        catalog_type::Column::Gpu,
                        catalog_type::Column::ConstantCpu,
                        catalog_type::Column::CustomSizing,
                        catalog_type::Column::CpuIncrement,
                        catalog_type::Column::RamIncrementMib,
                        catalog_type::Column::MinCpu,
                        catalog_type::Column::MinRamMib,
                        catalog_type::Column::Rating,
                        catalog_type::Column::Co2Factor,
                    ])
                    .to_owned(),
                )
                .exec(&txn)
                .await?;
        }

        for p in changes.prices {
            let model: price::ActiveModel = p.into();
            price::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([price::Column::Provider, price::Column::Code])
                        .update_columns([
                            price::Column::BaseCost,
                            price::Column::CostPerHour,
                            price::Column::CostPerCpuHour,
                            price::Column::CostPerMibHour,
                            price::Column::Co2PerHour,
                            price::Column::TierRates,
                            price::Column::TierLimits,
                            price::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn counts(&self, provider: CloudProvider) -> CatalogResult<CatalogCounts> {
        let prices = price::Entity::find()
            .filter(price::Column::Provider.eq(provider))
            .count(&self.db)
            .await? as i64;

        let types = catalog_type::Entity::find()
            .filter(catalog_type::Column::Provider.eq(provider))
            .count(&self.db)
            .await? as i64;

        let locations = location::Entity::find()
            .filter(location::Column::Provider.eq(provider))
            .count(&self.db)
            .await? as i64;

        let storage_types = catalog_type::Entity::find()
            .filter(catalog_type::Column::Provider.eq(provider))
            .filter(catalog_type::Column::Kind.eq(ResourceKind::Storage))
            .count(&self.db)
            .await? as i64;

        Ok(CatalogCounts {
            prices,
            types,
            locations,
            storage_types,
        })
    }

    async fn list_prices(&self, filter: PriceFilter) -> CatalogResult<Vec<CatalogPrice>> {
        let mut query = price::Entity::find();

        if let Some(provider) = filter.provider {
            query = query.filter(price::Column::Provider.eq(provider));
        }

        if let Some(kind) = filter.kind {
            query = query.filter(price::Column::Kind.eq(kind));
        }

        if let Some(type_code) = filter.type_code {
            query = query.filter(price::Column::TypeCode.eq(type_code));
        }

        if let Some(term_code) = filter.term_code {
            query = query.filter(price::Column::TermCode.eq(term_code));
        }

        if let Some(location_code) = filter.location_code {
            query = query.filter(price::Column::LocationCode.eq(location_code));
        }

        let results = query
            .order_by_asc(price::Column::Code)
            .offset(filter.offset as u64)
            .limit(filter.limit as u64)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(results)
    }

    async fn locations(&self, provider: CloudProvider) -> CatalogResult<Vec<Location>> {
        let results = location::Entity::find()
            .filter(location::Column::Provider.eq(provider))
            .order_by_asc(location::Column::Code)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(results)
    }
}
