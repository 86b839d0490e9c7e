use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{CloudProvider, ResourceKind};

/// Sea-ORM entity for the catalog_prices table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_prices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider: CloudProvider,
    pub kind: ResourceKind,
    #[sea_orm(column_type = "String(StringLen::N(512))")]
    pub code: String,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub type_code: String,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub term_code: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub location_code: String,
    #[sea_orm(column_type = "String(StringLen::N(100))", nullable)]
    pub os: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(100))", nullable)]
    pub engine: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(100))", nullable)]
    pub edition: Option<String>,
    pub license_included: bool,
    pub base_cost: f64,
    pub cost_per_hour: f64,
    pub cost_per_cpu_hour: Option<f64>,
    pub cost_per_mib_hour: Option<f64>,
    pub co2_per_hour: Option<f64>,
    /// JSON-encoded band percentages (support plans)
    #[sea_orm(column_type = "JsonBinary")]
    pub tier_rates: Json,
    /// JSON-encoded band upper bounds
    #[sea_orm(column_type = "JsonBinary")]
    pub tier_limits: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::CatalogPrice {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            provider: model.provider,
            kind: model.kind,
            code: model.code,
            type_code: model.type_code,
            term_code: model.term_code,
            location_code: model.location_code,
            os: model.os,
            engine: model.engine,
            edition: model.edition,
            license_included: model.license_included,
            base_cost: model.base_cost,
            cost_per_hour: model.cost_per_hour,
            cost_per_cpu_hour: model.cost_per_cpu_hour,
            cost_per_mib_hour: model.cost_per_mib_hour,
            co2_per_hour: model.co2_per_hour,
            tier_rates: serde_json::from_value(model.tier_rates).unwrap_or_default(),
            tier_limits: serde_json::from_value(model.tier_limits).unwrap_or_default(),
        }
    }
}

impl From<crate::models::CatalogPrice> for ActiveModel {
    fn from(price: crate::models::CatalogPrice) -> Self {
        let now = chrono::Utc::now();
        ActiveModel {
            id: Set(price.id),
            provider: Set(price.provider),
            kind: Set(price.kind),
            code: Set(price.code),
            type_code: Set(price.type_code),
            term_code: Set(price.term_code),
            location_code: Set(price.location_code),
            os: Set(price.os),
            engine: Set(price.engine),
            edition: Set(price.edition),
            license_included: Set(price.license_included),
            base_cost: Set(price.base_cost),
            cost_per_hour: Set(price.cost_per_hour),
            cost_per_cpu_hour: Set(price.cost_per_cpu_hour),
            cost_per_mib_hour: Set(price.cost_per_mib_hour),
            co2_per_hour: Set(price.co2_per_hour),
            tier_rates: Set(serde_json::to_value(&price.tier_rates).unwrap_or_default()),
            tier_limits: Set(serde_json::to_value(&price.tier_limits).unwrap_or_default()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}
