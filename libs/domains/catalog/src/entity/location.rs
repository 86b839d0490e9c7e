use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::CloudProvider;

/// Sea-ORM entity for the catalog_locations table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider: CloudProvider,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub code: String,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub name: String,
    #[sea_orm(column_type = "String(StringLen::N(10))")]
    pub continent: String,
    pub preferred: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Location {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            provider: model.provider,
            code: model.code,
            name: model.name,
            continent: model.continent,
            preferred: model.preferred,
        }
    }
}

impl From<crate::models::Location> for ActiveModel {
    fn from(location: crate::models::Location) -> Self {
        ActiveModel {
            id: Set(location.id),
            provider: Set(location.provider),
            code: Set(location.code),
            name: Set(location.name),
            continent: Set(location.continent),
            preferred: Set(location.preferred),
        }
    }
}
