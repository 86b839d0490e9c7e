use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM entity for the catalog_terms table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_terms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(StringLen::N(50))")]
    pub code: String,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub name: String,
    pub ephemeral: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::PriceTerm {
    fn from(model: Model) -> Self {
        Self {
            code: model.code,
            name: model.name,
            ephemeral: model.ephemeral,
        }
    }
}

impl From<crate::models::PriceTerm> for ActiveModel {
    fn from(term: crate::models::PriceTerm) -> Self {
        ActiveModel {
            code: Set(term.code),
            name: Set(term.name),
            ephemeral: Set(term.ephemeral),
        }
    }
}
