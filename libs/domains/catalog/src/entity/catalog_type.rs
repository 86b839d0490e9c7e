use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{CloudProvider, Rating, ResourceKind};

/// Sea-ORM entity for the catalog_types table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider: CloudProvider,
    pub kind: ResourceKind,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub code: String,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub name: String,
    pub cpu: f64,
    pub ram_mib: f64,
    pub gpu: f64,
    pub constant_cpu: bool,
    pub custom_sizing: bool,
    pub cpu_increment: f64,
    pub ram_increment_mib: f64,
    pub min_cpu: f64,
    pub min_ram_mib: f64,
    pub rating: Rating,
    pub co2_factor: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::CatalogType {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            provider: model.provider,
            kind: model.kind,
            code: model.code,
            name: model.name,
            cpu: model.cpu,
            ram_mib: model.ram_mib,
            gpu: model.gpu,
            constant_cpu: model.constant_cpu,
            custom_sizing: model.custom_sizing,
            cpu_increment: model.cpu_increment,
            ram_increment_mib: model.ram_increment_mib,
            min_cpu: model.min_cpu,
            min_ram_mib: model.min_ram_mib,
            rating: model.rating,
            co2_factor: model.co2_factor,
        }
    }
}

impl From<crate::models::CatalogType> for ActiveModel {
    fn from(ty: crate::models::CatalogType) -> Self {
        ActiveModel {
            id: Set(ty.id),
            provider: Set(ty.provider),
            kind: Set(ty.kind),
            code: Set(ty.code),
            name: Set(ty.name),
            cpu: Set(ty.cpu),
            ram_mib: Set(ty.ram_mib),
            gpu: Set(ty.gpu),
            constant_cpu: Set(ty.constant_cpu),
            custom_sizing: Set(ty.custom_sizing),
            cpu_increment: Set(ty.cpu_increment),
            ram_increment_mib: Set(ty.ram_increment_mib),
            min_cpu: Set(ty.min_cpu),
            min_ram_mib: Set(ty.min_ram_mib),
            rating: Set(ty.rating),
            co2_factor: Set(ty.co2_factor),
        }
    }
}
