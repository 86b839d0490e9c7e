use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(CloudProviderEnum::Enum)
                    .values([
                        CloudProviderEnum::Aws,
                        CloudProviderEnum::Azure,
                        CloudProviderEnum::Gcp,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(ResourceKindEnum::Enum)
                    .values([
                        ResourceKindEnum::Instance,
                        ResourceKindEnum::Database,
                        ResourceKindEnum::Container,
                        ResourceKindEnum::Function,
                        ResourceKindEnum::Storage,
                        ResourceKindEnum::Support,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(RatingEnum::Enum)
                    .values([
                        RatingEnum::Worst,
                        RatingEnum::Low,
                        RatingEnum::Medium,
                        RatingEnum::Good,
                        RatingEnum::Best,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CatalogLocations::Table)
                    .if_not_exists()
                    .col(pk_uuid(CatalogLocations::Id))
                    .col(provider_column(CatalogLocations::Provider))
                    .col(string_len(CatalogLocations::Code, 100).not_null())
                    .col(string_len(CatalogLocations::Name, 255).not_null())
                    .col(string_len(CatalogLocations::Continent, 10).not_null())
                    .col(boolean(CatalogLocations::Preferred).not_null().default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_locations_provider_code")
                    .table(CatalogLocations::Table)
                    .col(CatalogLocations::Provider)
                    .col(CatalogLocations::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CatalogTerms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CatalogTerms::Code)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(string_len(CatalogTerms::Name, 255).not_null())
                    .col(boolean(CatalogTerms::Ephemeral).not_null().default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CatalogTypes::Table)
                    .if_not_exists()
                    .col(pk_uuid(CatalogTypes::Id))
                    .col(provider_column(CatalogTypes::Provider))
                    .col(kind_column(CatalogTypes::Kind))
                    .col(string_len(CatalogTypes::Code, 255).not_null())
                    .col(string_len(CatalogTypes::Name, 255).not_null())
                    .col(double(CatalogTypes::Cpu).not_null())
                    .col(double(CatalogTypes::RamMib).not_null())
                    .col(double(CatalogTypes::Gpu).not_null())
                    .col(boolean(CatalogTypes::ConstantCpu).not_null())
                    .col(boolean(CatalogTypes::CustomSizing).not_null())
                    .col(double(CatalogTypes::CpuIncrement).not_null())
                    .col(double(CatalogTypes::RamIncrementMib).not_null())
                    .col(double(CatalogTypes::MinCpu).not_null())
                    .col(double(CatalogTypes::MinRamMib).not_null())
                    .col(
                        ColumnDef::new(CatalogTypes::Rating)
                            .enumeration(
                                RatingEnum::Enum,
                                [
                                    RatingEnum::Worst,
                                    RatingEnum::Low,
                                    RatingEnum::Medium,
                                    RatingEnum::Good,
                                    RatingEnum::Best,
                                ],
                            )
                            .not_null(),
                    )
                    .col(double_null(CatalogTypes::Co2Factor))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_types_provider_kind_code")
                    .table(CatalogTypes::Table)
                    .col(CatalogTypes::Provider)
                    .col(CatalogTypes::Kind)
                    .col(CatalogTypes::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CatalogPrices::Table)
                    .if_not_exists()
                    .col(pk_uuid(CatalogPrices::Id))
                    .col(provider_column(CatalogPrices::Provider))
                    .col(kind_column(CatalogPrices::Kind))
                    .col(string_len(CatalogPrices::Code, 512).not_null())
                    .col(string_len(CatalogPrices::TypeCode, 255).not_null())
                    .col(string_len(CatalogPrices::TermCode, 50).not_null())
                    .col(string_len(CatalogPrices::LocationCode, 100).not_null())
                    .col(string_len_null(CatalogPrices::Os, 100))
                    .col(string_len_null(CatalogPrices::Engine, 100))
                    .col(string_len_null(CatalogPrices::Edition, 100))
                    .col(boolean(CatalogPrices::LicenseIncluded).not_null().default(true))
                    .col(double(CatalogPrices::BaseCost).not_null())
                    .col(double(CatalogPrices::CostPerHour).not_null())
                    .col(double_null(CatalogPrices::CostPerCpuHour))
                    .col(double_null(CatalogPrices::CostPerMibHour))
                    .col(double_null(CatalogPrices::Co2PerHour))
                    .col(json_binary(CatalogPrices::TierRates).not_null().default("[]"))
                    .col(json_binary(CatalogPrices::TierLimits).not_null().default("[]"))
                    .col(
                        timestamp_with_time_zone(CatalogPrices::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(CatalogPrices::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Natural code is the upsert key
        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_prices_provider_code")
                    .table(CatalogPrices::Table)
                    .col(CatalogPrices::Provider)
                    .col(CatalogPrices::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_prices_provider_kind")
                    .table(CatalogPrices::Table)
                    .col(CatalogPrices::Provider)
                    .col(CatalogPrices::Kind)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_prices_type_code")
                    .table(CatalogPrices::Table)
                    .col(CatalogPrices::TypeCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_prices_location_code")
                    .table(CatalogPrices::Table)
                    .col(CatalogPrices::LocationCode)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CatalogPrices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CatalogTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CatalogTerms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CatalogLocations::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(RatingEnum::Enum).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(ResourceKindEnum::Enum).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(CloudProviderEnum::Enum).to_owned())
            .await?;

        Ok(())
    }
}

fn provider_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .enumeration(
            CloudProviderEnum::Enum,
            [
                CloudProviderEnum::Aws,
                CloudProviderEnum::Azure,
                CloudProviderEnum::Gcp,
            ],
        )
        .not_null()
        .to_owned()
}

fn kind_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .enumeration(
            ResourceKindEnum::Enum,
            [
                ResourceKindEnum::Instance,
                ResourceKindEnum::Database,
                ResourceKindEnum::Container,
                ResourceKindEnum::Function,
                ResourceKindEnum::Storage,
                ResourceKindEnum::Support,
            ],
        )
        .not_null()
        .to_owned()
}

#[derive(DeriveIden)]
enum CatalogLocations {
    Table,
    Id,
    Provider,
    Code,
    Name,
    Continent,
    Preferred,
}

#[derive(DeriveIden)]
enum CatalogTerms {
    Table,
    Code,
    Name,
    Ephemeral,
}

#[derive(DeriveIden)]
enum CatalogTypes {
    Table,
    Id,
    Provider,
    Kind,
    Code,
    Name,
    Cpu,
    RamMib,
    Gpu,
    ConstantCpu,
    CustomSizing,
    CpuIncrement,
    RamIncrementMib,
    MinCpu,
    MinRamMib,
    Rating,
    Co2Factor,
}

#[derive(DeriveIden)]
enum CatalogPrices {
    Table,
    Id,
    Provider,
    Kind,
    Code,
    TypeCode,
    TermCode,
    LocationCode,
    Os,
    Engine,
    Edition,
    LicenseIncluded,
    BaseCost,
    CostPerHour,
    CostPerCpuHour,
    CostPerMibHour,
    Co2PerHour,
    TierRates,
    TierLimits,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CloudProviderEnum {
    #[sea_orm(iden = "cloud_provider")]
    Enum,
    #[sea_orm(iden = "aws")]
    Aws,
    #[sea_orm(iden = "azure")]
    Azure,
    #[sea_orm(iden = "gcp")]
    Gcp,
}

#[derive(DeriveIden)]
enum ResourceKindEnum {
    #[sea_orm(iden = "resource_kind")]
    Enum,
    #[sea_orm(iden = "instance")]
    Instance,
    #[sea_orm(iden = "database")]
    Database,
    #[sea_orm(iden = "container")]
    Container,
    #[sea_orm(iden = "function")]
    Function,
    #[sea_orm(iden = "storage")]
    Storage,
    #[sea_orm(iden = "support")]
    Support,
}

#[derive(DeriveIden)]
enum RatingEnum {
    #[sea_orm(iden = "rating")]
    Enum,
    #[sea_orm(iden = "WORST")]
    Worst,
    #[sea_orm(iden = "LOW")]
    Low,
    #[sea_orm(iden = "MEDIUM")]
    Medium,
    #[sea_orm(iden = "GOOD")]
    Good,
    #[sea_orm(iden = "BEST")]
    Best,
}
