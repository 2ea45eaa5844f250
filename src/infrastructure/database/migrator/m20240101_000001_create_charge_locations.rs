//! Create charge_locations table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChargeLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChargeLocations::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChargeLocations::Name).string().not_null())
                    .col(ColumnDef::new(ChargeLocations::Lat).double().not_null())
                    .col(ColumnDef::new(ChargeLocations::Lng).double().not_null())
                    .col(ColumnDef::new(ChargeLocations::City).string())
                    .col(ColumnDef::new(ChargeLocations::Country).string())
                    .col(ColumnDef::new(ChargeLocations::Postcode).string())
                    .col(ColumnDef::new(ChargeLocations::Street).string())
                    .col(
                        ColumnDef::new(ChargeLocations::Chargepoints)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(ChargeLocations::Network).string())
                    .col(ColumnDef::new(ChargeLocations::Url).string().not_null())
                    .col(
                        ColumnDef::new(ChargeLocations::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ChargeLocations::RetrievedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChargeLocations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ChargeLocations {
    Table,
    Id,
    Name,
    Lat,
    Lng,
    City,
    Country,
    Postcode,
    Street,
    Chargepoints,
    Network,
    Url,
    Verified,
    RetrievedAt,
}
