//! ChargeLocation entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "charge_locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    pub name: String,

    pub lat: f64,
    pub lng: f64,

    #[sea_orm(nullable)]
    pub city: Option<String>,

    #[sea_orm(nullable)]
    pub country: Option<String>,

    #[sea_orm(nullable)]
    pub postcode: Option<String>,

    #[sea_orm(nullable)]
    pub street: Option<String>,

    /// JSON array of chargepoints
    #[sea_orm(column_type = "Text")]
    pub chargepoints: String,

    #[sea_orm(nullable)]
    pub network: Option<String>,

    pub url: String,

    pub verified: bool,

    pub retrieved_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
