//! SeaORM implementation of ChargeLocationRepository

use async_trait::async_trait;
use log::{debug, info};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use tokio::sync::watch;

use crate::domain::charge_location::{
    latest_by_id, Address, ChargeLocation, ChargeLocationRepository, Chargepoint, Coordinate,
};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::charge_location;
use crate::support::ChangeFeed;

/// Rows per statement, well below SQLite's bound-parameter limit.
const BATCH_SIZE: usize = 50;

/// Every store reading through one repository instance sees the changes
/// written through it.
pub struct SeaOrmChargeLocationRepository {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl SeaOrmChargeLocationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            changes: ChangeFeed::new(),
        }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn to_active_model(location: &ChargeLocation) -> DomainResult<charge_location::ActiveModel> {
    Ok(charge_location::ActiveModel {
        id: Set(location.id),
        name: Set(location.name.clone()),
        lat: Set(location.coordinates.lat),
        lng: Set(location.coordinates.lng),
        city: Set(location.address.city.clone()),
        country: Set(location.address.country.clone()),
        postcode: Set(location.address.postcode.clone()),
        street: Set(location.address.street.clone()),
        chargepoints: Set(serde_json::to_string(&location.chargepoints)?),
        network: Set(location.network.clone()),
        url: Set(location.url.clone()),
        verified: Set(location.verified),
        retrieved_at: Set(location.retrieved_at),
    })
}

fn location_from_model(model: charge_location::Model) -> DomainResult<ChargeLocation> {
    let chargepoints: Vec<Chargepoint> = serde_json::from_str(&model.chargepoints)?;
    Ok(ChargeLocation {
        id: model.id,
        name: model.name,
        coordinates: Coordinate::new(model.lat, model.lng),
        address: Address {
            city: model.city,
            country: model.country,
            postcode: model.postcode,
            street: model.street,
        },
        chargepoints,
        network: model.network,
        url: model.url,
        verified: model.verified,
        retrieved_at: model.retrieved_at,
    })
}

fn replace_on_conflict() -> OnConflict {
    OnConflict::column(charge_location::Column::Id)
        .update_columns([
            charge_location::Column::Name,
            charge_location::Column::Lat,
            charge_location::Column::Lng,
            charge_location::Column::City,
            charge_location::Column::Country,
            charge_location::Column::Postcode,
            charge_location::Column::Street,
            charge_location::Column::Chargepoints,
            charge_location::Column::Network,
            charge_location::Column::Url,
            charge_location::Column::Verified,
            charge_location::Column::RetrievedAt,
        ])
        .to_owned()
}

// ── ChargeLocationRepository impl ───────────────────────────────

#[async_trait]
impl ChargeLocationRepository for SeaOrmChargeLocationRepository {
    async fn insert(&self, locations: &[ChargeLocation]) -> DomainResult<()> {
        // One upsert statement cannot touch the same row twice.
        let unique = latest_by_id(locations);
        if unique.is_empty() {
            return Ok(());
        }
        debug!("Replacing {} charge locations", unique.len());

        let models = unique
            .into_iter()
            .map(to_active_model)
            .collect::<DomainResult<Vec<_>>>()?;

        let txn = self.db.begin().await?;
        for batch in models.chunks(BATCH_SIZE) {
            charge_location::Entity::insert_many(batch.to_vec())
                .on_conflict(replace_on_conflict())
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;
        self.changes.notify();

        info!("Charge locations saved: {}", models.len());
        Ok(())
    }

    async fn delete(&self, locations: &[ChargeLocation]) -> DomainResult<()> {
        if locations.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = locations.iter().map(|l| l.id).collect();
        debug!("Deleting {} charge locations", ids.len());

        let txn = self.db.begin().await?;
        let mut removed = 0;
        for batch in ids.chunks(BATCH_SIZE) {
            let result = charge_location::Entity::delete_many()
                .filter(charge_location::Column::Id.is_in(batch.iter().copied()))
                .exec(&txn)
                .await?;
            removed += result.rows_affected;
        }
        txn.commit().await?;
        if removed > 0 {
            self.changes.notify();
        }

        info!("Charge locations deleted: {}", removed);
        Ok(())
    }

    async fn find_all(&self) -> DomainResult<Vec<ChargeLocation>> {
        charge_location::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(location_from_model)
            .collect()
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}
