use std::sync::Arc;

use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;

use crate::models::city::City;
use crate::models::resource::{Activity, Hotel, PricedResource, ResourceKind, Service, Transport};

#[derive(Debug)]
pub enum CatalogError {
    /// The id does not exist in the catalog (or, through
    /// `resolve_for_city`, exists but in another city).
    NotFound(&'static str),
    Database(mongodb::error::Error),
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        CatalogError::Database(err)
    }
}

/// Lookup boundary between the engine and the shared catalog. Prices are
/// resolved at calculation time, never cached inside a segment, so catalog
/// edits show up on the next calculation.
pub trait ResourceResolver {
    async fn resolve(&self, kind: ResourceKind, id: ObjectId)
        -> Result<PricedResource, CatalogError>;

    async fn city(&self, id: ObjectId) -> Result<City, CatalogError>;

    /// Resolve a resource within the scope of one segment's city. A resource
    /// that lives in a different city is not visible to that segment.
    async fn resolve_for_city(
        &self,
        kind: ResourceKind,
        id: ObjectId,
        city_id: ObjectId,
    ) -> Result<PricedResource, CatalogError> {
        let resource = self.resolve(kind, id).await?;
        if resource.city_id != city_id {
            return Err(CatalogError::NotFound(kind.label()));
        }
        Ok(resource)
    }
}

pub struct MongoCatalog {
    client: Arc<Client>,
}

impl MongoCatalog {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl ResourceResolver for MongoCatalog {
    async fn resolve(
        &self,
        kind: ResourceKind,
        id: ObjectId,
    ) -> Result<PricedResource, CatalogError> {
        let db = self.client.database("Catalog");
        let filter = doc! { "_id": id };

        let found = match kind {
            ResourceKind::Hotel => db
                .collection::<Hotel>("Hotels")
                .find_one(filter)
                .await?
                .map(|h| PricedResource {
                    kind,
                    city_id: h.city_id,
                    price: h.price_per_night,
                }),
            ResourceKind::Transport => db
                .collection::<Transport>("Transports")
                .find_one(filter)
                .await?
                .map(|t| PricedResource {
                    kind,
                    city_id: t.city_id,
                    price: t.price_per_night,
                }),
            ResourceKind::Activity => db
                .collection::<Activity>("Activities")
                .find_one(filter)
                .await?
                .map(|a| PricedResource {
                    kind,
                    city_id: a.city_id,
                    price: a.price,
                }),
            ResourceKind::Service => db
                .collection::<Service>("Services")
                .find_one(filter)
                .await?
                .map(|s| PricedResource {
                    kind,
                    city_id: s.city_id,
                    price: s.price,
                }),
        };

        found.ok_or(CatalogError::NotFound(kind.label()))
    }

    async fn city(&self, id: ObjectId) -> Result<City, CatalogError> {
        self.client
            .database("Catalog")
            .collection::<City>("Cities")
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(CatalogError::NotFound("City"))
    }
}
