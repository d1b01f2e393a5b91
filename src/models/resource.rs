use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// The four bookable resource kinds. Hotels and transports are priced per
/// night; activities and services carry a flat price.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    #[serde(rename = "hotel")]
    Hotel,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "activity")]
    Activity,
    #[serde(rename = "service")]
    Service,
}

impl ResourceKind {
    pub fn scales_with_nights(&self) -> bool {
        matches!(self, ResourceKind::Hotel | ResourceKind::Transport)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Hotel => "Hotel",
            ResourceKind::Transport => "Transport",
            ResourceKind::Activity => "Activity",
            ResourceKind::Service => "Service",
        }
    }
}

/// What the pricing engine needs to know about a catalog resource,
/// independent of which collection it came from.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct PricedResource {
    pub kind: ResourceKind,
    pub city_id: ObjectId,
    pub price: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Hotel {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub city_id: ObjectId,
    pub name: String,
    pub description: String,
    pub price_per_night: f32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Transport {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub city_id: ObjectId,
    pub name: String,
    pub description: String,
    pub price_per_night: f32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Activity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub city_id: ObjectId,
    pub title: String,
    pub description: String,
    pub price: f32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Service {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub city_id: ObjectId,
    pub title: String,
    pub description: String,
    pub price: f32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}
