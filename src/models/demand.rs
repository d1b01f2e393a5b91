use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum DemandStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "VALIDATED")]
    Validated,
    #[serde(rename = "SENT")]
    Sent,
}

impl DemandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandStatus::Pending => "PENDING",
            DemandStatus::Validated => "VALIDATED",
            DemandStatus::Sent => "SENT",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub number_of_travelers: u32,
}

/// One city of an itinerary: a date range plus the resources picked for it.
/// `duration_days` is derived from the dates and recomputed whenever either
/// date changes; it never arrives from the client.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CitySegment {
    pub city_id: ObjectId,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub duration_days: u32,
    #[serde(default)]
    pub activity_ids: Vec<ObjectId>,
    #[serde(default)]
    pub service_ids: Vec<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<ObjectId>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientDemand {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub client_info: ClientInfo,
    pub itinerary: Vec<CitySegment>,
    pub status: DemandStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

/// Demand plus the totals recomputed for this response. Prices are never
/// stored on the demand document, so every response derives them fresh
/// from current catalog prices. `base_price` is null when a referenced
/// resource has since been removed from the catalog.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DemandResponse {
    #[serde(flatten)]
    pub demand: ClientDemand,
    pub base_price: Option<f32>,
    pub total_duration_days: u32,
}

impl DemandResponse {
    pub fn new(demand: ClientDemand, base_price: Option<f32>) -> Self {
        let total_duration_days = demand.itinerary.iter().map(|s| s.duration_days).sum();
        Self {
            demand,
            base_price,
            total_duration_days,
        }
    }
}
