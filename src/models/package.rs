use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::demand::CitySegment;

/// Operator-authored discounted trip offer. Fully specified in one editing
/// session; no status lifecycle, just an `active` flag. The stored price
/// fields are refreshed from current catalog prices before every response;
/// they come back null when a referenced resource no longer exists.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpecialPackage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub itinerary: Vec<CitySegment>,
    pub discount_percent: f32,
    pub base_price: Option<f32>,
    pub final_price: Option<f32>,
    pub total_period_days: u32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}
