use actix_web::{web, HttpResponse, Responder};
use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use futures::TryStreamExt;
use mongodb::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::demand::{ClientDemand, ClientInfo, DemandResponse, DemandStatus};
use crate::models::resource::ResourceKind;
use crate::services::catalog_service::{CatalogError, MongoCatalog, ResourceResolver};
use crate::services::itinerary_service::{ItineraryError, ItineraryService};
use crate::services::pricing_service::PricingService;

#[derive(Debug, Deserialize)]
pub struct CitySelection {
    pub city_id: String,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub activity_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDemandRequest {
    pub client_info: ClientInfo,
    pub city_selections: Vec<CitySelection>,
}

#[derive(Debug, Deserialize)]
pub struct HotelAssignment {
    pub hotel_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TransportAssignment {
    pub transport_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ServicesAssignment {
    pub service_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivitiesAssignment {
    pub activity_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: DemandStatus,
}

fn demands_collection(client: &Client) -> mongodb::Collection<ClientDemand> {
    client.database("Bookings").collection("Demands")
}

/// Filter addressing one embedded segment by its city. Pairs with a
/// positional `$set` so two operators editing different cities of the same
/// demand never overwrite each other.
fn segment_filter(demand_id: ObjectId, city_id: ObjectId) -> Document {
    doc! { "_id": demand_id, "itinerary.city_id": city_id }
}

/// `$set` touching exactly one field of the matched segment plus the
/// demand's `updated_at`. Never a whole-document replace.
fn segment_assignment(field: &str, value: Bson) -> Document {
    let mut set = doc! { "updated_at": DateTime::now() };
    set.insert(format!("itinerary.$.{}", field), value);
    doc! { "$set": set }
}

/// Status changes filter on `_id` only: any enumerated status is accepted
/// from any current status, matching the permissive lifecycle.
fn status_filter(demand_id: ObjectId) -> Document {
    doc! { "_id": demand_id }
}

fn object_id_list(ids: Vec<ObjectId>) -> Bson {
    Bson::Array(ids.into_iter().map(Bson::ObjectId).collect())
}

pub(crate) fn catalog_error_response(err: CatalogError) -> HttpResponse {
    match err {
        CatalogError::NotFound(label) => {
            HttpResponse::NotFound().body(format!("{} not found", label))
        }
        CatalogError::Database(err) => {
            eprintln!("Catalog lookup failed: {:?}", err);
            HttpResponse::InternalServerError().body("Catalog lookup failed")
        }
    }
}

pub(crate) fn itinerary_error_response(err: ItineraryError) -> HttpResponse {
    match err {
        ItineraryError::SegmentNotFound(city_id) => HttpResponse::NotFound()
            .body(format!("City {} is not part of this itinerary", city_id)),
        ItineraryError::InvalidDates(reason) => HttpResponse::BadRequest().body(reason),
        ItineraryError::DuplicateCity(city_id) => HttpResponse::BadRequest()
            .body(format!("City {} appears more than once in the itinerary", city_id)),
        ItineraryError::EmptyItinerary => {
            HttpResponse::BadRequest().body("Itinerary must contain at least one city")
        }
    }
}

/// Demand responses always carry totals recomputed from current catalog
/// prices; nothing is read from a stored total. A demand whose itinerary
/// references a resource that has since left the catalog is still returned,
/// with a null `base_price` instead of a number nobody can stand behind.
async fn respond_with_totals<R: ResourceResolver>(
    catalog: &R,
    demand: ClientDemand,
) -> HttpResponse {
    match PricingService::itinerary_cost(catalog, &demand.itinerary).await {
        Ok(base_price) => HttpResponse::Ok().json(DemandResponse::new(demand, Some(base_price))),
        Err(CatalogError::NotFound(_)) => {
            HttpResponse::Ok().json(DemandResponse::new(demand, None))
        }
        Err(err) => catalog_error_response(err),
    }
}

async fn load_and_respond(client: &Arc<Client>, demand_id: ObjectId) -> HttpResponse {
    let collection = demands_collection(client);
    match collection.find_one(doc! { "_id": demand_id }).await {
        Ok(Some(demand)) => {
            let catalog = MongoCatalog::new(client.clone());
            respond_with_totals(&catalog, demand).await
        }
        Ok(None) => HttpResponse::NotFound().body("Demand not found"),
        Err(err) => {
            eprintln!("Failed to retrieve demand: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve demand")
        }
    }
}

/*
    POST /api/demands
*/
pub async fn create(
    data: web::Data<Arc<Client>>,
    input: web::Json<CreateDemandRequest>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let request = input.into_inner();

    let info = &request.client_info;
    if info.full_name.trim().is_empty() || info.email.trim().is_empty() {
        return HttpResponse::BadRequest().body("Client name and email are required");
    }
    if info.number_of_travelers == 0 {
        return HttpResponse::BadRequest().body("At least one traveler is required");
    }

    let catalog = MongoCatalog::new(client.clone());
    let mut itinerary = Vec::new();

    for selection in &request.city_selections {
        let city_id = match ObjectId::parse_str(&selection.city_id) {
            Ok(id) => id,
            Err(_) => return HttpResponse::BadRequest().body("Invalid city ID"),
        };
        if let Err(err) = catalog.city(city_id).await {
            return catalog_error_response(err);
        }

        let mut activity_ids = Vec::new();
        for raw in &selection.activity_ids {
            let activity_id = match ObjectId::parse_str(raw) {
                Ok(id) => id,
                Err(_) => return HttpResponse::BadRequest().body("Invalid activity ID"),
            };
            match catalog
                .resolve(ResourceKind::Activity, activity_id)
                .await
            {
                Ok(activity) if activity.city_id != city_id => {
                    return HttpResponse::BadRequest().body(format!(
                        "Activity {} does not belong to city {}",
                        activity_id, city_id
                    ));
                }
                Ok(_) => activity_ids.push(activity_id),
                Err(err) => return catalog_error_response(err),
            }
        }

        let segment = match ItineraryService::new_segment(
            city_id,
            DateTime::from_millis(selection.start_date.timestamp_millis()),
            DateTime::from_millis(selection.end_date.timestamp_millis()),
            activity_ids,
        ) {
            Ok(segment) => segment,
            Err(err) => return itinerary_error_response(err),
        };
        if let Err(err) = ItineraryService::add_segment(&mut itinerary, segment) {
            return itinerary_error_response(err);
        }
    }
    if let Err(err) = ItineraryService::check_distinct_cities(&itinerary) {
        return itinerary_error_response(err);
    }

    let now = DateTime::now();
    let mut demand = ClientDemand {
        id: None,
        client_info: request.client_info,
        itinerary,
        status: DemandStatus::Pending,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match demands_collection(&client).insert_one(&demand).await {
        Ok(result) => {
            demand.id = result.inserted_id.as_object_id();
            respond_with_totals(&catalog, demand).await
        }
        Err(err) => {
            eprintln!("Failed to insert demand: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create demand")
        }
    }
}

/*
    GET /api/demands (operator listing, newest first)
*/
pub async fn get_all(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.get_ref().clone();
    let collection = demands_collection(&client);

    let cursor = collection
        .find(doc! {})
        .sort(doc! { "created_at": -1 })
        .limit(100)
        .await;

    let demands = match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<ClientDemand>>().await {
            Ok(demands) => demands,
            Err(err) => {
                eprintln!("Failed to collect demands: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to retrieve demands");
            }
        },
        Err(err) => {
            eprintln!("Failed to retrieve demands: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to retrieve demands");
        }
    };

    let catalog = MongoCatalog::new(client.clone());
    let mut responses = Vec::with_capacity(demands.len());
    for demand in demands {
        match PricingService::itinerary_cost(&catalog, &demand.itinerary).await {
            Ok(base_price) => responses.push(DemandResponse::new(demand, Some(base_price))),
            // One demand holding a stale catalog reference must not hide the
            // rest of the listing; it is returned unpriced.
            Err(CatalogError::NotFound(_)) => responses.push(DemandResponse::new(demand, None)),
            Err(err) => return catalog_error_response(err),
        }
    }

    HttpResponse::Ok().json(responses)
}

/*
    GET /api/demands/{id}
*/
pub async fn get_by_id(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let client = data.get_ref().clone();
    let demand_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };
    load_and_respond(&client, demand_id).await
}

/// Runs one per-city assignment: validates the resource against the
/// segment's city, then issues the positional update. A zero match count is
/// disambiguated into "demand missing" vs "city not in this itinerary".
async fn apply_segment_assignment(
    client: Arc<Client>,
    demand_id: ObjectId,
    city_id: ObjectId,
    update: Document,
) -> HttpResponse {
    let collection = demands_collection(&client);
    match collection
        .update_one(segment_filter(demand_id, city_id), update)
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            match collection.find_one(doc! { "_id": demand_id }).await {
                Ok(Some(_)) => HttpResponse::NotFound()
                    .body(format!("City {} is not part of this demand's itinerary", city_id)),
                Ok(None) => HttpResponse::NotFound().body("Demand not found"),
                Err(err) => {
                    eprintln!("Failed to check demand: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to update demand")
                }
            }
        }
        Ok(_) => load_and_respond(&client, demand_id).await,
        Err(err) => {
            eprintln!("Failed to update demand: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update demand")
        }
    }
}

fn parse_pair(path: (String, String)) -> Result<(ObjectId, ObjectId), HttpResponse> {
    let demand_id =
        ObjectId::parse_str(&path.0).map_err(|_| HttpResponse::BadRequest().body("Invalid ID"))?;
    let city_id = ObjectId::parse_str(&path.1)
        .map_err(|_| HttpResponse::BadRequest().body("Invalid city ID"))?;
    Ok((demand_id, city_id))
}

/*
    PUT /api/demands/{id}/cities/{city_id}/hotel
*/
pub async fn update_hotel(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
    input: web::Json<HotelAssignment>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let (demand_id, city_id) = match parse_pair(path.into_inner()) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };
    let hotel_id = match ObjectId::parse_str(&input.hotel_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid hotel ID"),
    };

    let catalog = MongoCatalog::new(client.clone());
    match catalog
        .resolve(ResourceKind::Hotel, hotel_id)
        .await
    {
        Ok(hotel) if hotel.city_id != city_id => {
            return HttpResponse::BadRequest()
                .body(format!("Hotel {} belongs to a different city", hotel_id));
        }
        Ok(_) => {}
        Err(err) => return catalog_error_response(err),
    }

    let update = segment_assignment("hotel_id", Bson::ObjectId(hotel_id));
    apply_segment_assignment(client, demand_id, city_id, update).await
}

/*
    PUT /api/demands/{id}/cities/{city_id}/transport
*/
pub async fn update_transport(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
    input: web::Json<TransportAssignment>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let (demand_id, city_id) = match parse_pair(path.into_inner()) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };
    let transport_id = match ObjectId::parse_str(&input.transport_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid transport ID"),
    };

    let catalog = MongoCatalog::new(client.clone());
    match catalog
        .resolve(ResourceKind::Transport, transport_id)
        .await
    {
        Ok(transport) if transport.city_id != city_id => {
            return HttpResponse::BadRequest()
                .body(format!("Transport {} belongs to a different city", transport_id));
        }
        Ok(_) => {}
        Err(err) => return catalog_error_response(err),
    }

    let update = segment_assignment("transport_id", Bson::ObjectId(transport_id));
    apply_segment_assignment(client, demand_id, city_id, update).await
}

/*
    PUT /api/demands/{id}/cities/{city_id}/services (full replacement)
*/
pub async fn update_services(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
    input: web::Json<ServicesAssignment>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let (demand_id, city_id) = match parse_pair(path.into_inner()) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };

    let catalog = MongoCatalog::new(client.clone());
    let mut service_ids = Vec::new();
    for raw in &input.service_ids {
        let service_id = match ObjectId::parse_str(raw) {
            Ok(id) => id,
            Err(_) => return HttpResponse::BadRequest().body("Invalid service ID"),
        };
        match catalog
            .resolve(ResourceKind::Service, service_id)
            .await
        {
            Ok(service) if service.city_id != city_id => {
                return HttpResponse::BadRequest()
                    .body(format!("Service {} belongs to a different city", service_id));
            }
            Ok(_) => service_ids.push(service_id),
            Err(err) => return catalog_error_response(err),
        }
    }

    let update = segment_assignment("service_ids", object_id_list(service_ids));
    apply_segment_assignment(client, demand_id, city_id, update).await
}

/*
    PUT /api/demands/{id}/cities/{city_id}/activities (full replacement)
*/
pub async fn update_activities(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
    input: web::Json<ActivitiesAssignment>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let (demand_id, city_id) = match parse_pair(path.into_inner()) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };

    let catalog = MongoCatalog::new(client.clone());
    let mut activity_ids = Vec::new();
    for raw in &input.activity_ids {
        let activity_id = match ObjectId::parse_str(raw) {
            Ok(id) => id,
            Err(_) => return HttpResponse::BadRequest().body("Invalid activity ID"),
        };
        match catalog
            .resolve(ResourceKind::Activity, activity_id)
            .await
        {
            Ok(activity) if activity.city_id != city_id => {
                return HttpResponse::BadRequest()
                    .body(format!("Activity {} belongs to a different city", activity_id));
            }
            Ok(_) => activity_ids.push(activity_id),
            Err(err) => return catalog_error_response(err),
        }
    }

    let update = segment_assignment("activity_ids", object_id_list(activity_ids));
    apply_segment_assignment(client, demand_id, city_id, update).await
}

/*
    PUT /api/demands/{id}/status
*/
pub async fn set_status(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<StatusChange>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let demand_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    let update = doc! {
        "$set": { "status": input.status.as_str(), "updated_at": DateTime::now() }
    };

    let collection = demands_collection(&client);
    match collection.update_one(status_filter(demand_id), update).await {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().body("Demand not found")
        }
        Ok(_) => load_and_respond(&client, demand_id).await,
        Err(err) => {
            eprintln!("Failed to update demand status: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update demand status")
        }
    }
}

/*
    POST /api/demands/{id}/send

    Marks the demand SENT. Notification dispatch hangs off this transition
    elsewhere; calling it on an already sent demand is a no-op success.
*/
pub async fn send(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let client = data.get_ref().clone();
    let demand_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    let update = doc! {
        "$set": { "status": DemandStatus::Sent.as_str(), "updated_at": DateTime::now() }
    };

    let collection = demands_collection(&client);
    match collection.update_one(status_filter(demand_id), update).await {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().body("Demand not found")
        }
        Ok(_) => load_and_respond(&client, demand_id).await,
        Err(err) => {
            eprintln!("Failed to send demand: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to send demand")
        }
    }
}

/*
    GET /api/demands/{id}/total
*/
pub async fn get_total(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let client = data.get_ref().clone();
    let demand_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    let collection = demands_collection(&client);
    match collection.find_one(doc! { "_id": demand_id }).await {
        Ok(Some(demand)) => {
            let catalog = MongoCatalog::new(client.clone());
            match PricingService::itinerary_cost(&catalog, &demand.itinerary).await {
                Ok(base_price) => {
                    HttpResponse::Ok().json(serde_json::json!({ "base_price": base_price }))
                }
                Err(err) => catalog_error_response(err),
            }
        }
        Ok(None) => HttpResponse::NotFound().body("Demand not found"),
        Err(err) => {
            eprintln!("Failed to retrieve demand: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve demand")
        }
    }
}

/*
    DELETE /api/demands/{id}
*/
pub async fn delete(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let client = data.get_ref().clone();
    let demand_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    let collection = demands_collection(&client);
    match collection.delete_one(doc! { "_id": demand_id }).await {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().body("Demand not found")
        }
        Ok(_) => HttpResponse::Ok().body("Demand deleted"),
        Err(err) => {
            eprintln!("Failed to delete demand: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to delete demand")
        }
    }
}
