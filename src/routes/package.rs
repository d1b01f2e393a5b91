use actix_web::{web, HttpResponse, Responder};
use bson::{doc, oid::ObjectId, DateTime};
use futures::TryStreamExt;
use mongodb::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::demand::CitySegment;
use crate::models::package::SpecialPackage;
use crate::models::resource::ResourceKind;
use crate::routes::demand::{catalog_error_response, itinerary_error_response};
use crate::services::catalog_service::{CatalogError, MongoCatalog, ResourceResolver};
use crate::services::itinerary_service::ItineraryService;
use crate::services::pricing_service::{PricingError, PricingService};

#[derive(Debug, Deserialize)]
pub struct PackageSegmentRequest {
    pub city_id: String,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub hotel_id: Option<String>,
    #[serde(default)]
    pub transport_id: Option<String>,
    #[serde(default)]
    pub activity_ids: Vec<String>,
    #[serde(default)]
    pub service_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PackageRequest {
    pub name: String,
    pub description: String,
    pub city_segments: Vec<PackageSegmentRequest>,
    pub discount_percent: f32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub active: Option<bool>,
    pub search: Option<String>,
}

fn packages_collection(client: &Client) -> mongodb::Collection<SpecialPackage> {
    client.database("Bookings").collection("Packages")
}

/// Parse and validate the full itinerary of a package request: known
/// cities, each appearing once, valid date ranges, and every referenced
/// resource living in its segment's city.
async fn build_itinerary(
    catalog: &MongoCatalog,
    segments: &[PackageSegmentRequest],
) -> Result<Vec<CitySegment>, HttpResponse> {
    let mut itinerary = Vec::new();

    for request in segments {
        let city_id = ObjectId::parse_str(&request.city_id)
            .map_err(|_| HttpResponse::BadRequest().body("Invalid city ID"))?;
        catalog
            .city(city_id)
            .await
            .map_err(catalog_error_response)?;

        let mut segment = ItineraryService::new_segment(
            city_id,
            DateTime::from_millis(request.start_date.timestamp_millis()),
            DateTime::from_millis(request.end_date.timestamp_millis()),
            Vec::new(),
        )
        .map_err(itinerary_error_response)?;

        segment.hotel_id = match &request.hotel_id {
            Some(raw) => Some(
                resolve_in_city(catalog, ResourceKind::Hotel, raw, city_id).await?,
            ),
            None => None,
        };
        segment.transport_id = match &request.transport_id {
            Some(raw) => Some(
                resolve_in_city(catalog, ResourceKind::Transport, raw, city_id).await?,
            ),
            None => None,
        };
        for raw in &request.activity_ids {
            segment
                .activity_ids
                .push(resolve_in_city(catalog, ResourceKind::Activity, raw, city_id).await?);
        }
        for raw in &request.service_ids {
            segment
                .service_ids
                .push(resolve_in_city(catalog, ResourceKind::Service, raw, city_id).await?);
        }

        ItineraryService::add_segment(&mut itinerary, segment)
            .map_err(itinerary_error_response)?;
    }

    ItineraryService::check_distinct_cities(&itinerary).map_err(itinerary_error_response)?;
    Ok(itinerary)
}

async fn resolve_in_city(
    catalog: &MongoCatalog,
    kind: ResourceKind,
    raw_id: &str,
    city_id: ObjectId,
) -> Result<ObjectId, HttpResponse> {
    let id = ObjectId::parse_str(raw_id)
        .map_err(|_| HttpResponse::BadRequest().body(format!("Invalid {} ID", kind.label())))?;
    let resource = catalog
        .resolve(kind, id)
        .await
        .map_err(catalog_error_response)?;
    if resource.city_id != city_id {
        return Err(HttpResponse::BadRequest().body(format!(
            "{} {} does not belong to city {}",
            kind.label(),
            id,
            city_id
        )));
    }
    Ok(id)
}

/// Refresh the stored price fields from current catalog prices. The stored
/// discount was validated when the package was written. A package whose
/// itinerary references a resource that has since left the catalog comes
/// back with null prices rather than the stale stored totals.
async fn refreshed<R: ResourceResolver>(
    catalog: &R,
    mut package: SpecialPackage,
) -> Result<SpecialPackage, CatalogError> {
    match PricingService::itinerary_cost(catalog, &package.itinerary).await {
        Ok(base_price) => {
            let final_price =
                match PricingService::apply_discount(base_price, package.discount_percent) {
                    Ok((_, final_price)) => final_price,
                    Err(PricingError::InvalidDiscount(_)) => base_price,
                };
            package.base_price = Some(base_price);
            package.final_price = Some(final_price);
        }
        Err(CatalogError::NotFound(_)) => {
            package.base_price = None;
            package.final_price = None;
        }
        Err(err) => return Err(err),
    }
    package.total_period_days = ItineraryService::total_duration(&package.itinerary);
    Ok(package)
}

/*
    POST /api/packages
*/
pub async fn create(
    data: web::Data<Arc<Client>>,
    input: web::Json<PackageRequest>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let request = input.into_inner();

    if request.name.trim().is_empty() {
        return HttpResponse::BadRequest().body("Package name is required");
    }

    let catalog = MongoCatalog::new(client.clone());
    let itinerary = match build_itinerary(&catalog, &request.city_segments).await {
        Ok(itinerary) => itinerary,
        Err(resp) => return resp,
    };

    let base_price = match PricingService::itinerary_cost(&catalog, &itinerary).await {
        Ok(base) => base,
        Err(err) => return catalog_error_response(err),
    };
    let final_price = match PricingService::apply_discount(base_price, request.discount_percent) {
        Ok((_, final_price)) => final_price,
        Err(PricingError::InvalidDiscount(percent)) => {
            return HttpResponse::BadRequest()
                .body(format!("Discount percent {} is outside [0, 100]", percent));
        }
    };

    let now = DateTime::now();
    let mut package = SpecialPackage {
        id: None,
        name: request.name,
        description: request.description,
        total_period_days: ItineraryService::total_duration(&itinerary),
        itinerary,
        discount_percent: request.discount_percent,
        base_price: Some(base_price),
        final_price: Some(final_price),
        active: request.active,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match packages_collection(&client).insert_one(&package).await {
        Ok(result) => {
            package.id = result.inserted_id.as_object_id();
            HttpResponse::Ok().json(package)
        }
        Err(err) => {
            eprintln!("Failed to insert package: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create package")
        }
    }
}

/*
    GET /api/packages
*/
pub async fn get_all(
    data: web::Data<Arc<Client>>,
    params: web::Query<ListParams>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let collection = packages_collection(&client);

    let mut filter = doc! {};
    if let Some(active) = params.active {
        filter.insert("active", active);
    }
    if let Some(search) = &params.search {
        if !search.is_empty() {
            filter.insert(
                "name",
                doc! { "$regex": format!("^{}", regex::escape(search)), "$options": "i" },
            );
        }
    }

    let packages = match collection
        .find(filter)
        .sort(doc! { "created_at": -1 })
        .limit(100)
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<SpecialPackage>>().await {
            Ok(packages) => packages,
            Err(err) => {
                eprintln!("Failed to collect packages: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to retrieve packages");
            }
        },
        Err(err) => {
            eprintln!("Failed to retrieve packages: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to retrieve packages");
        }
    };

    let catalog = MongoCatalog::new(client.clone());
    let mut responses = Vec::with_capacity(packages.len());
    for package in packages {
        match refreshed(&catalog, package).await {
            Ok(package) => responses.push(package),
            Err(err) => return catalog_error_response(err),
        }
    }

    HttpResponse::Ok().json(responses)
}

/*
    GET /api/packages/{id}
*/
pub async fn get_by_id(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let client = data.get_ref().clone();
    let package_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    match packages_collection(&client)
        .find_one(doc! { "_id": package_id })
        .await
    {
        Ok(Some(package)) => {
            let catalog = MongoCatalog::new(client.clone());
            match refreshed(&catalog, package).await {
                Ok(package) => HttpResponse::Ok().json(package),
                Err(err) => catalog_error_response(err),
            }
        }
        Ok(None) => HttpResponse::NotFound().body("Package not found"),
        Err(err) => {
            eprintln!("Failed to retrieve package: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve package")
        }
    }
}

/*
    PUT /api/packages/{id}

    Packages are re-specified whole by the operator, so this is a full
    replace rather than a per-field update.
*/
pub async fn update(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<PackageRequest>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let package_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };
    let request = input.into_inner();

    if request.name.trim().is_empty() {
        return HttpResponse::BadRequest().body("Package name is required");
    }

    let collection = packages_collection(&client);
    let existing = match collection.find_one(doc! { "_id": package_id }).await {
        Ok(Some(package)) => package,
        Ok(None) => return HttpResponse::NotFound().body("Package not found"),
        Err(err) => {
            eprintln!("Failed to retrieve package: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to retrieve package");
        }
    };

    let catalog = MongoCatalog::new(client.clone());
    let itinerary = match build_itinerary(&catalog, &request.city_segments).await {
        Ok(itinerary) => itinerary,
        Err(resp) => return resp,
    };

    let base_price = match PricingService::itinerary_cost(&catalog, &itinerary).await {
        Ok(base) => base,
        Err(err) => return catalog_error_response(err),
    };
    let final_price = match PricingService::apply_discount(base_price, request.discount_percent) {
        Ok((_, final_price)) => final_price,
        Err(PricingError::InvalidDiscount(percent)) => {
            return HttpResponse::BadRequest()
                .body(format!("Discount percent {} is outside [0, 100]", percent));
        }
    };

    let package = SpecialPackage {
        id: existing.id,
        name: request.name,
        description: request.description,
        total_period_days: ItineraryService::total_duration(&itinerary),
        itinerary,
        discount_percent: request.discount_percent,
        base_price: Some(base_price),
        final_price: Some(final_price),
        active: request.active,
        created_at: existing.created_at,
        updated_at: Some(DateTime::now()),
    };

    match collection
        .replace_one(doc! { "_id": package_id }, &package)
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().body("Package not found")
        }
        Ok(_) => HttpResponse::Ok().json(package),
        Err(err) => {
            eprintln!("Failed to update package: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update package")
        }
    }
}

/*
    DELETE /api/packages/{id}
*/
pub async fn delete(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let client = data.get_ref().clone();
    let package_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    match packages_collection(&client)
        .delete_one(doc! { "_id": package_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().body("Package not found")
        }
        Ok(_) => HttpResponse::Ok().body("Package deleted"),
        Err(err) => {
            eprintln!("Failed to delete package: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to delete package")
        }
    }
}
