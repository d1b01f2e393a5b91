use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, Responder};

pub struct TestApp;

impl TestApp {
    pub fn new() -> Self {
        Self
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/demands")
                    .service(
                        web::resource("")
                            .route(web::post().to(create_demand))
                            .route(web::get().to(list_demands)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(demand_not_found))
                            .route(web::delete().to(demand_not_found)),
                    )
                    .service(web::resource("/{id}/total").route(web::get().to(demand_not_found)))
                    .service(web::resource("/{id}/status").route(web::put().to(demand_not_found)))
                    .service(web::resource("/{id}/send").route(web::post().to(demand_not_found)))
                    .service(
                        web::resource("/{id}/cities/{city_id}/hotel")
                            .route(web::put().to(demand_not_found)),
                    )
                    .service(
                        web::resource("/{id}/cities/{city_id}/transport")
                            .route(web::put().to(demand_not_found)),
                    )
                    .service(
                        web::resource("/{id}/cities/{city_id}/services")
                            .route(web::put().to(demand_not_found)),
                    )
                    .service(
                        web::resource("/{id}/cities/{city_id}/activities")
                            .route(web::put().to(demand_not_found)),
                    ),
            )
            .service(
                web::scope("/packages")
                    .service(
                        web::resource("")
                            .route(web::post().to(create_package))
                            .route(web::get().to(list_packages)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(package_not_found))
                            .route(web::put().to(package_not_found))
                            .route(web::delete().to(package_not_found)),
                    ),
            )
    }
}

// Stub handlers mirroring the production route tree; route-shape tests only
// assert methods, paths, and payload handling.

async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

async fn create_demand(input: web::Json<serde_json::Value>) -> impl Responder {
    if input.get("client_info").is_none() || input.get("city_selections").is_none() {
        return HttpResponse::BadRequest().body("Client info and city selections are required");
    }
    HttpResponse::Ok().json(serde_json::json!({
        "status": "PENDING",
        "base_price": 0.0,
        "total_duration_days": 0
    }))
}

async fn list_demands() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!([]))
}

async fn demand_not_found() -> impl Responder {
    HttpResponse::NotFound().body("Demand not found")
}

async fn create_package(input: web::Json<serde_json::Value>) -> impl Responder {
    let discount = input
        .get("discount_percent")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    if !(0.0..=100.0).contains(&discount) {
        return HttpResponse::BadRequest()
            .body(format!("Discount percent {} is outside [0, 100]", discount));
    }
    if input
        .get("city_segments")
        .and_then(|v| v.as_array())
        .map(|segments| segments.is_empty())
        .unwrap_or(true)
    {
        return HttpResponse::BadRequest().body("Itinerary must contain at least one city");
    }
    HttpResponse::Ok().json(serde_json::json!({
        "base_price": 0.0,
        "final_price": 0.0,
        "total_period_days": 0,
        "active": true
    }))
}

async fn list_packages() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!([]))
}

async fn package_not_found() -> impl Responder {
    HttpResponse::NotFound().body("Package not found")
}
