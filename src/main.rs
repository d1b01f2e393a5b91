use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use voyago_api::{db, routes};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(web::Data::new(client.clone()))
            .route("/health", web::get().to(|| async { "OK" }))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/demands")
                            .route("", web::post().to(routes::demand::create))
                            .route("", web::get().to(routes::demand::get_all))
                            .route("/{id}", web::get().to(routes::demand::get_by_id))
                            .route("/{id}", web::delete().to(routes::demand::delete))
                            .route("/{id}/total", web::get().to(routes::demand::get_total))
                            .route("/{id}/status", web::put().to(routes::demand::set_status))
                            .route("/{id}/send", web::post().to(routes::demand::send))
                            .route(
                                "/{id}/cities/{city_id}/hotel",
                                web::put().to(routes::demand::update_hotel),
                            )
                            .route(
                                "/{id}/cities/{city_id}/transport",
                                web::put().to(routes::demand::update_transport),
                            )
                            .route(
                                "/{id}/cities/{city_id}/services",
                                web::put().to(routes::demand::update_services),
                            )
                            .route(
                                "/{id}/cities/{city_id}/activities",
                                web::put().to(routes::demand::update_activities),
                            ),
                    )
                    .service(
                        web::scope("/packages")
                            .route("", web::post().to(routes::package::create))
                            .route("", web::get().to(routes::package::get_all))
                            .route("/{id}", web::get().to(routes::package::get_by_id))
                            .route("/{id}", web::put().to(routes::package::update))
                            .route("/{id}", web::delete().to(routes::package::delete)),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
