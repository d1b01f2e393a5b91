mod common;

use actix_web::{http::header, test};
use serde_json::json;
use serial_test::serial;

use common::TestApp;

#[actix_rt::test]
#[serial]
async fn test_list_packages_returns_array() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/packages").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.is_array());
}

#[actix_rt::test]
#[serial]
async fn test_list_packages_with_filters() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for uri in ["/packages?active=true", "/packages?search=desert"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}

#[actix_rt::test]
#[serial]
async fn test_create_package_rejects_out_of_range_discount() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for discount in [-1.0, 101.0] {
        let req = test::TestRequest::post()
            .uri("/packages")
            .set_json(&json!({
                "name": "Desert Escape",
                "description": "Two cities, one week",
                "discount_percent": discount,
                "city_segments": [
                    {
                        "city_id": "65f000000000000000000001",
                        "start_date": "2025-06-01T00:00:00Z",
                        "end_date": "2025-06-03T00:00:00Z"
                    }
                ]
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }
}

#[actix_rt::test]
#[serial]
async fn test_create_package_rejects_empty_itinerary() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/packages")
        .set_json(&json!({
            "name": "Empty",
            "description": "No cities",
            "discount_percent": 10.0,
            "city_segments": []
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

#[actix_rt::test]
#[serial]
async fn test_package_lookup_for_unknown_id_is_not_found() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/packages/65f000000000000000000099")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::delete()
        .uri("/packages/65f000000000000000000099")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
#[serial]
async fn test_package_routes_with_wrong_methods() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put().uri("/packages").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);

    let req = test::TestRequest::post()
        .uri("/packages/65f000000000000000000099")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);
}

#[actix_rt::test]
#[serial]
async fn test_malformed_json_in_create_package() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/packages")
        .set_payload("{ invalid json")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}
