pub mod catalog_service;
pub mod itinerary_service;
pub mod pricing_service;
