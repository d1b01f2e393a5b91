use crate::models::demand::CitySegment;
use crate::models::resource::{PricedResource, ResourceKind};
use crate::services::catalog_service::{CatalogError, ResourceResolver};

#[derive(Debug, PartialEq)]
pub enum PricingError {
    /// Discount percent outside [0, 100]. Rejected, never clamped, so an
    /// operator typo does not silently change the offer.
    InvalidDiscount(f32),
}

pub struct PricingService;

impl PricingService {
    /// Cost of one resource for a segment of `nights` nights. Hotels and
    /// transports scale with the stay length; activities and services are
    /// flat per trip.
    pub fn resource_cost(resource: &PricedResource, nights: u32) -> f32 {
        if resource.kind.scales_with_nights() {
            resource.price * nights as f32
        } else {
            resource.price
        }
    }

    /// Price one segment from current catalog prices. Unset hotel/transport
    /// contribute nothing; a zero-night segment still pays its flat
    /// activity and service prices.
    pub async fn segment_cost<R: ResourceResolver>(
        resolver: &R,
        segment: &CitySegment,
    ) -> Result<f32, CatalogError> {
        let mut total = 0.0;

        if let Some(hotel_id) = segment.hotel_id {
            let hotel = resolver
                .resolve_for_city(ResourceKind::Hotel, hotel_id, segment.city_id)
                .await?;
            total += Self::resource_cost(&hotel, segment.duration_days);
        }

        if let Some(transport_id) = segment.transport_id {
            let transport = resolver
                .resolve_for_city(ResourceKind::Transport, transport_id, segment.city_id)
                .await?;
            total += Self::resource_cost(&transport, segment.duration_days);
        }

        for id in &segment.activity_ids {
            let activity = resolver
                .resolve_for_city(ResourceKind::Activity, *id, segment.city_id)
                .await?;
            total += Self::resource_cost(&activity, segment.duration_days);
        }

        for id in &segment.service_ids {
            let service = resolver
                .resolve_for_city(ResourceKind::Service, *id, segment.city_id)
                .await?;
            total += Self::resource_cost(&service, segment.duration_days);
        }

        Ok(total)
    }

    pub async fn itinerary_cost<R: ResourceResolver>(
        resolver: &R,
        segments: &[CitySegment],
    ) -> Result<f32, CatalogError> {
        let mut total = 0.0;
        for segment in segments {
            total += Self::segment_cost(resolver, segment).await?;
        }
        Ok(total)
    }

    /// Returns `(discount_amount, final_price)`.
    pub fn apply_discount(base: f32, percent: f32) -> Result<(f32, f32), PricingError> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(PricingError::InvalidDiscount(percent));
        }
        let discount = base * percent / 100.0;
        Ok((discount, base - discount))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use mongodb::bson::oid::ObjectId;

    use super::*;
    use crate::models::city::City;
    use crate::services::itinerary_service::ItineraryService;

    /// In-memory resolver: the engine only sees `{kind, city_id, price}`.
    pub struct TestCatalog {
        pub resources: HashMap<(ResourceKind, ObjectId), PricedResource>,
        pub cities: Vec<ObjectId>,
    }

    impl TestCatalog {
        pub fn new() -> Self {
            Self {
                resources: HashMap::new(),
                cities: Vec::new(),
            }
        }

        pub fn with_resource(
            mut self,
            kind: ResourceKind,
            id: ObjectId,
            city_id: ObjectId,
            price: f32,
        ) -> Self {
            self.resources
                .insert((kind, id), PricedResource { kind, city_id, price });
            self
        }
    }

    impl ResourceResolver for TestCatalog {
        async fn resolve(
            &self,
            kind: ResourceKind,
            id: ObjectId,
        ) -> Result<PricedResource, CatalogError> {
            self.resources
                .get(&(kind, id))
                .copied()
                .ok_or(CatalogError::NotFound(kind.label()))
        }

        async fn city(&self, id: ObjectId) -> Result<City, CatalogError> {
            if self.cities.contains(&id) {
                Ok(City {
                    id: Some(id),
                    name: "Test City".to_string(),
                    region: "Test Region".to_string(),
                    country: "Testland".to_string(),
                    active: true,
                })
            } else {
                Err(CatalogError::NotFound("City"))
            }
        }
    }

    fn segment_of_nights(city_id: ObjectId, nights: u32) -> CitySegment {
        let start = mongodb::bson::DateTime::from_millis(0);
        let end = mongodb::bson::DateTime::from_millis(nights as i64 * 86_400_000);
        ItineraryService::new_segment(city_id, start, end, vec![]).unwrap()
    }

    #[test]
    fn test_apply_discount_bounds() {
        assert_eq!(PricingService::apply_discount(200.0, 0.0), Ok((0.0, 200.0)));
        assert_eq!(
            PricingService::apply_discount(200.0, 100.0),
            Ok((200.0, 0.0))
        );
        assert_eq!(
            PricingService::apply_discount(350.0, 10.0),
            Ok((35.0, 315.0))
        );
    }

    #[test]
    fn test_apply_discount_rejects_out_of_range() {
        assert_eq!(
            PricingService::apply_discount(100.0, -1.0),
            Err(PricingError::InvalidDiscount(-1.0))
        );
        assert_eq!(
            PricingService::apply_discount(100.0, 101.0),
            Err(PricingError::InvalidDiscount(101.0))
        );
    }

    #[actix_rt::test]
    async fn test_segment_cost_scales_hotel_and_transport_by_nights() {
        let city = ObjectId::new();
        let hotel = ObjectId::new();
        let transport = ObjectId::new();
        let catalog = TestCatalog::new()
            .with_resource(ResourceKind::Hotel, hotel, city, 40.0)
            .with_resource(ResourceKind::Transport, transport, city, 10.0);

        let mut segment = segment_of_nights(city, 3);
        segment.hotel_id = Some(hotel);
        segment.transport_id = Some(transport);

        let cost = PricingService::segment_cost(&catalog, &segment)
            .await
            .unwrap();
        assert_eq!(cost, 40.0 * 3.0 + 10.0 * 3.0);
    }

    #[actix_rt::test]
    async fn test_zero_night_segment_still_charges_flat_costs() {
        let city = ObjectId::new();
        let hotel = ObjectId::new();
        let activity = ObjectId::new();
        let catalog = TestCatalog::new()
            .with_resource(ResourceKind::Hotel, hotel, city, 500.0)
            .with_resource(ResourceKind::Activity, activity, city, 25.0);

        let mut segment = segment_of_nights(city, 0);
        segment.hotel_id = Some(hotel);
        segment.activity_ids = vec![activity];

        let cost = PricingService::segment_cost(&catalog, &segment)
            .await
            .unwrap();
        assert_eq!(cost, 25.0);
    }

    #[actix_rt::test]
    async fn test_segment_cost_is_order_independent() {
        let city = ObjectId::new();
        let a = ObjectId::new();
        let b = ObjectId::new();
        let c = ObjectId::new();
        let catalog = TestCatalog::new()
            .with_resource(ResourceKind::Activity, a, city, 20.0)
            .with_resource(ResourceKind::Activity, b, city, 30.0)
            .with_resource(ResourceKind::Activity, c, city, 45.0);

        let mut segment = segment_of_nights(city, 2);
        segment.activity_ids = vec![a, b, c];
        let forward = PricingService::segment_cost(&catalog, &segment)
            .await
            .unwrap();

        segment.activity_ids = vec![c, a, b];
        let permuted = PricingService::segment_cost(&catalog, &segment)
            .await
            .unwrap();

        assert_eq!(forward, permuted);
        assert_eq!(forward, 95.0);
    }

    #[actix_rt::test]
    async fn test_cross_city_resource_is_not_found_for_segment() {
        let city = ObjectId::new();
        let other_city = ObjectId::new();
        let hotel = ObjectId::new();
        let catalog =
            TestCatalog::new().with_resource(ResourceKind::Hotel, hotel, other_city, 80.0);

        let mut segment = segment_of_nights(city, 2);
        segment.hotel_id = Some(hotel);

        let result = PricingService::segment_cost(&catalog, &segment).await;
        assert!(matches!(result, Err(CatalogError::NotFound("Hotel"))));
    }

    #[actix_rt::test]
    async fn test_catalog_price_edits_show_up_on_next_calculation() {
        let city = ObjectId::new();
        let hotel = ObjectId::new();
        let mut catalog = TestCatalog::new().with_resource(ResourceKind::Hotel, hotel, city, 40.0);

        let mut segment = segment_of_nights(city, 3);
        segment.hotel_id = Some(hotel);

        let before = PricingService::segment_cost(&catalog, &segment)
            .await
            .unwrap();
        assert_eq!(before, 120.0);

        catalog.resources.insert(
            (ResourceKind::Hotel, hotel),
            PricedResource {
                kind: ResourceKind::Hotel,
                city_id: city,
                price: 60.0,
            },
        );

        let after = PricingService::segment_cost(&catalog, &segment)
            .await
            .unwrap();
        assert_eq!(after, 180.0);
    }

    #[actix_rt::test]
    async fn test_itinerary_cost_sums_segments() {
        let city_a = ObjectId::new();
        let city_b = ObjectId::new();
        let hotel_a = ObjectId::new();
        let hotel_b = ObjectId::new();
        let catalog = TestCatalog::new()
            .with_resource(ResourceKind::Hotel, hotel_a, city_a, 100.0)
            .with_resource(ResourceKind::Hotel, hotel_b, city_b, 50.0);

        let mut first = segment_of_nights(city_a, 2);
        first.hotel_id = Some(hotel_a);
        let mut second = segment_of_nights(city_b, 3);
        second.hotel_id = Some(hotel_b);

        let base = PricingService::itinerary_cost(&catalog, &[first, second])
            .await
            .unwrap();
        assert_eq!(base, 350.0);

        // The worked package example: 10% off 350 is 315.
        let (discount, final_price) = PricingService::apply_discount(base, 10.0).unwrap();
        assert_eq!(discount, 35.0);
        assert_eq!(final_price, 315.0);
    }
}
