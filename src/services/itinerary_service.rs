use mongodb::bson::{oid::ObjectId, DateTime};

use crate::models::demand::CitySegment;

const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, PartialEq)]
pub enum ItineraryError {
    /// The targeted city is not part of this itinerary. Distinct from the
    /// demand/package itself being missing.
    SegmentNotFound(ObjectId),
    /// End date before start date, or an empty itinerary.
    InvalidDates(String),
    DuplicateCity(ObjectId),
    EmptyItinerary,
}

pub struct ItineraryService;

impl ItineraryService {
    /// Nights between two dates, rounded up. A same-day trip is 0 nights.
    pub fn duration_days(start: DateTime, end: DateTime) -> Result<u32, ItineraryError> {
        let span = end.timestamp_millis() - start.timestamp_millis();
        if span < 0 {
            return Err(ItineraryError::InvalidDates(
                "end date is before start date".to_string(),
            ));
        }
        Ok(((span + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY) as u32)
    }

    /// Build a fresh segment the way a client submission does: dates and
    /// activities only, hotel/transport/services left for the operator.
    pub fn new_segment(
        city_id: ObjectId,
        start_date: DateTime,
        end_date: DateTime,
        activity_ids: Vec<ObjectId>,
    ) -> Result<CitySegment, ItineraryError> {
        let duration_days = Self::duration_days(start_date, end_date)?;
        Ok(CitySegment {
            city_id,
            start_date,
            end_date,
            duration_days,
            activity_ids,
            service_ids: Vec::new(),
            hotel_id: None,
            transport_id: None,
        })
    }

    pub fn total_duration(segments: &[CitySegment]) -> u32 {
        segments.iter().map(|s| s.duration_days).sum()
    }

    /// Per-city addressing is only sound when each city appears once.
    pub fn check_distinct_cities(segments: &[CitySegment]) -> Result<(), ItineraryError> {
        if segments.is_empty() {
            return Err(ItineraryError::EmptyItinerary);
        }
        for (i, segment) in segments.iter().enumerate() {
            if segments[..i].iter().any(|s| s.city_id == segment.city_id) {
                return Err(ItineraryError::DuplicateCity(segment.city_id));
            }
        }
        Ok(())
    }

    pub fn add_segment(
        segments: &mut Vec<CitySegment>,
        segment: CitySegment,
    ) -> Result<(), ItineraryError> {
        if segments.iter().any(|s| s.city_id == segment.city_id) {
            return Err(ItineraryError::DuplicateCity(segment.city_id));
        }
        segments.push(segment);
        Ok(())
    }

    pub fn remove_segment(
        segments: &mut Vec<CitySegment>,
        city_id: ObjectId,
    ) -> Result<CitySegment, ItineraryError> {
        match segments.iter().position(|s| s.city_id == city_id) {
            Some(index) => Ok(segments.remove(index)),
            None => Err(ItineraryError::SegmentNotFound(city_id)),
        }
    }

    /// Change one segment's dates and recompute its duration. Selections on
    /// that segment and all other segments are left untouched.
    pub fn update_segment_dates(
        segments: &mut [CitySegment],
        city_id: ObjectId,
        start_date: DateTime,
        end_date: DateTime,
    ) -> Result<(), ItineraryError> {
        let duration_days = Self::duration_days(start_date, end_date)?;
        match segments.iter_mut().find(|s| s.city_id == city_id) {
            Some(segment) => {
                segment.start_date = start_date;
                segment.end_date = end_date;
                segment.duration_days = duration_days;
                Ok(())
            }
            None => Err(ItineraryError::SegmentNotFound(city_id)),
        }
    }
}
