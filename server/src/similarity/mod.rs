//! Ranking of "similar" events.
//!
//! Two policies exist and exactly one is active per process:
//!
//! - `Temporal`: same category, date within a symmetric window of the base
//!   event, ordered by date ascending.
//! - `Spatial`: same category, great-circle distance within a radius,
//!   ordered by distance; falls back to same-category events by date when
//!   nothing is close enough.

use chrono::Duration;
use std::cmp::Ordering;

use crate::models::event::{Event, Location};

pub const MAX_SIMILAR_EVENTS: usize = 5;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimilarityPolicy {
    Temporal { window: Duration },
    Spatial { radius_km: f64 },
}

impl Default for SimilarityPolicy {
    fn default() -> Self {
        SimilarityPolicy::Temporal {
            window: Duration::days(7),
        }
    }
}

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Picks up to [`MAX_SIMILAR_EVENTS`] events from `candidates`.
///
/// Candidates outside the base event's category, and the base event
/// itself, are never returned.
pub fn rank_similar(base: &Event, candidates: Vec<Event>, policy: SimilarityPolicy) -> Vec<Event> {
    let mut pool: Vec<Event> = candidates
        .into_iter()
        .filter(|e| e.id != base.id && e.category == base.category)
        .collect();
    pool.sort_by(|a, b| a.date.cmp(&b.date));

    match policy {
        SimilarityPolicy::Temporal { window } => pool
            .into_iter()
            .filter(|e| (e.date - base.date).num_seconds().abs() <= window.num_seconds())
            .take(MAX_SIMILAR_EVENTS)
            .collect(),
        SimilarityPolicy::Spatial { radius_km } => {
            let mut nearby: Vec<(f64, &Event)> = pool
                .iter()
                .map(|e| (haversine_km(&base.location, &e.location), e))
                .filter(|(distance, _)| *distance <= radius_km)
                .collect();

            if nearby.is_empty() {
                return pool.into_iter().take(MAX_SIMILAR_EVENTS).collect();
            }

            // Stable sort keeps date order among equidistant events.
            nearby.sort_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            nearby
                .into_iter()
                .take(MAX_SIMILAR_EVENTS)
                .map(|(_, e)| e.clone())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::{EventCategory, NewEvent};
    use chrono::{DateTime, Utc};

    fn event_at(title: &str, date: &str, latitude: f64, longitude: f64) -> Event {
        Event::new(NewEvent {
            title: title.to_string(),
            description: "A talk about systems design topics".to_string(),
            date: date.parse::<DateTime<Utc>>().unwrap(),
            location: Location {
                address: "1 Main St".to_string(),
                latitude,
                longitude,
            },
            category: EventCategory::Meetup,
        })
    }

    #[test]
    fn test_haversine_known_distance() {
        let paris = Location {
            address: "Paris".to_string(),
            latitude: 48.8566,
            longitude: 2.3522,
        };
        let london = Location {
            address: "London".to_string(),
            latitude: 51.5074,
            longitude: -0.1278,
        };
        let distance = haversine_km(&paris, &london);
        assert!((distance - 343.5).abs() < 2.0, "got {}", distance);
        assert_eq!(haversine_km(&paris, &paris), 0.0);
    }

    #[test]
    fn test_temporal_policy_uses_window() {
        let base = event_at("A", "2024-06-01T10:00:00Z", 40.0, -74.0);
        let near = event_at("B", "2024-06-05T10:00:00Z", 40.0, -74.0);
        let before = event_at("C", "2024-05-26T10:00:00Z", 40.0, -74.0);
        let far = event_at("D", "2024-06-20T10:00:00Z", 40.0, -74.0);

        let result = rank_similar(
            &base,
            vec![far, near.clone(), before.clone(), base.clone()],
            SimilarityPolicy::default(),
        );
        let ids: Vec<_> = result.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![before.id, near.id]);
    }

    #[test]
    fn test_results_are_capped_and_same_category() {
        let base = event_at("A", "2024-06-01T10:00:00Z", 40.0, -74.0);
        let mut candidates: Vec<Event> = (0..8)
            .map(|i| event_at("X", &format!("2024-06-0{}T10:00:00Z", i + 1), 40.0, -74.0))
            .collect();
        let mut workshop = event_at("W", "2024-06-01T11:00:00Z", 40.0, -74.0);
        workshop.category = EventCategory::Workshop;
        candidates.push(workshop.clone());

        let result = rank_similar(&base, candidates, SimilarityPolicy::default());
        assert_eq!(result.len(), MAX_SIMILAR_EVENTS);
        assert!(result.iter().all(|e| e.category == base.category));
        assert!(result.iter().all(|e| e.id != workshop.id));
    }

    #[test]
    fn test_spatial_policy_orders_by_distance() {
        let base = event_at("A", "2024-06-01T10:00:00Z", 40.0, -74.0);
        let close = event_at("B", "2024-09-01T10:00:00Z", 40.01, -74.0);
        let closer = event_at("C", "2024-12-01T10:00:00Z", 40.001, -74.0);
        let distant = event_at("D", "2024-06-02T10:00:00Z", 41.0, -74.0);

        let result = rank_similar(
            &base,
            vec![close.clone(), distant, closer.clone()],
            SimilarityPolicy::Spatial { radius_km: 10.0 },
        );
        let ids: Vec<_> = result.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![closer.id, close.id]);
    }

    #[test]
    fn test_spatial_policy_falls_back_to_date_order() {
        let base = event_at("A", "2024-06-01T10:00:00Z", 40.0, -74.0);
        let later = event_at("B", "2024-08-01T10:00:00Z", 10.0, 10.0);
        let earlier = event_at("C", "2024-07-01T10:00:00Z", -10.0, 100.0);

        let result = rank_similar(
            &base,
            vec![later.clone(), earlier.clone()],
            SimilarityPolicy::Spatial { radius_km: 10.0 },
        );
        let ids: Vec<_> = result.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![earlier.id, later.id]);
    }
}
