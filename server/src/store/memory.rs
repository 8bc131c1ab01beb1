use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventStore, StoreResult};
use crate::models::event::{
    Event, EventCategory, EventChanges, EventFilter, NewEvent, SortDirection,
};

/// In-memory event store for tests and local development.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_date(a: &Event, b: &Event) -> std::cmp::Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create(&self, input: NewEvent) -> StoreResult<Event> {
        let event = Event::new(input);
        self.events.write().await.insert(event.id, event.clone());

        tracing::info!(event_id = %event.id, "Created event");
        Ok(event)
    }

    async fn find_one(&self, id: Uuid) -> StoreResult<Option<Event>> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn find_all(&self, filter: &EventFilter) -> StoreResult<Vec<Event>> {
        let events = self.events.read().await;
        let mut result: Vec<Event> = events
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();

        match filter.sort_direction {
            SortDirection::Asc => result.sort_by(by_date),
            SortDirection::Desc => {
                result.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| by_date(a, b)))
            }
        }
        Ok(result)
    }

    async fn find_by_category(
        &self,
        category: EventCategory,
        exclude: Uuid,
    ) -> StoreResult<Vec<Event>> {
        let events = self.events.read().await;
        let mut result: Vec<Event> = events
            .values()
            .filter(|e| e.category == category && e.id != exclude)
            .cloned()
            .collect();
        result.sort_by(by_date);
        Ok(result)
    }

    async fn update(&self, id: Uuid, changes: EventChanges) -> StoreResult<Option<Event>> {
        let mut events = self.events.write().await;
        let Some(event) = events.get_mut(&id) else {
            return Ok(None);
        };
        event.apply_changes(changes);

        tracing::info!(event_id = %id, "Updated event");
        Ok(Some(event.clone()))
    }

    async fn remove(&self, id: Uuid) -> StoreResult<Option<Uuid>> {
        let removed = self.events.write().await.remove(&id).map(|e| e.id);
        if removed.is_some() {
            tracing::info!(event_id = %id, "Deleted event");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::{Location, LocationPatch};
    use chrono::{DateTime, Utc};

    fn new_event(title: &str, date: &str, category: EventCategory) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: format!("{} description text", title),
            date: date.parse::<DateTime<Utc>>().unwrap(),
            location: Location {
                address: "1 Main St".to_string(),
                latitude: 40.0,
                longitude: -74.0,
            },
            category,
        }
    }

    #[tokio::test]
    async fn test_create_then_find_one() {
        let store = InMemoryEventStore::new();
        let input = new_event("Tech Talk", "2024-06-01T10:00:00Z", EventCategory::Meetup);

        let created = store.create(input.clone()).await.unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.find_one(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, input.title);
        assert_eq!(fetched.location, input.location);
    }

    #[tokio::test]
    async fn test_find_all_filters_are_conjunctive() {
        let store = InMemoryEventStore::new();
        store
            .create(new_event("Rust Conf", "2024-06-01T10:00:00Z", EventCategory::Conference))
            .await
            .unwrap();
        store
            .create(new_event("Rust Meetup", "2024-06-10T10:00:00Z", EventCategory::Meetup))
            .await
            .unwrap();
        store
            .create(new_event("Go Meetup", "2024-07-01T10:00:00Z", EventCategory::Meetup))
            .await
            .unwrap();

        let filter = EventFilter {
            category: Some(EventCategory::Meetup),
            search: Some("rust".to_string()),
            ..Default::default()
        };
        let events = store.find_all(&filter).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Rust Meetup");

        let filter = EventFilter {
            end_date: Some("2024-06-10T10:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        assert_eq!(store.find_all(&filter).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_all_sort_direction() {
        let store = InMemoryEventStore::new();
        for (title, date) in [
            ("Second", "2024-06-02T10:00:00Z"),
            ("First", "2024-06-01T10:00:00Z"),
            ("Third", "2024-06-03T10:00:00Z"),
        ] {
            store
                .create(new_event(title, date, EventCategory::Other))
                .await
                .unwrap();
        }

        let asc = store.find_all(&EventFilter::default()).await.unwrap();
        let titles: Vec<&str> = asc.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);

        let filter = EventFilter {
            sort_direction: SortDirection::Desc,
            ..Default::default()
        };
        let desc = store.find_all(&filter).await.unwrap();
        let titles: Vec<&str> = desc.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn test_update_merges_location_sub_fields() {
        let store = InMemoryEventStore::new();
        let created = store
            .create(new_event("Tech Talk", "2024-06-01T10:00:00Z", EventCategory::Meetup))
            .await
            .unwrap();

        let changes = EventChanges {
            location: LocationPatch {
                address: Some("2 Side St".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let updated = store.update(created.id, changes).await.unwrap().unwrap();

        assert_eq!(updated.location.address, "2 Side St");
        assert_eq!(updated.location.latitude, 40.0);
        assert_eq!(updated.location.longitude, -74.0);
        assert_eq!(updated.title, created.title);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_remove_missing_id() {
        let store = InMemoryEventStore::new();
        let id = Uuid::new_v4();

        assert!(store
            .update(id, EventChanges::default())
            .await
            .unwrap()
            .is_none());
        assert!(store.remove(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_category_excludes_base() {
        let store = InMemoryEventStore::new();
        let base = store
            .create(new_event("Base", "2024-06-01T10:00:00Z", EventCategory::Workshop))
            .await
            .unwrap();
        store
            .create(new_event("Other", "2024-06-02T10:00:00Z", EventCategory::Workshop))
            .await
            .unwrap();
        store
            .create(new_event("Elsewhere", "2024-06-02T10:00:00Z", EventCategory::Meetup))
            .await
            .unwrap();

        let candidates = store
            .find_by_category(EventCategory::Workshop, base.id)
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Other");
    }
}
