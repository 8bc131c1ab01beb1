use std::sync::Arc;
use uuid::Uuid;

use crate::models::event::{Event, EventFilter};
use crate::models::payload::{CreateEventRequest, UpdateEventRequest};
use crate::similarity::{rank_similar, SimilarityPolicy};
use crate::store::EventStore;

pub mod error;

pub use error::{EventError, EventResult};

/// Validates input, delegates to the store and ranks similar events.
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    similarity: SimilarityPolicy,
}

/// Ids that are not UUIDs cannot exist in the store, so they resolve to
/// `NotFound` like any other unknown id.
fn parse_id(id: &str) -> EventResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| EventError::NotFound(id.to_string()))
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, similarity: SimilarityPolicy) -> Self {
        Self { store, similarity }
    }

    pub async fn create(&self, input: CreateEventRequest) -> EventResult<Event> {
        let new_event = input.into_new_event()?;
        Ok(self.store.create(new_event).await?)
    }

    pub async fn find_one(&self, id: &str) -> EventResult<Event> {
        let uuid = parse_id(id)?;
        self.store
            .find_one(uuid)
            .await?
            .ok_or_else(|| EventError::NotFound(id.to_string()))
    }

    pub async fn find_all(&self, filter: EventFilter) -> EventResult<Vec<Event>> {
        Ok(self.store.find_all(&filter).await?)
    }

    pub async fn update(&self, id: &str, input: UpdateEventRequest) -> EventResult<Event> {
        let uuid = parse_id(id)?;
        let changes = input.into_changes()?;
        self.store
            .update(uuid, changes)
            .await?
            .ok_or_else(|| EventError::NotFound(id.to_string()))
    }

    pub async fn remove(&self, id: &str) -> EventResult<Uuid> {
        let uuid = parse_id(id)?;
        self.store
            .remove(uuid)
            .await?
            .ok_or_else(|| EventError::NotFound(id.to_string()))
    }

    /// Up to five same-category events near the given one, per the
    /// configured similarity policy.
    pub async fn find_similar(&self, id: &str) -> EventResult<Vec<Event>> {
        let base = self.find_one(id).await?;
        let candidates = self.store.find_by_category(base.category, base.id).await?;
        let similar = rank_similar(&base, candidates, self.similarity);

        tracing::debug!(event_id = %base.id, count = similar.len(), "Found similar events");
        Ok(similar)
    }
}
