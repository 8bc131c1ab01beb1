use async_trait::async_trait;
use uuid::Uuid;

use crate::models::event::{Event, EventCategory, EventChanges, EventFilter, NewEvent};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryEventStore;
pub use postgres::PgEventStore;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Persistence for event records.
///
/// Absence is reported as `None` rather than an error so the service layer
/// decides how a missing id surfaces to callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Assigns an id and audit timestamps, then persists the event.
    async fn create(&self, input: NewEvent) -> StoreResult<Event>;

    async fn find_one(&self, id: Uuid) -> StoreResult<Option<Event>>;

    /// Events matching every set filter field, ordered by date in the
    /// filter's direction.
    async fn find_all(&self, filter: &EventFilter) -> StoreResult<Vec<Event>>;

    /// Same-category events other than `exclude`, ordered by date ascending.
    async fn find_by_category(
        &self,
        category: EventCategory,
        exclude: Uuid,
    ) -> StoreResult<Vec<Event>>;

    /// Merges `changes` onto the stored event and refreshes `updated_at`.
    async fn update(&self, id: Uuid, changes: EventChanges) -> StoreResult<Option<Event>>;

    async fn remove(&self, id: Uuid) -> StoreResult<Option<Uuid>>;
}
