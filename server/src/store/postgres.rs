use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{EventStore, StoreResult};
use crate::models::event::{Event, EventCategory, EventChanges, EventFilter, Location, NewEvent};

const EVENT_COLUMNS: &str =
    "id, title, description, date, location, category, created_at, updated_at";

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    date: DateTime<Utc>,
    location: Json<Location>,
    category: EventCategory,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            date: row.date,
            location: row.location.0,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_condition(qb: &mut QueryBuilder<'_, Postgres>, has_where: &mut bool) {
    if *has_where {
        qb.push(" AND ");
    } else {
        qb.push(" WHERE ");
        *has_where = true;
    }
}

/// Builds the parameterized list query for `filter`.
fn list_query(filter: &EventFilter) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM events", EVENT_COLUMNS));
    let mut has_where = false;

    if let Some(category) = filter.category {
        push_condition(&mut qb, &mut has_where);
        qb.push("category = ").push_bind(category);
    }
    if let Some(start) = filter.start_date {
        push_condition(&mut qb, &mut has_where);
        qb.push("date >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        push_condition(&mut qb, &mut has_where);
        qb.push("date <= ").push_bind(end);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        push_condition(&mut qb, &mut has_where);
        qb.push("(title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY date ")
        .push(filter.sort_direction.as_sql())
        .push(", created_at ASC, id ASC");
    qb
}

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create(&self, input: NewEvent) -> StoreResult<Event> {
        let event = Event::new(input);
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (id, title, description, date, location, category, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(Json(&event.location))
        .bind(event.category)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(event_id = %row.id, "Created event");
        Ok(row.into())
    }

    async fn find_one(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Event::from))
    }

    async fn find_all(&self, filter: &EventFilter) -> StoreResult<Vec<Event>> {
        let mut qb = list_query(filter);
        let rows = qb
            .build_query_as::<EventRow>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = rows.len(), "Listed events");
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn find_by_category(
        &self,
        category: EventCategory,
        exclude: Uuid,
    ) -> StoreResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE category = $1 AND id <> $2 ORDER BY date ASC, created_at ASC, id ASC",
            EVENT_COLUMNS
        ))
        .bind(category)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn update(&self, id: Uuid, changes: EventChanges) -> StoreResult<Option<Event>> {
        // Merged in one statement; there is no read-modify-write window.
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                date = COALESCE($4, date),
                location = location || $5,
                category = COALESCE($6, category),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.date)
        .bind(Json(changes.location.to_json()))
        .bind(changes.category)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            tracing::info!(event_id = %id, "Updated event");
        }
        Ok(row.map(Event::from))
    }

    async fn remove(&self, id: Uuid) -> StoreResult<Option<Uuid>> {
        let removed: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM events WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        if removed.is_some() {
            tracing::info!(event_id = %id, "Deleted event");
        }
        Ok(removed)
    }
}
