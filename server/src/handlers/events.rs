use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::event::{Event, EventCategory, EventFilter, SortDirection};
use crate::models::payload::{
    CreateEventRequest, FieldError, UpdateEventRequest, ValidationFailure,
};
use crate::service::EventService;
use crate::utils::error::AppError;
use crate::utils::extract::{JsonPayload, QueryParams};
use crate::utils::response::created;

#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
}

/// Raw list parameters as sent by the client.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
    pub sort_direction: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum DayBound {
    Start,
    End,
}

/// Accepts an RFC 3339 instant or a bare `YYYY-MM-DD` date. A bare date
/// covers the whole day, so it expands to its first or last instant.
fn parse_date_param(raw: &str, bound: DayBound) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let naive = match bound {
        DayBound::Start => day.and_hms_opt(0, 0, 0)?,
        DayBound::End => day.and_hms_nano_opt(23, 59, 59, 999_999_999)?,
    };
    Some(Utc.from_utc_datetime(&naive))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Blank searches are dropped but a real one is matched verbatim.
fn search_term(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ListEventsQuery {
    pub fn into_filter(self) -> Result<EventFilter, ValidationFailure> {
        let mut errors = Vec::new();
        let mut filter = EventFilter {
            search: search_term(self.search),
            ..Default::default()
        };

        if let Some(raw) = non_empty(self.category) {
            match EventCategory::from_str(&raw) {
                Ok(category) => filter.category = Some(category),
                Err(_) => errors.push(FieldError::new("category", "Invalid category selected")),
            }
        }
        if let Some(raw) = non_empty(self.start_date) {
            match parse_date_param(&raw, DayBound::Start) {
                Some(date) => filter.start_date = Some(date),
                None => errors.push(FieldError::new("startDate", "Invalid date")),
            }
        }
        if let Some(raw) = non_empty(self.end_date) {
            match parse_date_param(&raw, DayBound::End) {
                Some(date) => filter.end_date = Some(date),
                None => errors.push(FieldError::new("endDate", "Invalid date")),
            }
        }
        if let Some(raw) = non_empty(self.sort_direction) {
            match SortDirection::from_str(&raw) {
                Ok(direction) => filter.sort_direction = direction,
                Err(_) => errors.push(FieldError::new(
                    "sortDirection",
                    "Sort direction must be ASC or DESC",
                )),
            }
        }

        if errors.is_empty() {
            Ok(filter)
        } else {
            Err(ValidationFailure::new(errors))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedEvent {
    pub id: Uuid,
}

pub async fn create_event(
    State(state): State<AppState>,
    JsonPayload(input): JsonPayload<CreateEventRequest>,
) -> Result<Response, AppError> {
    let event = state.events.create(input).await?;
    Ok(created(event))
}

pub async fn list_events(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListEventsQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let filter = query.into_filter().map_err(AppError::ValidationError)?;
    let events = state.events.find_all(filter).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let event = state.events.find_one(&id).await?;
    Ok(Json(event))
}

pub async fn similar_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = state.events.find_similar(&id).await?;
    Ok(Json(events))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonPayload(input): JsonPayload<UpdateEventRequest>,
) -> Result<Json<Event>, AppError> {
    let event = state.events.update(&id, input).await?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedEvent>, AppError> {
    let id = state.events.remove(&id).await?;
    Ok(Json(DeletedEvent { id }))
}
