use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "event_category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    Conference,
    Meetup,
    Workshop,
    Other,
}

/// Where an event takes place. Persisted as a single JSONB value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn apply(&mut self, patch: LocationPatch) {
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(latitude) = patch.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            self.longitude = longitude;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: Location,
    pub category: EventCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(input: NewEvent) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            date: input.date,
            location: input.location,
            category: input.category,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the supplied fields onto this event and refreshes `updated_at`.
    pub fn apply_changes(&mut self, changes: EventChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        self.location.apply(changes.location);
        if let Some(category) = changes.category {
            self.category = category;
        }
        self.updated_at = Utc::now();
    }
}

/// A validated event ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: Location,
    pub category: EventCategory,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPatch {
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationPatch {
    /// JSON object holding only the supplied sub-fields, for a JSONB merge.
    pub fn to_json(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        if let Some(address) = &self.address {
            fields.insert("address".to_string(), address.clone().into());
        }
        if let Some(latitude) = self.latitude {
            fields.insert("latitude".to_string(), latitude.into());
        }
        if let Some(longitude) = self.longitude {
            fields.insert("longitude".to_string(), longitude.into());
        }
        serde_json::Value::Object(fields)
    }
}

/// A validated partial update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: LocationPatch,
    pub category: Option<EventCategory>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    #[strum(serialize = "ASC")]
    Asc,
    #[strum(serialize = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Conjunctive list filter. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub category: Option<EventCategory>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub sort_direction: SortDirection,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(category) = self.category {
            if event.category != category {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if event.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if event.date > end {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !event.title.to_lowercase().contains(&needle)
                && !event.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}
