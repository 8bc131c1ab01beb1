//! Request payloads and their validation into domain values.
//!
//! Validation collects every violated field rather than stopping at the
//! first one, so clients can highlight all invalid form inputs at once.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::models::event::{EventCategory, EventChanges, Location, LocationPatch, NewEvent};

/// A single violated constraint, addressed by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn new(mut errors: Vec<FieldError>) -> Self {
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.errors.iter().map(|e| e.field.as_str()).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errors: ValidationErrors) -> Self {
        let mut collected = Vec::new();
        flatten_errors("", &errors, &mut collected);
        Self::new(collected)
    }
}

fn flatten_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = format!("{}{}", prefix, field);
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                flatten_errors(&format!("{}.", path), nested, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten_errors(&format!("{}[{}].", path, index), nested, out);
                }
            }
        }
    }
}

fn validate_datetime(value: &str) -> Result<(), ValidationError> {
    DateTime::parse_from_rfc3339(value).map(|_| ()).map_err(|_| {
        ValidationError::new("datetime")
            .with_message("Invalid date format. Please use a valid ISO datetime".into())
    })
}

fn validate_category(value: &str) -> Result<(), ValidationError> {
    EventCategory::from_str(value).map(|_| ()).map_err(|_| {
        ValidationError::new("category").with_message("Invalid category selected".into())
    })
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Presence is checked by `validate`, so a missing or `null` field is
/// reported by name alongside every other violation.
fn present<T>(value: Option<T>, field: &str) -> Result<T, ValidationFailure> {
    value.ok_or_else(|| ValidationFailure::single(field, format!("{} is required", field)))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LocationInput {
    #[validate(
        required(message = "Address is required"),
        length(min = 1, message = "Address is required")
    )]
    pub address: Option<String>,
    #[validate(
        required(message = "Latitude is required"),
        range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90")
    )]
    pub latitude: Option<f64>,
    #[validate(
        required(message = "Longitude is required"),
        range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180")
    )]
    pub longitude: Option<f64>,
}

/// Body of `POST /events`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 3, max = 100, message = "Title must be between 3 and 100 characters long")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Description is required"),
        length(
            min = 10,
            max = 1000,
            message = "Description must be between 10 and 1000 characters long"
        )
    )]
    pub description: Option<String>,
    #[validate(
        required(message = "Date is required"),
        custom(function = "validate_datetime")
    )]
    pub date: Option<String>,
    #[validate(required(message = "Location is required"), nested)]
    pub location: Option<LocationInput>,
    #[validate(
        required(message = "Category is required"),
        custom(function = "validate_category")
    )]
    pub category: Option<String>,
}

impl CreateEventRequest {
    pub fn into_new_event(self) -> Result<NewEvent, ValidationFailure> {
        self.validate()?;

        let raw_date = present(self.date, "date")?;
        let date = parse_datetime(&raw_date).ok_or_else(|| {
            ValidationFailure::single("date", "Invalid date format. Please use a valid ISO datetime")
        })?;
        let raw_category = present(self.category, "category")?;
        let category = EventCategory::from_str(&raw_category)
            .map_err(|_| ValidationFailure::single("category", "Invalid category selected"))?;
        let location = present(self.location, "location")?;

        Ok(NewEvent {
            title: present(self.title, "title")?,
            description: present(self.description, "description")?,
            date,
            location: Location {
                address: present(location.address, "location.address")?,
                latitude: present(location.latitude, "location.latitude")?,
                longitude: present(location.longitude, "location.longitude")?,
            },
            category,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LocationUpdate {
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: Option<f64>,
}

/// Body of `PATCH /events/:id`. Any field present must satisfy the same
/// constraints as on creation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 3, max = 100, message = "Title must be between 3 and 100 characters long"))]
    pub title: Option<String>,
    #[validate(length(
        min = 10,
        max = 1000,
        message = "Description must be between 10 and 1000 characters long"
    ))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_datetime"))]
    pub date: Option<String>,
    #[validate(nested)]
    pub location: Option<LocationUpdate>,
    #[validate(custom(function = "validate_category"))]
    pub category: Option<String>,
}

impl UpdateEventRequest {
    pub fn into_changes(self) -> Result<EventChanges, ValidationFailure> {
        self.validate()?;

        let date = match self.date.as_deref() {
            Some(raw) => Some(parse_datetime(raw).ok_or_else(|| {
                ValidationFailure::single(
                    "date",
                    "Invalid date format. Please use a valid ISO datetime",
                )
            })?),
            None => None,
        };
        let category = match self.category.as_deref() {
            Some(raw) => Some(
                EventCategory::from_str(raw)
                    .map_err(|_| ValidationFailure::single("category", "Invalid category selected"))?,
            ),
            None => None,
        };
        let location = self
            .location
            .map(|l| LocationPatch {
                address: l.address,
                latitude: l.latitude,
                longitude: l.longitude,
            })
            .unwrap_or_default();

        Ok(EventChanges {
            title: self.title,
            description: self.description,
            date,
            location,
            category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> serde_json::Value {
        json!({
            "title": "Tech Talk",
            "description": "A talk about systems design topics",
            "date": "2024-06-01T10:00:00.000Z",
            "location": { "address": "1 Main St", "latitude": 40.0, "longitude": -74.0 },
            "category": "MEETUP"
        })
    }

    fn create_from(body: serde_json::Value) -> Result<NewEvent, ValidationFailure> {
        serde_json::from_value::<CreateEventRequest>(body)
            .unwrap()
            .into_new_event()
    }

    #[test]
    fn test_valid_payload_is_normalized() {
        let event = create_from(valid_body()).unwrap();
        assert_eq!(event.title, "Tech Talk");
        assert_eq!(event.category, EventCategory::Meetup);
        assert_eq!(event.date.to_rfc3339(), "2024-06-01T10:00:00+00:00");
        assert_eq!(event.location.longitude, -74.0);
    }

    #[test]
    fn test_short_title_is_rejected() {
        let mut body = valid_body();
        body["title"] = json!("ab");

        let failure = create_from(body).unwrap_err();
        assert_eq!(failure.errors.len(), 1);
        assert_eq!(failure.errors[0].field, "title");
        assert_eq!(
            failure.errors[0].message,
            "Title must be between 3 and 100 characters long"
        );
    }

    #[test]
    fn test_title_length_counts_characters() {
        let mut body = valid_body();
        body["title"] = json!("ééé");
        assert!(create_from(body).is_ok());
    }

    #[test]
    fn test_every_violated_field_is_reported() {
        let body = json!({
            "title": "ab",
            "description": "short",
            "date": "next tuesday",
            "location": { "address": "", "latitude": 91.0, "longitude": -181.0 },
            "category": "PARTY"
        });

        let failure = create_from(body).unwrap_err();
        let fields: Vec<&str> = failure.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "category",
                "date",
                "description",
                "location.address",
                "location.latitude",
                "location.longitude",
                "title",
            ]
        );
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let failure = create_from(json!({})).unwrap_err();
        let fields: Vec<&str> = failure.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["category", "date", "description", "location", "title"]
        );
        assert_eq!(failure.errors[4].message, "Title is required");
    }

    #[test]
    fn test_null_and_missing_location_parts_name_the_sub_field() {
        let mut body = valid_body();
        body["title"] = serde_json::Value::Null;
        body["location"] = json!({ "address": "1 Main St", "latitude": null });

        let failure = create_from(body).unwrap_err();
        let fields: Vec<&str> = failure.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["location.latitude", "location.longitude", "title"]
        );
        assert_eq!(failure.errors[0].message, "Latitude is required");
    }

    #[test]
    fn test_boundary_coordinates_are_accepted() {
        let mut body = valid_body();
        body["location"] = json!({ "address": "Pole", "latitude": -90.0, "longitude": 180.0 });
        assert!(create_from(body).is_ok());
    }

    #[test]
    fn test_empty_update_is_valid() {
        let changes = UpdateEventRequest::default().into_changes().unwrap();
        assert_eq!(changes, EventChanges::default());
    }

    #[test]
    fn test_update_validates_present_fields_only() {
        let request: UpdateEventRequest = serde_json::from_value(json!({
            "title": "no",
            "location": { "latitude": 100.0 }
        }))
        .unwrap();

        let failure = request.into_changes().unwrap_err();
        assert!(failure.has_field("title"));
        assert!(failure.has_field("location.latitude"));
        assert!(!failure.has_field("description"));
    }

    #[test]
    fn test_update_location_patch_is_partial() {
        let request: UpdateEventRequest = serde_json::from_value(json!({
            "location": { "address": "2 Side St" },
            "category": "WORKSHOP"
        }))
        .unwrap();

        let changes = request.into_changes().unwrap();
        assert_eq!(changes.location.address.as_deref(), Some("2 Side St"));
        assert!(changes.location.latitude.is_none());
        assert_eq!(changes.category, Some(EventCategory::Workshop));
    }
}
