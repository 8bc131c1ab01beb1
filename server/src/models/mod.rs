pub mod event;
pub mod payload;

pub use event::{
    Event, EventCategory, EventChanges, EventFilter, Location, LocationPatch, NewEvent,
    SortDirection,
};
pub use payload::{CreateEventRequest, FieldError, UpdateEventRequest, ValidationFailure};
