//! Catalog domain: entities, value objects, events.
pub mod aggregates;
pub mod events;
pub mod value_objects;
