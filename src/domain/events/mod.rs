//! Catalog events emitted by back-office mutations.
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::ProductCode;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum CatalogEvent {
    Product(ProductEvent),
    Category(EntityEvent),
    Banner(EntityEvent),
    Link(EntityEvent),
    PopularSearch(EntityEvent),
    Settings { keys: Vec<String> },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid, code: ProductCode },
    Replaced { product_id: Uuid },
    Deleted { product_id: Uuid },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EntityEvent {
    Created { id: Uuid },
    Updated { id: Uuid },
    Deleted { id: Uuid },
}

impl EntityEvent {
    fn action(&self) -> &'static str {
        match self { Self::Created { .. } => "created", Self::Updated { .. } => "updated", Self::Deleted { .. } => "deleted" }
    }
}

impl CatalogEvent {
    /// Subject the event is published on, `catalog.<entity>.<action>`.
    pub fn subject(&self) -> String {
        let (entity, action) = match self {
            Self::Product(e) => ("product", match e {
                ProductEvent::Created { .. } => "created",
                ProductEvent::Replaced { .. } => "updated",
                ProductEvent::Deleted { .. } => "deleted",
            }),
            Self::Category(e) => ("category", e.action()),
            Self::Banner(e) => ("banner", e.action()),
            Self::Link(e) => ("link", e.action()),
            Self::PopularSearch(e) => ("popular_search", e.action()),
            Self::Settings { .. } => ("settings", "updated"),
        };
        format!("catalog.{entity}.{action}")
    }
}
