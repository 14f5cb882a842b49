//! Catalog services: public reads, back-office writes, accounts, static assets.
pub mod accounts;
pub mod admin;
pub mod events;
pub mod logos;
pub mod query;
pub mod seed;

pub use accounts::AccountService;
pub use admin::CatalogAdmin;
pub use events::EventSink;
pub use logos::LogoLibrary;
pub use query::CatalogQuery;
pub use seed::{seed_defaults, SeedAdmin, SeedReport};
