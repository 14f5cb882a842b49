//! Product-page and storefront presentation logic.
pub mod resolver;
pub mod ui_state;

pub use resolver::{
    DisplayImage, ImageSource, MatchRule, OptionChoice, PriceDisplay, ResolvedView, Selection, SelectionState,
    ValueChoice, VariantResolver, PLACEHOLDER_IMAGE, PRICE_ON_REQUEST,
};
pub use ui_state::UiState;
