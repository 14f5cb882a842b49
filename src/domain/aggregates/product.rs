//! Product Aggregate
//!
//! A product owns an ordered list of options (each with ordered values) and a
//! list of variants. Children are always written as a whole: an update
//! replaces the full option/value/variant subtree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::category::Category;
use crate::domain::value_objects::{Price, ProductCode, SelectionKey};

/// Option names whose values render as colour swatches.
const COLOR_OPTION_NAMES: [&str; 2] = ["цвет", "color"];

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub code: ProductCode,
    pub name: String,
    pub description: Option<String>,
    pub main_image: Option<String>,
    pub category_id: Option<Uuid>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductOptionValue {
    pub id: Uuid,
    pub option_id: Uuid,
    pub value: String,
    pub color_code: Option<String>,
    pub image: Option<String>,
    pub sort_order: i32,
}

impl ProductOptionValue {
    /// The representative image, if one is set and non-blank.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub values: Vec<ProductOptionValue>,
}

impl ProductOption {
    pub fn value(&self, id: &Uuid) -> Option<&ProductOptionValue> {
        self.values.iter().find(|v| &v.id == id)
    }

    pub fn first_value(&self) -> Option<&ProductOptionValue> { self.values.first() }

    pub fn is_color(&self) -> bool {
        let name = self.name.trim().to_lowercase();
        COLOR_OPTION_NAMES.contains(&name.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub option_values: SelectionKey,
    pub price: Price,
    pub old_price: Option<Price>,
    pub in_stock: bool,
}

/// A product together with its category and full option/variant tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub options: Vec<ProductOption>,
    pub variants: Vec<ProductVariant>,
}

impl ProductDetails {
    pub fn id(&self) -> Uuid { self.product.id }
    pub fn is_active(&self) -> bool { self.product.active }

    /// Lowest variant price, shown on product cards.
    pub fn min_price(&self) -> Option<Price> {
        self.variants.iter().map(|v| v.price).min()
    }

    /// Orders options and values by sort order; equal keys keep insertion order.
    pub fn sort_children(&mut self) {
        self.options.sort_by_key(|o| o.sort_order);
        for option in &mut self.options {
            option.values.sort_by_key(|v| v.sort_order);
        }
    }
}

fn default_true() -> bool { true }

/// Admin payload for creating or fully replacing a product.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200, message = "Product name is required (max 200 characters)"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    #[validate]
    pub options: Vec<ProductOptionInput>,
    #[serde(default)]
    #[validate]
    pub variants: Vec<ProductVariantInput>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductOptionInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "Option name is required"))]
    pub name: String,
    /// Defaults to the option's position in the payload.
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    #[validate]
    pub values: Vec<ProductOptionValueInput>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductOptionValueInput {
    /// Kept on recreation so clients can hold on to value ids across edits.
    #[serde(default)]
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "Option value is required"))]
    pub value: String,
    #[serde(default)]
    pub color_code: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariantInput {
    /// Value ids from this payload, or value labels unique within the product.
    #[serde(default)]
    pub option_values: Vec<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "Old price cannot be negative"))]
    pub old_price: Option<i64>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
}
