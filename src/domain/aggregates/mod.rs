//! Aggregates module
pub mod product;
pub mod category;
pub mod content;
pub mod admin_user;

pub use product::{
    Product, ProductDetails, ProductInput, ProductOption, ProductOptionInput, ProductOptionValue,
    ProductOptionValueInput, ProductVariant, ProductVariantInput,
};
pub use category::{Category, CategoryInput};
pub use content::{
    settings_map, Banner, BannerInput, Link, LinkInput, PopularSearch, PopularSearchInput, Setting,
    SettingValue, SettingsUpdate,
};
pub use admin_user::{AdminProfile, AdminRole, AdminUser, LoginInput};
