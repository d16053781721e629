//! Product catalog: entities, unit price lookup and the catalog service.

mod lookup;
mod model;
mod service;

pub use lookup::{CatalogLookup, UnitPricing};
pub use model::{
    CUSTOM_IMAGE_SURCHARGE, CUSTOM_TEXT_SURCHARGE, CUSTOMIZATION_BASE_PRICE, Customization,
    CustomizationChanges, MAX_CUSTOMIZATION_QUANTITY, NewCustomization, NewProduct,
    PREMIUM_COLOR_SURCHARGE, Product, ProductCategory, ProductChanges, customization_price,
};
pub use service::CatalogService;
