//! Catalog entities: products and the customizations that decorate them.

use chrono::{DateTime, Utc};
use common::{CustomizationId, Money, ProductId};
use serde::{Deserialize, Serialize};

/// Flat fee every customization starts from.
pub const CUSTOMIZATION_BASE_PRICE: Money = Money::from_cents(500);
/// Surcharge for a non-blank custom text.
pub const CUSTOM_TEXT_SURCHARGE: Money = Money::from_cents(250);
/// Surcharge for a custom image.
pub const CUSTOM_IMAGE_SURCHARGE: Money = Money::from_cents(300);
/// Surcharge for the black and white color variants.
pub const PREMIUM_COLOR_SURCHARGE: Money = Money::from_cents(50);

/// Product line of the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    #[default]
    TShirts,
    Mugs,
    Notebooks,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::TShirts => "t_shirts",
            ProductCategory::Mugs => "mugs",
            ProductCategory::Notebooks => "notebooks",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A sellable catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub base_price: Money,
    pub category: ProductCategory,
    pub image_url: String,
    /// Inactive products are invisible to pricing.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Money,
    #[serde(default)]
    pub category: ProductCategory,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update of a product. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_price: Option<Money>,
    #[serde(default)]
    pub category: Option<ProductCategory>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Product {
    /// Builds a product with a fresh ID.
    pub fn new(input: NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id: ProductId::new(),
            name: input.name,
            description: input.description,
            base_price: input.base_price,
            category: input.category,
            image_url: input.image_url,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a new value with `changes` overlaid.
    ///
    /// Orders already placed keep the prices they were priced with.
    pub fn with_changes(&self, changes: ProductChanges, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        if let Some(name) = changes.name {
            next.name = name;
        }
        if let Some(description) = changes.description {
            next.description = description;
        }
        if let Some(base_price) = changes.base_price {
            next.base_price = base_price;
        }
        if let Some(category) = changes.category {
            next.category = category;
        }
        if let Some(image_url) = changes.image_url {
            next.image_url = image_url;
        }
        if let Some(is_active) = changes.is_active {
            next.is_active = is_active;
        }
        next.updated_at = now;
        next
    }
}

/// Largest customization quantity the catalog stores.
pub const MAX_CUSTOMIZATION_QUANTITY: u32 = i32::MAX as u32;

/// A customization (color, text, image) applied to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customization {
    pub id: CustomizationId,
    pub product_id: ProductId,
    pub color: String,
    pub custom_text: Option<String>,
    pub custom_image_url: Option<String>,
    pub quantity: u32,
    /// Derived from the fields above; see [`customization_price`].
    pub customization_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a customization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomization {
    pub product_id: ProductId,
    pub color: String,
    #[serde(default)]
    pub custom_text: Option<String>,
    #[serde(default)]
    pub custom_image_url: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Partial update of a customization. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomizationChanges {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub custom_text: Option<String>,
    #[serde(default)]
    pub custom_image_url: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl CustomizationChanges {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.custom_text.is_none()
            && self.custom_image_url.is_none()
            && self.quantity.is_none()
    }
}

impl Customization {
    /// Builds a customization with a fresh ID and derived price.
    pub fn new(input: NewCustomization, now: DateTime<Utc>) -> Self {
        let customization_price = customization_price(
            &input.color,
            input.custom_text.as_deref(),
            input.custom_image_url.as_deref(),
        );
        Self {
            id: CustomizationId::new(),
            product_id: input.product_id,
            color: input.color,
            custom_text: input.custom_text,
            custom_image_url: input.custom_image_url,
            quantity: input.quantity,
            customization_price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a new value with `changes` overlaid and the price recomputed.
    ///
    /// `self` is left untouched.
    pub fn with_changes(&self, changes: CustomizationChanges, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        if let Some(color) = changes.color {
            next.color = color;
        }
        if let Some(text) = changes.custom_text {
            next.custom_text = Some(text);
        }
        if let Some(url) = changes.custom_image_url {
            next.custom_image_url = Some(url);
        }
        if let Some(quantity) = changes.quantity {
            next.quantity = quantity;
        }
        next.customization_price = customization_price(
            &next.color,
            next.custom_text.as_deref(),
            next.custom_image_url.as_deref(),
        );
        next.updated_at = now;
        next
    }
}

/// Derives the price of a customization from its features.
pub fn customization_price(
    color: &str,
    custom_text: Option<&str>,
    custom_image_url: Option<&str>,
) -> Money {
    let mut price = CUSTOMIZATION_BASE_PRICE;

    if custom_text.is_some_and(|text| !text.trim().is_empty()) {
        price += CUSTOM_TEXT_SURCHARGE;
    }

    if custom_image_url.is_some_and(|url| !url.is_empty()) {
        price += CUSTOM_IMAGE_SURCHARGE;
    }

    if color == "black" || color == "white" {
        price += PREMIUM_COLOR_SURCHARGE;
    }

    price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_price_only() {
        assert_eq!(customization_price("red", None, None), Money::from_cents(500));
    }

    #[test]
    fn black_with_text_no_image() {
        assert_eq!(
            customization_price("black", Some("Hi"), None),
            Money::from_cents(800)
        );
    }

    #[test]
    fn every_surcharge() {
        assert_eq!(
            customization_price("white", Some("Hello"), Some("https://img/1.png")),
            Money::from_cents(1100)
        );
    }

    #[test]
    fn blank_text_and_empty_url_are_free() {
        assert_eq!(
            customization_price("blue", Some("   "), Some("")),
            Money::from_cents(500)
        );
    }

    #[test]
    fn color_match_is_exact() {
        assert_eq!(customization_price("Black", None, None), Money::from_cents(500));
    }

    #[test]
    fn with_changes_recomputes_price_without_touching_original() {
        let now = Utc::now();
        let original = Customization::new(
            NewCustomization {
                product_id: ProductId::new(),
                color: "red".to_string(),
                custom_text: None,
                custom_image_url: None,
                quantity: 1,
            },
            now,
        );

        let updated = original.with_changes(
            CustomizationChanges {
                color: Some("black".to_string()),
                custom_text: Some("Hi".to_string()),
                ..Default::default()
            },
            now,
        );

        assert_eq!(original.customization_price, Money::from_cents(500));
        assert_eq!(original.color, "red");
        assert_eq!(updated.customization_price, Money::from_cents(800));
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.quantity, 1);
    }

    #[test]
    fn quantity_only_change_keeps_price() {
        let now = Utc::now();
        let original = Customization::new(
            NewCustomization {
                product_id: ProductId::new(),
                color: "white".to_string(),
                custom_text: None,
                custom_image_url: Some("https://img/2.png".to_string()),
                quantity: 1,
            },
            now,
        );
        let updated = original.with_changes(
            CustomizationChanges {
                quantity: Some(4),
                ..Default::default()
            },
            now,
        );
        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.customization_price, original.customization_price);
    }

    #[test]
    fn product_changes_overlay_only_given_fields() {
        let created = Utc::now();
        let original = Product::new(
            NewProduct {
                name: "Mug".to_string(),
                description: "Ceramic".to_string(),
                base_price: Money::from_cents(1200),
                category: ProductCategory::Mugs,
                image_url: String::new(),
                is_active: true,
            },
            created,
        );

        let later = created + chrono::Duration::seconds(5);
        let updated = original.with_changes(
            ProductChanges {
                base_price: Some(Money::from_cents(1500)),
                is_active: Some(false),
                ..Default::default()
            },
            later,
        );

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.name, "Mug");
        assert_eq!(updated.category, ProductCategory::Mugs);
        assert_eq!(updated.base_price, Money::from_cents(1500));
        assert!(!updated.is_active);
        assert_eq!(updated.created_at, created);
        assert_eq!(updated.updated_at, later);
        assert!(original.is_active);
    }
}
