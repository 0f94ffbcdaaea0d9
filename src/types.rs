//! Core record types

use serde::{Deserialize, Serialize};

/// One extracted product
///
/// Field order is the JSON key order of the data file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product name
    pub title: String,
    /// Price as displayed on the page (currency formatting untouched)
    pub price: String,
    /// Brand name
    pub brand: String,
    /// Absolute image URL
    pub image: String,
}

impl ProductRecord {
    /// Convenience constructor
    pub fn new(
        title: impl Into<String>,
        price: impl Into<String>,
        brand: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
            brand: brand.into(),
            image: image.into(),
        }
    }
}
