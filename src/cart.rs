//! Session-scoped cart aggregate.
//!
//! A [`Cart`] is a plain value: it is loaded from the session store, handed
//! to the mutation functions in [`crate::services::cart_service`] and saved
//! back as a whole. `subtotal` and `total_items` are maintained
//! incrementally and always agree with `items`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Scale used for every monetary amount held in a cart.
pub const MONEY_SCALE: u32 = 2;

/// Normalizes an amount to two decimal places.
pub fn money(amount: Decimal) -> Decimal {
    let mut amount = amount.round_dp(MONEY_SCALE);
    amount.rescale(MONEY_SCALE);
    amount
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: i32,
    pub name: String,
    pub qty: i32,
    /// Catalog price at the moment the product was first added.
    #[schema(value_type = String, example = "9.99")]
    pub unit_price: Decimal,
    #[schema(value_type = String, example = "19.98")]
    pub total_price: Decimal,
    pub image_url: Option<String>,
}

impl CartLine {
    pub(crate) fn recompute_total(&mut self) {
        self.total_price = money(Decimal::from(self.qty) * self.unit_price);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    #[schema(value_type = Object)]
    pub items: BTreeMap<i32, CartLine>,
    #[schema(value_type = String, example = "0.00")]
    pub subtotal: Decimal,
    pub total_items: i32,
}

impl Cart {
    /// An empty cart: no lines, `0.00` subtotal.
    pub fn init() -> Self {
        Self {
            items: BTreeMap::new(),
            subtotal: money(Decimal::ZERO),
            total_items: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }

    pub fn line(&self, product_id: i32) -> Option<&CartLine> {
        self.items.get(&product_id)
    }

    /// True when the cached totals match the lines exactly.
    pub fn is_consistent(&self) -> bool {
        let qty: i32 = self.items.values().map(|line| line.qty).sum();
        let subtotal: Decimal = self.items.values().map(|line| line.total_price).sum();
        qty == self.total_items
            && subtotal == self.subtotal
            && self
                .items
                .iter()
                .all(|(id, line)| *id == line.product_id && line.qty >= 1)
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::init()
    }
}
