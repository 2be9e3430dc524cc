use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::Cart;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: i32,
}

/// Requested cart adjustment. Anything unrecognised parses as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    Increase,
    Decrease,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    /// Required for `increase` and `decrease`, ignored otherwise.
    #[serde(default)]
    pub product_id: Option<i32>,
    #[serde(default)]
    pub action: CartAction,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartSummary {
    pub session_id: Uuid,
    pub cart: Cart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognised_or_missing_action_is_unknown() {
        let req: UpdateCartRequest =
            serde_json::from_str(r#"{"product_id": 1, "action": "explode"}"#).unwrap();
        assert_eq!(req.action, CartAction::Unknown);

        let req: UpdateCartRequest = serde_json::from_str(r#"{"product_id": 1}"#).unwrap();
        assert_eq!(req.action, CartAction::Unknown);

        let req: UpdateCartRequest =
            serde_json::from_str(r#"{"product_id": 1, "action": "decrease"}"#).unwrap();
        assert_eq!(req.action, CartAction::Decrease);
        assert_eq!(req.product_id, Some(1));
    }

    #[test]
    fn unknown_action_needs_no_product_id() {
        let req: UpdateCartRequest = serde_json::from_str(r#"{"action": "shuffle"}"#).unwrap();
        assert_eq!(req.action, CartAction::Unknown);
        assert_eq!(req.product_id, None);
    }
}
