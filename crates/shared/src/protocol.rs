use serde::{Deserialize, Serialize};

use crate::domain::ProductId;

/// Upper bound the backend accepts for a single add-to-cart request.
pub const MAX_ADD_QUANTITY: u32 = 999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl AddToCartRequest {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl CheckoutResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            errors: (!errors.is_empty()).then_some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn add_to_cart_request_uses_camel_case() {
        let id = ProductId(Uuid::nil());
        let json = serde_json::to_value(AddToCartRequest::new(id, 4)).expect("json");
        assert_eq!(json["productId"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["quantity"], 4);
    }

    #[test]
    fn add_to_cart_request_defaults_quantity_to_one() {
        let req: AddToCartRequest =
            serde_json::from_str(r#"{"productId":"00000000-0000-0000-0000-000000000000"}"#)
                .expect("request");
        assert_eq!(req.quantity, 1);
    }

    #[test]
    fn decodes_refused_checkout_body() {
        let result: CheckoutResult = serde_json::from_str(
            r#"{"success":false,"message":"Checkout failed due to stock issues","errors":["Widget: only 1 left"]}"#,
        )
        .expect("checkout result");
        assert!(!result.success);
        assert_eq!(result.errors.as_deref(), Some(&["Widget: only 1 left".to_string()][..]));
    }

    #[test]
    fn error_body_is_not_a_checkout_result() {
        let decoded = serde_json::from_str::<CheckoutResult>(
            r#"{"status":404,"message":"Cart not found","details":null}"#,
        );
        assert!(decoded.is_err());
    }

    #[test]
    fn failure_without_errors_omits_list() {
        let result = CheckoutResult::failure("cart empty", Vec::new());
        assert!(!result.success);
        assert!(result.errors.is_none());
    }
}
