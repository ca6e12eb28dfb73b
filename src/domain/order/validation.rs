use super::errors::OrderError;
use super::value_objects::{Order, OrderDraft, OrderItem, OrderItemDraft};

// ============================================================================
// Order Schema Validation
// ============================================================================
//
// Rules:
// - orderId is non-empty
// - value is a number >= 0
// - creationDate is a valid date
// - items is non-empty
// - items[i].productId is an integer >= 0
// - items[i].quantity is an integer >= 1
// - items[i].price is a number >= 0
//
// Every violated field is reported, in field order.
//
// ============================================================================

pub fn validate(draft: &OrderDraft) -> Result<Order, OrderError> {
    let mut violations = Vec::new();

    if draft.order_id.trim().is_empty() {
        violations.push("orderId is required".to_string());
    }

    let value = non_negative(draft.value);
    if value.is_none() {
        violations.push("value must be a number >= 0".to_string());
    }

    if draft.creation_date.is_none() {
        violations.push("creationDate must be a valid date".to_string());
    }

    if draft.items.is_empty() {
        violations.push("items must contain at least one item".to_string());
    }

    let items: Vec<Option<OrderItem>> = draft
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_item(index, item, &mut violations))
        .collect();

    match (value, draft.creation_date, violations.is_empty()) {
        (Some(value), Some(creation_date), true) => Ok(Order {
            order_id: draft.order_id.clone(),
            value,
            creation_date,
            items: items.into_iter().flatten().collect(),
        }),
        _ => Err(OrderError::Validation(violations)),
    }
}

fn validate_item(
    index: usize,
    item: &OrderItemDraft,
    violations: &mut Vec<String>,
) -> Option<OrderItem> {
    let product_id = item.product_id.filter(|id| *id >= 0);
    if product_id.is_none() {
        violations.push(format!("items[{index}].productId must be an integer >= 0"));
    }

    let quantity = item
        .quantity
        .filter(|q| q.fract() == 0.0 && *q >= 1.0 && *q < i64::MAX as f64)
        .map(|q| q as i64);
    if quantity.is_none() {
        violations.push(format!("items[{index}].quantity must be an integer >= 1"));
    }

    let price = non_negative(item.price);
    if price.is_none() {
        violations.push(format!("items[{index}].price must be a number >= 0"));
    }

    Some(OrderItem {
        product_id: product_id?,
        quantity: quantity?,
        price: price?,
    })
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn valid_item() -> OrderItemDraft {
        OrderItemDraft {
            product_id: Some(7),
            quantity: Some(2.0),
            price: Some(5.25),
        }
    }

    fn valid_draft() -> OrderDraft {
        OrderDraft {
            order_id: "P1".to_string(),
            value: Some(10.5),
            creation_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            items: vec![valid_item()],
        }
    }

    fn violations(draft: &OrderDraft) -> Vec<String> {
        match validate(draft) {
            Err(OrderError::Validation(messages)) => messages,
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_draft_becomes_order() {
        let order = validate(&valid_draft()).unwrap();

        assert_eq!(order.order_id, "P1");
        assert_eq!(order.value, 10.5);
        assert_eq!(
            order.items,
            vec![OrderItem {
                product_id: 7,
                quantity: 2,
                price: 5.25
            }]
        );
    }

    #[test]
    fn test_zero_value_and_price_are_allowed() {
        let mut draft = valid_draft();
        draft.value = Some(0.0);
        draft.items[0].price = Some(0.0);
        draft.items[0].product_id = Some(0);

        assert!(validate(&draft).is_ok());
    }

    #[test]
    fn test_reports_every_violation() {
        let draft = OrderDraft {
            order_id: "P1".to_string(),
            value: Some(-1.0),
            creation_date: None,
            items: vec![
                valid_item(),
                OrderItemDraft {
                    product_id: None,
                    quantity: Some(0.0),
                    price: Some(-0.5),
                },
            ],
        };

        assert_eq!(
            violations(&draft),
            vec![
                "value must be a number >= 0",
                "creationDate must be a valid date",
                "items[1].productId must be an integer >= 0",
                "items[1].quantity must be an integer >= 1",
                "items[1].price must be a number >= 0",
            ]
        );
    }

    #[test]
    fn test_empty_items_are_rejected() {
        let mut draft = valid_draft();
        draft.items.clear();

        assert_eq!(violations(&draft), vec!["items must contain at least one item"]);
    }

    #[test]
    fn test_fractional_quantity_is_rejected() {
        let mut draft = valid_draft();
        draft.items[0].quantity = Some(1.5);

        assert_eq!(violations(&draft), vec!["items[0].quantity must be an integer >= 1"]);
    }

    #[test]
    fn test_quantity_beyond_i64_is_rejected() {
        let mut draft = valid_draft();
        draft.items[0].quantity = Some(9_223_372_036_854_775_808.0);

        assert_eq!(violations(&draft), vec!["items[0].quantity must be an integer >= 1"]);

        draft.items[0].quantity = Some(9_223_372_036_854_774_784.0);
        assert_eq!(validate(&draft).unwrap().items[0].quantity, 9_223_372_036_854_774_784);
    }

    #[test]
    fn test_unparsable_numbers_are_rejected() {
        let mut draft = valid_draft();
        draft.value = None;
        draft.items[0].price = None;

        assert_eq!(
            violations(&draft),
            vec!["value must be a number >= 0", "items[0].price must be a number >= 0"]
        );
    }

    #[test]
    fn test_negative_product_id_is_rejected() {
        let mut draft = valid_draft();
        draft.items[0].product_id = Some(-3);

        assert_eq!(violations(&draft), vec!["items[0].productId must be an integer >= 0"]);
    }
}
