use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Order Value Objects
// ============================================================================

/// A line item owned by its parent order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: f64,
}

/// The validated internal order shape
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub value: f64,
    pub creation_date: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// A persisted order plus the timestamps assigned by the store
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(flatten)]
    pub order: Order,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn new(order: Order, stored_at: DateTime<Utc>) -> Self {
        let stored_at = to_store_precision(stored_at);
        Self {
            order,
            created_at: stored_at,
            updated_at: stored_at,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order.order_id
    }
}

/// Database timestamp columns keep milliseconds (Scylla `timestamp`), so
/// every timestamp is truncated to that before it is stored or returned.
pub fn to_store_precision(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(3)
}

// ============================================================================
// Drafts - Transformer output, not yet validated
// ============================================================================
//
// `None` marks a value the transformer could not coerce (the invalid-number
// or invalid-date sentinel). Schema validation turns drafts into `Order`s.
//

#[derive(Clone, Debug, PartialEq)]
pub struct OrderItemDraft {
    pub product_id: Option<i64>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderDraft {
    pub order_id: String,
    pub value: Option<f64>,
    pub creation_date: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemDraft>,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn sample_order() -> Order {
        Order {
            order_id: "P1".to_string(),
            value: 10.5,
            creation_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            items: vec![OrderItem {
                product_id: 7,
                quantity: 2,
                price: 5.25,
            }],
        }
    }

    #[test]
    fn test_order_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(sample_order()).unwrap();

        assert_eq!(json["orderId"], "P1");
        assert_eq!(json["value"], 10.5);
        assert_eq!(json["creationDate"], "2024-01-01T00:00:00Z");
        assert_eq!(json["items"][0]["productId"], 7);
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["items"][0]["price"], 5.25);
    }

    #[test]
    fn test_record_flattens_order_fields() {
        let stored_at = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let record = OrderRecord::new(sample_order(), stored_at);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["orderId"], "P1");
        assert_eq!(json["createdAt"], "2024-02-01T12:00:00Z");
        assert_eq!(json["updatedAt"], "2024-02-01T12:00:00Z");
        assert!(json.get("order").is_none());

        let back: OrderRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.order_id(), "P1");
    }

    #[test]
    fn test_store_timestamps_are_whole_milliseconds() {
        let stored_at = Utc
            .with_ymd_and_hms(2024, 2, 1, 12, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();

        let record = OrderRecord::new(sample_order(), stored_at);

        assert_eq!(record.created_at.nanosecond(), 123_000_000);
        assert_eq!(record.updated_at, record.created_at);
        assert_eq!(
            DateTime::from_timestamp_millis(record.created_at.timestamp_millis()),
            Some(record.created_at)
        );
    }
}
