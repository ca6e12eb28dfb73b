use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Number;

use super::commands::{CreateOrderCommand, CreateOrderItem, ScalarInput};
use super::value_objects::{to_store_precision, OrderDraft, OrderItemDraft};

// ============================================================================
// Transformer - upstream payload shape → internal order shape
// ============================================================================
//
//   numeroPedido   → orderId
//   valorTotal     → value
//   dataCriacao    → creationDate
//   items[]        → items[]
//     idItem         → productId (truncated to an integer)
//     quantidadeItem → quantity
//     valorItem      → price
//
// Pure and deterministic. Values that cannot be coerced become `None` and
// are rejected later by schema validation.
//
// ============================================================================

pub fn transform(command: &CreateOrderCommand) -> OrderDraft {
    OrderDraft {
        order_id: command.numero_pedido.clone(),
        value: to_number(&command.valor_total),
        creation_date: parse_date(&command.data_criacao),
        items: command.items.iter().map(map_item).collect(),
    }
}

fn map_item(item: &CreateOrderItem) -> OrderItemDraft {
    OrderItemDraft {
        product_id: to_integer(&item.id_item),
        quantity: to_number(&item.quantidade_item),
        price: to_number(&item.valor_item),
    }
}

/// Integer coercion: numbers truncate toward zero, strings contribute their
/// leading signed digits ("12abc" → 12, "3.9" → 3).
pub fn to_integer(input: &ScalarInput) -> Option<i64> {
    match input {
        ScalarInput::Number(n) => number_to_integer(n),
        ScalarInput::Text(s) => leading_integer(s),
        ScalarInput::Absent | ScalarInput::Unsupported => None,
    }
}

pub fn to_number(input: &ScalarInput) -> Option<f64> {
    match input {
        ScalarInput::Number(n) => n.as_f64(),
        ScalarInput::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        ScalarInput::Absent | ScalarInput::Unsupported => None,
    }
}

/// Dates are kept to millisecond precision, the resolution the stores keep.
pub fn parse_date(input: &ScalarInput) -> Option<DateTime<Utc>> {
    parse_date_exact(input).map(to_store_precision)
}

fn parse_date_exact(input: &ScalarInput) -> Option<DateTime<Utc>> {
    let ScalarInput::Text(raw) = input else {
        return None;
    };
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn number_to_integer(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let truncated = n.as_f64()?.trunc();
    if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => ("-", &trimmed[1..]),
        Some(b'+') => ("", &trimmed[1..]),
        _ => ("", trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    format!("{sign}{}", &digits[..end]).parse().ok()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use serde_json::json;

    fn command(payload: serde_json::Value) -> CreateOrderCommand {
        CreateOrderCommand::from_payload(&payload).unwrap()
    }

    fn text(s: &str) -> ScalarInput {
        ScalarInput::Text(s.to_string())
    }

    #[test]
    fn test_maps_fields_to_internal_names() {
        let draft = transform(&command(json!({
            "numeroPedido": "P1",
            "valorTotal": 10.5,
            "dataCriacao": "2024-01-01",
            "items": [{ "idItem": "7", "quantidadeItem": 2, "valorItem": 5.25 }]
        })));

        assert_eq!(
            draft,
            OrderDraft {
                order_id: "P1".to_string(),
                value: Some(10.5),
                creation_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
                items: vec![OrderItemDraft {
                    product_id: Some(7),
                    quantity: Some(2.0),
                    price: Some(5.25),
                }],
            }
        );
    }

    #[test]
    fn test_transform_is_idempotent() {
        let cmd = command(json!({
            "numeroPedido": "v10089015vdb-01",
            "valorTotal": 10000,
            "dataCriacao": "2023-07-19T12:24:11.5299601+00:00",
            "items": [
                { "idItem": "2434", "quantidadeItem": 1, "valorItem": 1000 },
                { "idItem": 99, "quantidadeItem": "3", "valorItem": "250.5" }
            ]
        }));

        assert_eq!(transform(&cmd), transform(&cmd));
    }

    #[test]
    fn test_items_keep_payload_order() {
        let draft = transform(&command(json!({
            "numeroPedido": "P2",
            "valorTotal": 3,
            "dataCriacao": "2024-01-01",
            "items": [
                { "idItem": 3, "quantidadeItem": 1, "valorItem": 1 },
                { "idItem": 1, "quantidadeItem": 1, "valorItem": 1 },
                { "idItem": 2, "quantidadeItem": 1, "valorItem": 1 }
            ]
        })));

        let ids: Vec<_> = draft.items.iter().map(|i| i.product_id).collect();
        assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn test_to_integer_coercion() {
        assert_eq!(to_integer(&text("7")), Some(7));
        assert_eq!(to_integer(&text("  42 ")), Some(42));
        assert_eq!(to_integer(&text("12abc")), Some(12));
        assert_eq!(to_integer(&text("3.9")), Some(3));
        assert_eq!(to_integer(&text("-5")), Some(-5));
        assert_eq!(to_integer(&text("abc")), None);
        assert_eq!(to_integer(&text("")), None);
        assert_eq!(to_integer(&ScalarInput::Number(Number::from_f64(8.7).unwrap())), Some(8));
        assert_eq!(
            to_integer(&ScalarInput::Number(Number::from_f64(9_223_372_036_854_775_808.0).unwrap())),
            None
        );
        assert_eq!(to_integer(&ScalarInput::Absent), None);
        assert_eq!(to_integer(&ScalarInput::Unsupported), None);
    }

    #[test]
    fn test_to_number_coercion() {
        assert_eq!(to_number(&text("250.5")), Some(250.5));
        assert_eq!(to_number(&text("1e3")), Some(1000.0));
        assert_eq!(to_number(&text("NaN")), None);
        assert_eq!(to_number(&text("ten")), None);
        assert_eq!(to_number(&ScalarInput::Number(4.into())), Some(4.0));
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date(&text("2024-01-01")), Some(midnight));
        assert_eq!(parse_date(&text("2024-01-01T00:00:00Z")), Some(midnight));
        assert_eq!(parse_date(&text("2024-01-01T03:00:00+03:00")), Some(midnight));
        assert_eq!(parse_date(&text("2024-01-01T00:00:00")), Some(midnight));
        assert_eq!(parse_date(&text("2024-01-01 00:00:00.000")), Some(midnight));
    }

    #[test]
    fn test_sub_millisecond_fraction_is_truncated() {
        let parsed = parse_date(&text("2023-07-19T12:24:11.5299601+00:00")).unwrap();

        assert_eq!(parsed.nanosecond() % 1_000_000, 0);
        assert_eq!(parsed.nanosecond(), 529_000_000);
        assert_eq!(DateTime::from_timestamp_millis(parsed.timestamp_millis()), Some(parsed));
        assert_eq!(DateTime::from_timestamp_micros(parsed.timestamp_micros()), Some(parsed));

        let naive = parse_date(&text("2024-01-01 10:00:00.999999")).unwrap();
        assert_eq!(naive.nanosecond(), 999_000_000);
    }

    #[test]
    fn test_invalid_dates_become_none() {
        assert_eq!(parse_date(&text("not a date")), None);
        assert_eq!(parse_date(&text("2024-13-45")), None);
        assert_eq!(parse_date(&ScalarInput::Number(20240101.into())), None);
    }
}
