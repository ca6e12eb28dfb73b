use serde_json::{Map, Number, Value};

use super::errors::OrderError;

// ============================================================================
// Order Commands - Typed form of the upstream payload
// ============================================================================
//
// The upstream integration platform posts orders with Portuguese field names:
//
//   { "numeroPedido": "...", "valorTotal": 10.5, "dataCriacao": "2024-01-01",
//     "items": [{ "idItem": "7", "quantidadeItem": 2, "valorItem": 5.25 }] }
//
// Parsing only checks structure. Scalar values are kept as-is so the
// transformer can coerce them.
//
// ============================================================================

pub const FIELD_ORDER_NUMBER: &str = "numeroPedido";
pub const FIELD_TOTAL_VALUE: &str = "valorTotal";
pub const FIELD_CREATION_DATE: &str = "dataCriacao";
pub const FIELD_ITEMS: &str = "items";

const REQUIRED_FIELDS: [&str; 4] = [
    FIELD_ORDER_NUMBER,
    FIELD_TOTAL_VALUE,
    FIELD_CREATION_DATE,
    FIELD_ITEMS,
];

/// A scalar taken from the payload before coercion
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarInput {
    Absent,
    Number(Number),
    Text(String),
    Unsupported,
}

impl From<Option<&Value>> for ScalarInput {
    fn from(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => ScalarInput::Absent,
            Some(Value::Number(n)) => ScalarInput::Number(n.clone()),
            Some(Value::String(s)) => ScalarInput::Text(s.clone()),
            Some(_) => ScalarInput::Unsupported,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderItem {
    pub id_item: ScalarInput,
    pub quantidade_item: ScalarInput,
    pub valor_item: ScalarInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderCommand {
    pub numero_pedido: String,
    pub valor_total: ScalarInput,
    pub data_criacao: ScalarInput,
    pub items: Vec<CreateOrderItem>,
}

impl CreateOrderCommand {
    /// Parse a raw request body, rejecting it before any transformation
    /// when required fields are absent or the structure is wrong.
    pub fn from_payload(payload: &Value) -> Result<Self, OrderError> {
        let Some(body) = payload.as_object() else {
            return Err(OrderError::MissingField(
                REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            ));
        };

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| is_missing(body, field))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(OrderError::MissingField(missing));
        }

        let mut violations = Vec::new();

        let numero_pedido = match &body[FIELD_ORDER_NUMBER] {
            Value::String(s) => s.clone(),
            Value::Number(n) => order_number_text(n),
            _ => {
                violations.push(format!("{FIELD_ORDER_NUMBER} must be a string or number"));
                String::new()
            }
        };

        let items = match &body[FIELD_ITEMS] {
            Value::Array(raw_items) => raw_items
                .iter()
                .enumerate()
                .filter_map(|(index, raw)| match raw.as_object() {
                    Some(item) => Some(CreateOrderItem {
                        id_item: item.get("idItem").into(),
                        quantidade_item: item.get("quantidadeItem").into(),
                        valor_item: item.get("valorItem").into(),
                    }),
                    None => {
                        violations.push(format!("{FIELD_ITEMS}[{index}] must be an object"));
                        None
                    }
                })
                .collect(),
            _ => {
                violations.push(format!("{FIELD_ITEMS} must be an array"));
                Vec::new()
            }
        };

        if !violations.is_empty() {
            return Err(OrderError::Validation(violations));
        }

        Ok(Self {
            numero_pedido,
            valor_total: body.get(FIELD_TOTAL_VALUE).into(),
            data_criacao: body.get(FIELD_CREATION_DATE).into(),
            items,
        })
    }
}

/// Whole numbers render without a fraction, so `1.0` and `1` name the same order.
fn order_number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

fn is_missing(body: &Map<String, Value>, field: &str) -> bool {
    match body.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) if field == FIELD_ORDER_NUMBER => s.trim().is_empty(),
        Some(_) => false,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
