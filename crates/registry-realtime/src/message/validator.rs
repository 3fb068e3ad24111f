//! Message validation rules.
//!
//! `GIFT_CREATE` arguments are checked in a fixed order and the first
//! problem wins: presence, then type coercion, then value constraints.

use serde_json::Value;
use validator::Validate;

use registry_core::error::AppError;
use registry_core::types::{Money, RegistryItemId};
use registry_service::GiftRequest;

/// Expected JSON type of a `GIFT_CREATE` argument.
#[derive(Debug, Clone, Copy)]
enum ArgKind {
    Number,
    Text,
}

/// `GIFT_CREATE` arguments in check order: wire name, field name, type.
const GIFT_ARGS: &[(&str, &str, ArgKind)] = &[
    ("amount", "amount", ArgKind::Number),
    ("paymentMethodNonce", "payment_method_nonce", ArgKind::Text),
    ("nickname", "nickname", ArgKind::Text),
    ("comment", "comment", ArgKind::Text),
    ("registryId", "registry_id", ArgKind::Text),
];

/// Validates raw inbound frame size and content.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Coerced `GIFT_CREATE` arguments, before conversion to domain types.
#[derive(Debug, Clone, Validate)]
struct GiftCreateForm {
    #[validate(range(min = 0.01))]
    amount: f64,
    #[validate(length(min = 1))]
    payment_method_nonce: String,
    #[validate(length(min = 1, max = 64))]
    nickname: String,
    #[validate(length(max = 1000))]
    comment: String,
    #[validate(length(min = 1))]
    registry_id: String,
}

enum Coerced {
    Number(f64),
    Text(String),
}

fn missing(name: &str) -> AppError {
    AppError::validation(format!("Missing argument: {name}"))
}

fn invalid(name: &str) -> AppError {
    AppError::validation(format!("Invalid argument: {name}"))
}

fn coerce(value: &Value, kind: ArgKind) -> Option<Coerced> {
    match (kind, value) {
        (ArgKind::Number, Value::Number(n)) => n.as_f64().map(Coerced::Number),
        (ArgKind::Number, Value::String(s)) => s.trim().parse::<f64>().ok().map(Coerced::Number),
        (ArgKind::Text, Value::String(s)) => Some(Coerced::Text(s.clone())),
        (ArgKind::Text, Value::Number(n)) => Some(Coerced::Text(n.to_string())),
        (ArgKind::Text, Value::Bool(b)) => Some(Coerced::Text(b.to_string())),
        _ => None,
    }
}

/// Turn the raw `data` of a `GIFT_CREATE` into a [`GiftRequest`].
///
/// Errors are validation errors whose message is either
/// `Missing argument: <name>` or `Invalid argument: <name>`.
pub fn parse_gift_request(data: Option<&Value>) -> Result<GiftRequest, AppError> {
    let object = data.and_then(Value::as_object);

    let mut amount = 0.0;
    let mut texts: Vec<String> = Vec::with_capacity(GIFT_ARGS.len() - 1);
    for (wire, _, kind) in GIFT_ARGS {
        let value = object
            .and_then(|o| o.get(*wire))
            .filter(|v| !v.is_null())
            .ok_or_else(|| missing(wire))?;
        match coerce(value, *kind).ok_or_else(|| invalid(wire))? {
            Coerced::Number(n) => amount = n,
            Coerced::Text(s) => texts.push(s),
        }
    }

    let [payment_method_nonce, nickname, comment, registry_id]: [String; 4] = texts
        .try_into()
        .map_err(|_| AppError::internal("Unexpected GIFT_CREATE argument layout"))?;

    let form = GiftCreateForm {
        amount,
        payment_method_nonce,
        nickname,
        comment,
        registry_id,
    };

    if !form.amount.is_finite() {
        return Err(invalid("amount"));
    }
    if let Err(errors) = form.validate() {
        let fields = errors.field_errors();
        let first = GIFT_ARGS
            .iter()
            .find(|(_, field, _)| fields.contains_key(*field))
            .map(|(wire, _, _)| *wire)
            .unwrap_or("data");
        return Err(invalid(first));
    }

    let amount = Money::from_major(form.amount).map_err(|_| invalid("amount"))?;
    let registry_id = form
        .registry_id
        .trim()
        .parse::<RegistryItemId>()
        .map_err(|_| invalid("registryId"))?;

    Ok(GiftRequest {
        amount,
        payment_method_nonce: form.payment_method_nonce,
        nickname: form.nickname,
        comment: form.comment,
        registry_id,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid() -> Value {
        json!({
            "amount": 25,
            "paymentMethodNonce": "fake-valid-nonce",
            "nickname": "Grandma",
            "comment": "Bon voyage!",
            "registryId": RegistryItemId::new().to_string(),
        })
    }

    fn message(data: Value) -> String {
        parse_gift_request(Some(&data)).unwrap_err().message
    }

    #[test]
    fn test_valid_request() {
        let request = parse_gift_request(Some(&valid())).unwrap();
        assert_eq!(request.amount, Money::from_minor(2_500));
        assert_eq!(request.nickname, "Grandma");
    }

    #[test]
    fn test_missing_arguments_in_order() {
        assert_eq!(
            parse_gift_request(None).unwrap_err().message,
            "Missing argument: amount"
        );

        let mut data = valid();
        data.as_object_mut().unwrap().remove("amount");
        data.as_object_mut().unwrap().remove("comment");
        assert_eq!(message(data), "Missing argument: amount");

        let mut data = valid();
        data.as_object_mut().unwrap().remove("comment");
        data.as_object_mut().unwrap().remove("registryId");
        assert_eq!(message(data), "Missing argument: comment");

        let mut data = valid();
        data["nickname"] = Value::Null;
        assert_eq!(message(data), "Missing argument: nickname");
    }

    #[test]
    fn test_coercion() {
        let mut data = valid();
        data["amount"] = json!("12.50");
        data["nickname"] = json!(42);
        let request = parse_gift_request(Some(&data)).unwrap();
        assert_eq!(request.amount, Money::from_minor(1_250));
        assert_eq!(request.nickname, "42");

        let mut data = valid();
        data["amount"] = json!("lots");
        assert_eq!(message(data), "Invalid argument: amount");

        let mut data = valid();
        data["comment"] = json!({ "text": "hi" });
        assert_eq!(message(data), "Invalid argument: comment");
    }

    #[test]
    fn test_constraints() {
        let mut data = valid();
        data["amount"] = json!(0.001);
        assert_eq!(message(data), "Invalid argument: amount");

        let mut data = valid();
        data["amount"] = json!(-5);
        assert_eq!(message(data), "Invalid argument: amount");

        let mut data = valid();
        data["nickname"] = json!("");
        assert_eq!(message(data), "Invalid argument: nickname");

        let mut data = valid();
        data["nickname"] = json!("x".repeat(65));
        data["comment"] = json!("y".repeat(1001));
        assert_eq!(message(data), "Invalid argument: nickname");

        let mut data = valid();
        data["comment"] = json!("y".repeat(1001));
        assert_eq!(message(data), "Invalid argument: comment");

        let mut data = valid();
        data["registryId"] = json!("58cb1d6f0d8a1a2b3c4d5e6f");
        assert_eq!(message(data), "Invalid argument: registryId");
    }

    #[test]
    fn test_limits_are_inclusive() {
        let mut data = valid();
        data["amount"] = json!(0.01);
        data["nickname"] = json!("n".repeat(64));
        data["comment"] = json!("c".repeat(1000));
        let request = parse_gift_request(Some(&data)).unwrap();
        assert_eq!(request.amount, Money::from_minor(1));
        assert_eq!(request.nickname.chars().count(), 64);
        assert_eq!(request.comment.chars().count(), 1000);

        let mut data = valid();
        data["nickname"] = json!("é".repeat(64));
        assert!(parse_gift_request(Some(&data)).is_ok());
    }

    #[test]
    fn test_empty_comment_is_allowed() {
        let mut data = valid();
        data["comment"] = json!("");
        assert_eq!(parse_gift_request(Some(&data)).unwrap().comment, "");
    }

    #[test]
    fn test_validate_inbound() {
        assert!(validate_inbound("{}", 16).is_ok());
        assert!(validate_inbound("   ", 16).is_err());
        assert!(validate_inbound(&"x".repeat(17), 16).is_err());
    }
}
