//! Conversions between scalar values and their JSON form.

use crate::{Kind, Value};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as Json;

/// JSON form of a scalar value or a list of scalars. Enum constants go out
/// lower-cased. Nested records have no scalar form and map to null.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Null | Value::Model(_) => Json::Null,
        Value::String(v) => Json::String(v.clone()),
        Value::Enum(v) => Json::String(v.to_lowercase()),
        Value::Int(v) => Json::from(*v),
        Value::Long(v) => Json::from(*v),
        Value::Double(v) => Json::from(*v),
        Value::Boolean(v) => Json::Bool(*v),
        Value::Timestamp(v) => Json::String(v.to_rfc3339_opts(SecondsFormat::Millis, true)),
        Value::Blob(v) => Json::String(BASE64.encode(v)),
        Value::List(items) => Json::Array(items.iter().map(to_json).collect()),
    }
}

/// Decodes `json` as a value of `kind`. Lists decode their elements with
/// `element`, when given. Returns `None` when the JSON does not fit.
pub fn from_json(kind: Kind, element: Option<Kind>, json: &Json) -> Option<Value> {
    if json.is_null() {
        return Some(Value::Null);
    }

    Some(match kind {
        Kind::String => Value::String(json.as_str()?.to_string()),
        Kind::Enum => Value::Enum(json.as_str()?.to_uppercase()),
        Kind::Int => Value::Int(i32::try_from(json.as_i64()?).ok()?),
        Kind::Long => Value::Long(json.as_i64()?),
        Kind::Double => Value::Double(json.as_f64()?),
        Kind::Boolean => Value::Boolean(json.as_bool()?),
        Kind::Timestamp => Value::Timestamp(timestamp(json)?),
        Kind::Blob => Value::Blob(BASE64.decode(json.as_str()?).ok()?),
        Kind::List => {
            let items = json.as_array()?;
            let decoded = match element {
                Some(element) => items
                    .iter()
                    .map(|item| from_json(element, None, item))
                    .collect::<Option<Vec<_>>>()?,
                None => items.iter().map(infer).collect::<Option<Vec<_>>>()?,
            };
            Value::List(decoded)
        }
        Kind::Model | Kind::Flex => return None,
    })
}

/// Infers a concrete value from JSON alone, for the flex-set path.
pub fn infer(json: &Json) -> Option<Value> {
    Some(match json {
        Json::Null => Value::Null,
        Json::Bool(v) => Value::Boolean(*v),
        Json::Number(n) => match n.as_i64() {
            Some(v) => Value::Long(v),
            None => Value::Double(n.as_f64()?),
        },
        Json::String(v) => Value::String(v.clone()),
        Json::Array(items) => Value::List(items.iter().map(infer).collect::<Option<Vec<_>>>()?),
        Json::Object(_) => return None,
    })
}

fn timestamp(json: &Json) -> Option<DateTime<Utc>> {
    match json {
        Json::String(v) => DateTime::parse_from_rfc3339(v)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Json::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enums_travel_lower_case() {
        assert_eq!(to_json(&Value::Enum("ACTIVE".into())), json!("active"));
        assert_eq!(
            from_json(Kind::Enum, None, &json!("active")),
            Some(Value::Enum("ACTIVE".into()))
        );
    }

    #[test]
    fn timestamps_accept_millis_and_rfc3339() {
        let from_millis = from_json(Kind::Timestamp, None, &json!(0)).unwrap();
        let from_text = from_json(Kind::Timestamp, None, &json!("1970-01-01T00:00:00.000Z")).unwrap();
        assert_eq!(from_millis, from_text);
        assert_eq!(to_json(&from_millis), json!("1970-01-01T00:00:00.000Z"));
    }

    #[test]
    fn blobs_are_base64() {
        let value = Value::Blob(b"stratum".to_vec());
        let json = to_json(&value);
        assert_eq!(json, json!("c3RyYXR1bQ=="));
        assert_eq!(from_json(Kind::Blob, None, &json), Some(value));
    }

    #[test]
    fn int_overflow_does_not_fit() {
        assert_eq!(from_json(Kind::Int, None, &json!(i64::MAX)), None);
    }

    #[test]
    fn lists_use_the_element_kind() {
        let value = from_json(Kind::List, Some(Kind::Long), &json!([1, 2])).unwrap();
        assert_eq!(value, Value::List(vec![Value::Long(1), Value::Long(2)]));
    }
}
