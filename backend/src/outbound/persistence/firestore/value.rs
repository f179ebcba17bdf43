//! JSON ⇄ Firestore typed-value codec.
//!
//! The Firestore REST API wraps every field in a typed envelope
//! (`stringValue`, `integerValue`, `mapValue`, …). Domain types serialise
//! to plain JSON through serde; this module converts that JSON to and from
//! the envelope form so the client never handles entity-specific shapes.
//!
//! Timestamps are written as RFC 3339 strings. Documents written by other
//! clients may carry native `timestampValue` fields; decoding maps those
//! back to RFC 3339 strings, which chrono deserialises directly.

use serde_json::{Map, Number, Value, json};

use crate::domain::StoreError;

/// Encode a plain JSON value into Firestore's typed envelope.
///
/// # Errors
/// Returns [`StoreError::Serialization`] for non-finite numbers, which
/// serde_json cannot represent anyway and Firestore rejects.
pub fn to_firestore(value: &Value) -> Result<Value, StoreError> {
    Ok(match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => encode_number(n)?,
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values = items
                .iter()
                .map(to_firestore)
                .collect::<Result<Vec<_>, _>>()?;
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": to_fields(map)? } }),
    })
}

/// Encode a JSON object into a Firestore `fields` map.
///
/// # Errors
/// Propagates [`StoreError::Serialization`] from nested values.
pub fn to_fields(map: &Map<String, Value>) -> Result<Map<String, Value>, StoreError> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), to_firestore(value)?)))
        .collect()
}

fn encode_number(n: &Number) -> Result<Value, StoreError> {
    if let Some(i) = n.as_i64() {
        // Firestore's JSON mapping carries 64-bit integers as strings.
        Ok(json!({ "integerValue": i.to_string() }))
    } else if let Some(f) = n.as_f64() {
        Ok(json!({ "doubleValue": f }))
    } else {
        Err(StoreError::serialization(format!(
            "unrepresentable number: {n}"
        )))
    }
}

/// Decode a Firestore typed value back into plain JSON.
///
/// # Errors
/// Returns [`StoreError::Serialization`] for envelopes this codec does not
/// understand (for example `bytesValue` or `referenceValue`).
pub fn from_firestore(value: &Value) -> Result<Value, StoreError> {
    let map = value
        .as_object()
        .ok_or_else(|| StoreError::serialization("firestore value is not an object"))?;
    let (kind, inner) = map
        .iter()
        .next()
        .ok_or_else(|| StoreError::serialization("empty firestore value"))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" => Ok(inner.clone()),
        "integerValue" => decode_integer(inner),
        "doubleValue" => Ok(inner.clone()),
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(from_firestore).collect())
                .unwrap_or_else(|| Ok(Vec::new()))?;
            Ok(Value::Array(items))
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(from_fields)
                .unwrap_or_else(|| Ok(Map::new()))?;
            Ok(Value::Object(fields))
        }
        other => Err(StoreError::serialization(format!(
            "unsupported firestore value kind: {other}"
        ))),
    }
}

/// Decode a Firestore `fields` map into a JSON object.
///
/// # Errors
/// Propagates [`StoreError::Serialization`] from nested values.
pub fn from_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, StoreError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), from_firestore(value)?)))
        .collect()
}

fn decode_integer(inner: &Value) -> Result<Value, StoreError> {
    // The REST API emits integers as strings; accept raw numbers too.
    let parsed = match inner {
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|e| StoreError::serialization(format!("bad integerValue: {e}")))?,
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| StoreError::serialization("non-integral integerValue"))?,
        _ => return Err(StoreError::serialization("malformed integerValue")),
    };
    Ok(Value::Number(Number::from(parsed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(json!(null))]
    #[case(json!(true))]
    #[case(json!("hello"))]
    #[case(json!(42))]
    #[case(json!(["a", "b"]))]
    #[case(json!({"nested": {"flag": false, "count": 3}}))]
    fn round_trips_plain_json(#[case] value: Value) {
        let encoded = to_firestore(&value).expect("encode");
        let decoded = from_firestore(&encoded).expect("decode");
        assert_eq!(decoded, value);
    }

    #[test]
    fn integers_are_encoded_as_strings() {
        let encoded = to_firestore(&json!(7)).expect("encode");
        assert_eq!(encoded, json!({ "integerValue": "7" }));
    }

    #[test]
    fn timestamp_values_decode_to_strings() {
        let decoded =
            from_firestore(&json!({ "timestampValue": "2024-05-01T12:00:00Z" })).expect("decode");
        assert_eq!(decoded, json!("2024-05-01T12:00:00Z"));
    }

    #[test]
    fn empty_array_and_map_envelopes_decode() {
        assert_eq!(
            from_firestore(&json!({ "arrayValue": {} })).expect("decode"),
            json!([])
        );
        assert_eq!(
            from_firestore(&json!({ "mapValue": {} })).expect("decode"),
            json!({})
        );
    }

    #[test]
    fn unknown_value_kind_is_a_serialisation_error() {
        let err = from_firestore(&json!({ "bytesValue": "AAAA" })).expect_err("unsupported");
        assert!(matches!(err, StoreError::Serialization { .. }));
    }

    #[test]
    fn survey_document_round_trips_through_fields() {
        let survey = json!({
            "title": "Quarterly checkin",
            "isActive": true,
            "questions": [
                {"id": "q1", "type": "rating", "question": "Rate us", "required": true, "options": []}
            ],
            "createdAt": "2024-05-01T12:00:00Z"
        });
        let obj = survey.as_object().expect("object");
        let fields = to_fields(obj).expect("encode");
        let back = from_fields(&fields).expect("decode");
        assert_eq!(Value::Object(back), survey);
    }
}
