//! Conversion between plain JSON and the store's typed value wrappers
//!
//! Documents on the wire wrap every field in a single-key tag object such as
//! `{"stringValue": "x"}` or `{"integerValue": "42"}`. Integers are
//! string-encoded int64 on the wire. Encoding rejects arrays nested directly
//! inside arrays, which the store does not allow; decoding passes timestamp,
//! bytes, reference and geo-point values through in their wire form.

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

/// Encode a plain JSON field map into typed wire fields
pub fn encode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>> {
    let mut encoded = Map::new();
    for (key, value) in fields {
        encoded.insert(key.clone(), encode_value(value)?);
    }
    Ok(encoded)
}

/// Encode a single plain JSON value into its typed wire form
pub fn encode_value(value: &Value) -> Result<Value> {
    match value {
        Value::Null => Ok(json!({ "nullValue": null })),
        Value::Bool(b) => Ok(json!({ "booleanValue": b })),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(json!({ "integerValue": i.to_string() }))
            } else if let Some(f) = n.as_f64() {
                Ok(json!({ "doubleValue": f }))
            } else {
                Err(Error::codec(format!("integer out of int64 range: {}", n)))
            }
        }
        Value::String(s) => Ok(json!({ "stringValue": s })),
        Value::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                if item.is_array() {
                    return Err(Error::codec(
                        "array values may not directly contain other arrays",
                    ));
                }
                values.push(encode_value(item)?);
            }
            Ok(json!({ "arrayValue": { "values": values } }))
        }
        Value::Object(map) => {
            let fields = encode_fields(map)?;
            Ok(json!({ "mapValue": { "fields": fields } }))
        }
    }
}

/// Decode typed wire fields back into a plain JSON field map
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>> {
    let mut decoded = Map::new();
    for (key, value) in fields {
        decoded.insert(key.clone(), decode_value(value)?);
    }
    Ok(decoded)
}

/// Decode a single typed wire value into plain JSON
pub fn decode_value(value: &Value) -> Result<Value> {
    let tagged = value
        .as_object()
        .ok_or_else(|| Error::codec(format!("expected a typed value object, got {}", value)))?;

    if let Some(s) = tagged.get("stringValue") {
        return Ok(s.clone());
    }
    if let Some(i) = tagged.get("integerValue") {
        return match i {
            Value::String(s) => {
                let parsed: i64 = s
                    .parse()
                    .map_err(|_| Error::codec(format!("invalid integerValue: {}", s)))?;
                Ok(json!(parsed))
            }
            Value::Number(_) => Ok(i.clone()),
            other => Err(Error::codec(format!("invalid integerValue: {}", other))),
        };
    }
    if let Some(d) = tagged.get("doubleValue") {
        return Ok(d.clone());
    }
    if let Some(b) = tagged.get("booleanValue") {
        return Ok(b.clone());
    }
    if tagged.contains_key("nullValue") {
        return Ok(Value::Null);
    }
    if let Some(t) = tagged.get("timestampValue") {
        return Ok(t.clone());
    }
    if let Some(b) = tagged.get("bytesValue") {
        return Ok(b.clone());
    }
    if let Some(r) = tagged.get("referenceValue") {
        return Ok(r.clone());
    }
    if let Some(g) = tagged.get("geoPointValue") {
        return Ok(g.clone());
    }
    if let Some(a) = tagged.get("arrayValue") {
        let items = match a.get("values") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        };
        let mut decoded = Vec::with_capacity(items.len());
        for item in items {
            decoded.push(decode_value(item)?);
        }
        return Ok(Value::Array(decoded));
    }
    if let Some(m) = tagged.get("mapValue") {
        let fields = match m.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields)?,
            _ => Map::new(),
        };
        return Ok(Value::Object(fields));
    }

    Err(Error::codec(format!("unrecognized typed value: {}", value)))
}
