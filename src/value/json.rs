//! JSON codec for attribute values.
//!
//! Unknown values are written as `{"$unknown": true}`; everything else maps
//! to its natural JSON form. Numbers must be 64-bit integers.

use serde_json::{Map, Number, Value as Json};

use crate::error::ValueError;

use super::types::{Collection, ListValue, Record, Value};

/// Attribute name of the object used to mark an unknown value.
pub const UNKNOWN_MARKER: &str = "$unknown";

fn is_unknown_marker(map: &Map<String, Json>) -> bool {
    map.len() == 1 && matches!(map.get(UNKNOWN_MARKER), Some(Json::Bool(true)))
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn unknown_json() -> Json {
    let mut map = Map::new();
    map.insert(String::from(UNKNOWN_MARKER), Json::Bool(true));
    Json::Object(map)
}

fn decode(json: &Json, path: &str) -> Result<Value, ValueError> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => n.as_i64().map(Value::Int).ok_or_else(|| {
            ValueError::NonIntegralNumber {
                path: path.to_string(),
                value: n.to_string(),
            }
        }),
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decode(item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Json::Object(map) if is_unknown_marker(map) => Ok(Value::Unknown),
        Json::Object(map) => decode_record(map, path).map(Value::Object),
    }
}

fn decode_record(map: &Map<String, Json>, path: &str) -> Result<Record, ValueError> {
    map.iter()
        .map(|(name, item)| {
            let child = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}.{name}")
            };
            decode(item, &child).map(|value| (name.clone(), value))
        })
        .collect()
}

impl Value {
    /// Decodes a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if a number is not a 64-bit integer.
    pub fn from_json(json: &Json) -> Result<Self, ValueError> {
        decode(json, "")
    }

    /// Encodes the value as JSON.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Self::Null => Json::Null,
            Self::Unknown => unknown_json(),
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::Number(Number::from(*i)),
            Self::String(s) => Json::String(s.clone()),
            Self::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(record) => record.to_json(),
        }
    }
}

impl Record {
    /// Encodes the record as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Json {
        Json::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
        )
    }
}

impl ListValue {
    /// Decodes a list attribute document.
    ///
    /// Accepts `null`, the unknown marker, or an array of objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a list of objects or contains
    /// a number that is not a 64-bit integer.
    pub fn from_json(json: &Json) -> Result<Self, ValueError> {
        match json {
            Json::Null => Ok(Self::Null),
            Json::Object(map) if is_unknown_marker(map) => Ok(Self::Unknown),
            Json::Array(items) => {
                let mut records = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match item {
                        Json::Object(map) if !is_unknown_marker(map) => {
                            records.push(decode_record(map, &format!("[{index}]"))?);
                        }
                        other => {
                            return Err(ValueError::ElementNotObject {
                                index,
                                found: String::from(json_kind(other)),
                            });
                        }
                    }
                }
                Ok(Self::Known(Collection::from_records(records)))
            }
            other => Err(ValueError::NotACollection {
                path: String::from("<root>"),
                found: String::from(json_kind(other)),
            }),
        }
    }

    /// Encodes the list attribute as JSON, preserving element order.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Self::Null => Json::Null,
            Self::Unknown => unknown_json(),
            Self::Known(collection) => {
                Json::Array(collection.records().iter().map(Record::to_json).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_unknown_marker() {
        let value = Value::from_json(&json!({"$unknown": true})).unwrap();
        assert!(value.is_unknown());

        // Extra keys make it an ordinary object.
        let value = Value::from_json(&json!({"$unknown": true, "name": "x"})).unwrap();
        assert!(matches!(value, Value::Object(_)));
    }

    #[test]
    fn test_decode_nested_record() {
        let value = Value::from_json(&json!({
            "name": "ng-1",
            "labels": {"team": "infra"},
            "subnets": ["a", "b"],
            "min_size": 1,
            "spot": false,
            "iam": null
        }))
        .unwrap();

        let Value::Object(record) = value else {
            panic!("expected object");
        };
        assert_eq!(record.get("name"), Some(&Value::string("ng-1")));
        assert_eq!(record.get("min_size"), Some(&Value::Int(1)));
        assert_eq!(record.get("iam"), Some(&Value::Null));
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_decode_rejects_float() {
        let err = Value::from_json(&json!({"volume_size": 80.5})).unwrap_err();
        assert_eq!(
            err,
            ValueError::NonIntegralNumber {
                path: String::from("volume_size"),
                value: String::from("80.5"),
            }
        );
    }

    #[test]
    fn test_list_from_json() {
        assert_eq!(ListValue::from_json(&json!(null)).unwrap(), ListValue::Null);
        assert_eq!(
            ListValue::from_json(&json!({"$unknown": true})).unwrap(),
            ListValue::Unknown
        );

        let list = ListValue::from_json(&json!([{"name": "ng-1"}, {"name": "ng-2"}])).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_list_element_not_object() {
        let err = ListValue::from_json(&json!([{"name": "ng-1"}, "ng-2"])).unwrap_err();
        assert_eq!(
            err,
            ValueError::ElementNotObject {
                index: 1,
                found: String::from("string"),
            }
        );

        let err = ListValue::from_json(&json!("ng-1")).unwrap_err();
        assert!(matches!(err, ValueError::NotACollection { .. }));
    }

    #[test]
    fn test_encode_preserves_order_and_unknowns() {
        let doc = json!([
            {"name": "ng-2", "instance_type": {"$unknown": true}},
            {"name": "ng-1", "instance_type": "t3.large"}
        ]);
        let list = ListValue::from_json(&doc).unwrap();
        assert_eq!(list.to_json(), doc);
    }
}
