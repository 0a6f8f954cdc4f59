//! Typed query predicates for document listing.
//!
//! A list of [`Query`] values is combined conjunctively by the document
//! store. Each predicate serializes to the platform's JSON query string,
//! e.g. `{"method":"equal","attribute":"owner","values":["u1"]}`.

use serde_json::{json, Map, Value};

/// A single document-listing predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Attribute equals one of the values.
    Equal {
        /// Attribute name.
        attribute: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// Attribute (string or array) contains one of the values.
    Contains {
        /// Attribute name.
        attribute: String,
        /// Values to look for.
        values: Vec<Value>,
    },
    /// At least one of the nested predicates holds.
    Or(Vec<Query>),
    /// Return at most this many documents.
    Limit(u32),
    /// Sort ascending on an attribute.
    OrderAsc(String),
    /// Sort descending on an attribute.
    OrderDesc(String),
}

impl Query {
    /// Equality on a single string value.
    pub fn equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Equal {
            attribute: attribute.into(),
            values: vec![Value::String(value.into())],
        }
    }

    /// Equality on any of several string values.
    pub fn equal_any<I, S>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::Equal {
            attribute: attribute.into(),
            values: values.into_iter().map(|v| Value::String(v.into())).collect(),
        }
    }

    /// Containment of a single string value.
    pub fn contains(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Contains {
            attribute: attribute.into(),
            values: vec![Value::String(value.into())],
        }
    }

    /// Platform method name.
    pub fn method(&self) -> &'static str {
        match self {
            Query::Equal { .. } => "equal",
            Query::Contains { .. } => "contains",
            Query::Or(_) => "or",
            Query::Limit(_) => "limit",
            Query::OrderAsc(_) => "orderAsc",
            Query::OrderDesc(_) => "orderDesc",
        }
    }

    /// JSON object form of this predicate.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("method".into(), json!(self.method()));
        match self {
            Query::Equal { attribute, values } | Query::Contains { attribute, values } => {
                obj.insert("attribute".into(), json!(attribute));
                obj.insert("values".into(), Value::Array(values.clone()));
            }
            Query::Or(queries) => {
                obj.insert(
                    "values".into(),
                    Value::Array(queries.iter().map(Query::to_value).collect()),
                );
            }
            Query::Limit(n) => {
                obj.insert("values".into(), json!([n]));
            }
            Query::OrderAsc(attribute) | Query::OrderDesc(attribute) => {
                obj.insert("attribute".into(), json!(attribute));
            }
        }
        Value::Object(obj)
    }

    /// Wire form sent as a `queries[]` parameter.
    pub fn to_query_string(&self) -> String {
        self.to_value().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_wire_format() {
        let q = Query::equal("owner", "u1");
        assert_eq!(
            q.to_query_string(),
            r#"{"attribute":"owner","method":"equal","values":["u1"]}"#
        );
    }

    #[test]
    fn test_or_nests_queries() {
        let q = Query::Or(vec![
            Query::equal("owner", "u1"),
            Query::contains("users", "a@example.com"),
        ]);
        let v = q.to_value();
        assert_eq!(v["method"], "or");
        assert!(v.get("attribute").is_none());
        assert_eq!(v["values"][0]["method"], "equal");
        assert_eq!(v["values"][1]["method"], "contains");
        assert_eq!(v["values"][1]["values"][0], "a@example.com");
    }

    #[test]
    fn test_limit_and_order() {
        assert_eq!(Query::Limit(10).to_value(), json!({"method": "limit", "values": [10]}));
        assert_eq!(
            Query::OrderDesc("$createdAt".into()).to_value(),
            json!({"method": "orderDesc", "attribute": "$createdAt"})
        );
        assert_eq!(Query::OrderAsc("size".into()).method(), "orderAsc");
    }

    #[test]
    fn test_equal_any() {
        let q = Query::equal_any("type", ["image", "video"]);
        assert_eq!(
            q,
            Query::Equal {
                attribute: "type".into(),
                values: vec![json!("image"), json!("video")],
            }
        );
    }
}
