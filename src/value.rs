//! Dynamically-typed property and attribute values.
//!
//! Node properties and attribute payloads share one closed variant, [`Value`].
//! Attributes declare a [`DataType`] up front and every write is checked
//! against it; the check is a plain tag comparison.
//!
//! Attribute values are deduplicated by their *canonical key*: numbers,
//! strings and booleans are stringified, lists and maps are rendered as
//! compact JSON with maps in key order. Numbers use one spelling at every
//! depth, so `-0.0` and `0.0` share a key while `NaN`, `inf` and `-inf` each
//! keep their own.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sim_error::SimError;

/// Declared type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Number,
    #[serde(rename = "string")]
    Text,
    Boolean,
    List,
    Map,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Number => "number",
            DataType::Text => "string",
            DataType::Boolean => "boolean",
            DataType::List => "list",
            DataType::Map => "map",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(DataType::Number),
            "string" => Ok(DataType::Text),
            "boolean" => Ok(DataType::Boolean),
            "list" => Ok(DataType::List),
            "map" => Ok(DataType::Map),
            other => Err(SimError::InvalidValue(format!("unknown data type `{other}`"))),
        }
    }
}

/// A property or attribute value.
///
/// Serialized untagged, so a `Value` reads and writes as plain JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// The [`DataType`] tag of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Boolean(_) => DataType::Boolean,
            Value::Number(_) => DataType::Number,
            Value::Text(_) => DataType::Text,
            Value::List(_) => DataType::List,
            Value::Map(_) => DataType::Map,
        }
    }

    /// Canonical string form used to key shared value nodes.
    ///
    /// # Example
    /// ```rust
    /// use sim_graph::value::Value;
    /// assert_eq!(Value::from(5.0).canonical_key().unwrap(), "5");
    /// assert_eq!(Value::from("five").canonical_key().unwrap(), "five");
    /// assert_eq!(Value::from(vec![1.0, 2.5]).canonical_key().unwrap(), "[1,2.5]");
    /// assert_eq!(Value::from(vec![f64::NAN, -0.0]).canonical_key().unwrap(), "[NaN,0]");
    /// ```
    pub fn canonical_key(&self) -> Result<String, SimError> {
        match self {
            Value::Text(s) => Ok(s.clone()),
            _ => {
                let mut out = String::new();
                self.render_canonical(&mut out)?;
                Ok(out)
            }
        }
    }

    // Strings nested in lists and maps are quoted; numbers are not, so a
    // nested "NaN" never collides with a nested NaN.
    fn render_canonical(&self, out: &mut String) -> Result<(), SimError> {
        match self {
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => out.push_str(&canonical_number(*n)),
            Value::Text(s) => out.push_str(&quoted(s)?),
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.render_canonical(out)?;
                }
                out.push(']');
            }
            Value::Map(m) => {
                out.push('{');
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&quoted(k)?);
                    out.push(':');
                    v.render_canonical(out)?;
                }
                out.push('}');
            }
        }
        Ok(())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

// -0.0 and 0.0 must share a value node.
fn canonical_number(n: f64) -> String {
    if n == 0.0 { "0".to_string() } else { n.to_string() }
}

fn quoted(s: &str) -> Result<String, SimError> {
    serde_json::to_string(s)
        .map_err(|e| SimError::InvalidValue(format!("cannot quote `{s}`: {e}")))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical_key() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<f64>> for Value {
    fn from(items: Vec<f64>) -> Self {
        Value::List(items.into_iter().map(Value::Number).collect())
    }
}

impl From<[f64; 3]> for Value {
    fn from(xyz: [f64; 3]) -> Self {
        Value::List(xyz.iter().copied().map(Value::Number).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Value::Map(m)
    }
}


#[cfg(test)]
mod serde_tests {
    use super::*;

    #[test]
    fn value_json_roundtrip() {
        let v = Value::List(vec![
            Value::from(1.0),
            Value::from("two"),
            Value::from(false),
        ]);
        let s = serde_json::to_string(&v).unwrap();
        assert_eq!(s, r#"[1.0,"two",false]"#);
        let back: Value = serde_json::from_str(&s).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn integers_read_back_as_numbers() {
        let v: Value = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(v, Value::from([1.0, 2.0, 3.0]));
    }

    #[test]
    fn data_type_json_names() {
        assert_eq!(serde_json::to_string(&DataType::Text).unwrap(), r#""string""#);
        let dt: DataType = serde_json::from_str(r#""list""#).unwrap();
        assert_eq!(dt, DataType::List);
    }
}
