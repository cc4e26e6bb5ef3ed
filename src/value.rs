use rusqlite::types::ValueRef;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PersisqlError;

/// A scalar travelling into a statement (condition queue, update/insert payload)
/// or coming back out of one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SqlValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

// Null stringifies to the empty string; this is what update skipping and row
// folding compare against.
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}
impl From<String> for SqlValue {
    fn from(s: String) -> Self { Self::Text(s) }
}
impl From<i64> for SqlValue {
    fn from(i: i64) -> Self { Self::Integer(i) }
}
impl From<i32> for SqlValue {
    fn from(i: i32) -> Self { Self::Integer(i64::from(i)) }
}
impl From<f64> for SqlValue {
    fn from(r: f64) -> Self { Self::Real(r) }
}
impl From<bool> for SqlValue {
    fn from(b: bool) -> Self { Self::Integer(i64::from(b)) }
}
impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(r) => Self::Real(r),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                Self::Text(String::from_utf8_lossy(t).into_owned())
            }
        }
    }
}

struct SqlValueVisitor;

impl<'de> Visitor<'de> for SqlValueVisitor {
    type Value = SqlValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }
    fn visit_unit<E: de::Error>(self) -> Result<SqlValue, E> {
        Ok(SqlValue::Null)
    }
    fn visit_none<E: de::Error>(self) -> Result<SqlValue, E> {
        Ok(SqlValue::Null)
    }
    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<SqlValue, D::Error> {
        d.deserialize_any(SqlValueVisitor)
    }
    fn visit_bool<E: de::Error>(self, b: bool) -> Result<SqlValue, E> {
        Ok(SqlValue::from(b))
    }
    fn visit_i64<E: de::Error>(self, i: i64) -> Result<SqlValue, E> {
        Ok(SqlValue::Integer(i))
    }
    fn visit_u64<E: de::Error>(self, u: u64) -> Result<SqlValue, E> {
        Ok(i64::try_from(u).map_or_else(|_| SqlValue::Text(u.to_string()), SqlValue::Integer))
    }
    fn visit_f64<E: de::Error>(self, r: f64) -> Result<SqlValue, E> {
        Ok(SqlValue::Real(r))
    }
    fn visit_str<E: de::Error>(self, s: &str) -> Result<SqlValue, E> {
        Ok(SqlValue::Text(s.to_owned()))
    }
    fn visit_string<E: de::Error>(self, s: String) -> Result<SqlValue, E> {
        Ok(SqlValue::Text(s))
    }
}

impl<'de> Deserialize<'de> for SqlValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SqlValueVisitor)
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Real(r) => serializer.serialize_f64(*r),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One physical result row, columns in select-list order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Columns and values pair up by position, so their lengths must match.
    pub fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Result<Self, PersisqlError> {
        if columns.len() != values.len() {
            return Err(PersisqlError::validation(format!(
                "row has {} columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        Ok(Self { columns, values })
    }
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }
    pub fn len(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_string_form() {
        assert_eq!(SqlValue::Null.to_string(), "");
        assert_eq!(SqlValue::Integer(42).to_string(), "42");
        assert_eq!(SqlValue::Real(2.0).to_string(), "2");
        assert_eq!(SqlValue::from("abc").to_string(), "abc");
    }

    #[test]
    fn decodes_json_scalars() {
        let values: Vec<SqlValue> = serde_json::from_str(r#"[null, 1, 1.5, "x", true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Null,
                SqlValue::Integer(1),
                SqlValue::Real(1.5),
                SqlValue::from("x"),
                SqlValue::Integer(1)
            ]
        );
    }

    #[test]
    fn row_lookup_by_column() {
        let row = Row::new(
            vec!["userId".into(), "name".into()],
            vec![SqlValue::Integer(1), SqlValue::from("a")],
        )
        .unwrap();
        assert_eq!(row.get("name"), Some(&SqlValue::from("a")));
        assert_eq!(row.get("missing"), None);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"userId":1,"name":"a"}"#);
    }

    #[test]
    fn row_needs_one_value_per_column() {
        let err = Row::new(vec!["userId".into(), "name".into()], vec![SqlValue::Integer(1)]).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("2 columns but 1 values"), "{err}");
    }
}
