use crate::value::SqlValue;
use serde::Deserialize;

/// Where `%` goes around a LIKE value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wildcard {
    #[default]
    None,
    Before,
    After,
    Both,
}

impl Wildcard {
    /// Null expands to the empty string whatever the mode.
    pub fn expand(self, value: &SqlValue) -> String {
        if value.is_null() {
            return String::new();
        }
        let value = value.to_string();
        match self {
            Wildcard::None => value,
            Wildcard::Before => format!("%{value}"),
            Wildcard::After => format!("{value}%"),
            Wildcard::Both => format!("%{value}%"),
        }
    }
}
