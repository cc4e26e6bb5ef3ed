use serde::Deserialize;

use crate::ident::{Ident, RawSql};

/// A `LEFT JOIN table ON on` rule. Descriptors decoded without a table or an
/// ON clause are kept but contribute nothing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Join {
    #[serde(default)]
    pub table: Option<Ident>,
    #[serde(default)]
    pub on: Option<RawSql>,
}

impl Join {
    pub fn left(table: Ident, on: RawSql) -> Self {
        Self { table: Some(table), on: Some(on) }
    }
}

/// Concatenated ` LEFT JOIN ... ON ...` clauses, input order preserved.
pub fn build(joins: &[Join]) -> String {
    joins
        .iter()
        .filter_map(|join| match (&join.table, &join.on) {
            (Some(table), Some(on)) => Some(format!(" LEFT JOIN {table} ON {on}")),
            _ => None,
        })
        .collect()
}
