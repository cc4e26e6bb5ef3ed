//! Trusted SQL text.
//!
//! Table names, column names, aliases and raw predicates are interpolated into
//! statements as-is. Nothing here validates them: wrapping a string in [`Ident`]
//! or [`RawSql`] is the caller's statement that the text is trusted. Values never
//! travel this way, they always go through the [`crate::escape::Quoter`].

use serde::Deserialize;
use std::fmt;

/// A trusted identifier (table, column, alias), optionally dotted (`users.id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Ident(String);

impl Ident {
    pub fn trusted(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Backtick-quoted form, embedded backticks doubled.
    pub fn backticked(&self) -> String {
        crate::escape::backtick(&self.0)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A trusted SQL fragment (join ON clause, ORDER BY list, raw predicate, full statement).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RawSql(String);

impl RawSql {
    pub fn trusted(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RawSql {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
