//! Value escaping. Every literal that ends up in a statement passes through a
//! [`Quoter`]; identifiers only ever get backtick quoting.

use crate::value::SqlValue;

/// Literal quoting capability of a connection.
pub trait Quoter {
    /// Quote `value` as a string literal, including the surrounding quotes.
    fn quote(&self, value: &str) -> String;
}

impl<Q: Quoter + ?Sized> Quoter for &Q {
    fn quote(&self, value: &str) -> String {
        (**self).quote(value)
    }
}

/// Standard SQL string literal: single quotes, embedded quotes doubled.
/// This is what SQLite's own quoting produces.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

pub fn backtick(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `NULL` for null, the quoted string form otherwise.
pub fn quote_value<Q: Quoter + ?Sized>(quoter: &Q, value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        other => quoter.quote(&other.to_string()),
    }
}

/// Quoter used when assembling statements without a live connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardQuoter;

impl Quoter for StandardQuoter {
    fn quote(&self, value: &str) -> String {
        quote_literal(value)
    }
}
