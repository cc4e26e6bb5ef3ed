//! Requests and the statement assembler.
//!
//! Each request type knows how to render itself into one SQL statement through
//! [`Select::to_sql`] and friends; the [`crate::engine::Engine`] decides whether
//! to run it or, in debug mode, hand the text back as an [`Outcome::Debug`].

use indexmap::IndexMap;
use serde::Deserialize;

use crate::condition::{self, Conditions};
use crate::error::Result;
use crate::escape::{Quoter, quote_value};
use crate::grouping::{self, Grouping};
use crate::ident::{Ident, RawSql};
use crate::join::{self, Join};
use crate::value::SqlValue;

/// Result of an operation: either it ran, or debug mode surfaced its SQL instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Debug(String),
    Executed(T),
}

impl<T> Outcome<T> {
    pub fn executed(self) -> Option<T> {
        match self {
            Outcome::Executed(v) => Some(v),
            Outcome::Debug(_) => None,
        }
    }
    pub fn debug_sql(&self) -> Option<&str> {
        match self {
            Outcome::Debug(sql) => Some(sql),
            Outcome::Executed(_) => None,
        }
    }
    pub fn is_debug(&self) -> bool {
        matches!(self, Outcome::Debug(_))
    }
}

/// What a single-row select returns: the whole row, or one column of it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Field {
    #[default]
    All,
    Named(String),
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        if s == "*" { Field::All } else { Field::Named(s) }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::from(s.to_owned())
    }
}

// SELECT list shared by both select flavours.
fn select_list(table: &Ident, cols: &[Ident], grouping: Option<&Grouping>) -> String {
    let mut list = if cols.is_empty() {
        format!("{table}.*")
    } else {
        cols.iter().map(Ident::as_str).collect::<Vec<_>>().join(", ")
    };
    if let Some(grouping) = grouping.filter(|g| !g.groups.is_empty()) {
        list.push_str(", ");
        list.push_str(&grouping::build(&grouping.groups));
    }
    list
}

fn group_by(grouping: Option<&Grouping>) -> String {
    grouping
        .map(|g| format!(" GROUP BY {}", g.identifier))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Select {
    pub table: Ident,
    #[serde(default)]
    pub field: Field,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub joins: Vec<Join>,
    #[serde(default)]
    pub grouping: Option<Grouping>,
    #[serde(default)]
    pub debug: bool,
}

impl Select {
    pub fn from_table(table: Ident) -> Self {
        Self {
            table,
            field: Field::All,
            conditions: Conditions::none(),
            joins: Vec::new(),
            grouping: None,
            debug: false,
        }
    }
    pub fn field(mut self, field: impl Into<Field>) -> Self {
        self.field = field.into();
        self
    }
    pub fn conditions(mut self, conditions: impl Into<Conditions>) -> Self {
        self.conditions = conditions.into();
        self
    }
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }
    pub fn grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = Some(grouping);
        self
    }
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    pub fn to_sql<Q: Quoter + ?Sized>(&self, quoter: &Q) -> Result<String> {
        Ok(format!(
            "SELECT {} FROM {}{}{}{};",
            select_list(&self.table, &[], self.grouping.as_ref()),
            self.table,
            join::build(&self.joins),
            condition::build(quoter, &self.table, &self.conditions)?,
            group_by(self.grouping.as_ref()),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectMany {
    pub table: Ident,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub joins: Vec<Join>,
    #[serde(default)]
    pub grouping: Option<Grouping>,
    #[serde(default)]
    pub order_by: Option<RawSql>,
    /// Replaces `table.*` when non-empty.
    #[serde(default)]
    pub cols: Vec<Ident>,
    #[serde(default)]
    pub debug: bool,
}

impl SelectMany {
    pub fn from_table(table: Ident) -> Self {
        Self {
            table,
            conditions: Conditions::none(),
            joins: Vec::new(),
            grouping: None,
            order_by: None,
            cols: Vec::new(),
            debug: false,
        }
    }
    pub fn conditions(mut self, conditions: impl Into<Conditions>) -> Self {
        self.conditions = conditions.into();
        self
    }
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }
    pub fn grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = Some(grouping);
        self
    }
    pub fn order_by(mut self, order_by: RawSql) -> Self {
        self.order_by = Some(order_by);
        self
    }
    pub fn col(mut self, col: Ident) -> Self {
        self.cols.push(col);
        self
    }
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    pub fn to_sql<Q: Quoter + ?Sized>(&self, quoter: &Q) -> Result<String> {
        let order = match &self.order_by {
            Some(order_by) if !order_by.is_blank() => format!(" ORDER BY {order_by}"),
            _ => String::new(),
        };
        Ok(format!(
            "SELECT {} FROM {}{}{}{}{};",
            select_list(&self.table, &self.cols, self.grouping.as_ref()),
            self.table,
            join::build(&self.joins),
            condition::build(quoter, &self.table, &self.conditions)?,
            group_by(self.grouping.as_ref()),
            order,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub table: Ident,
    pub values: IndexMap<Ident, SqlValue>,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub debug: bool,
}

impl Update {
    pub fn table(table: Ident) -> Self {
        Self {
            table,
            values: IndexMap::new(),
            conditions: Conditions::none(),
            debug: false,
        }
    }
    pub fn set(mut self, field: Ident, value: impl Into<SqlValue>) -> Self {
        self.values.insert(field, value.into());
        self
    }
    pub fn conditions(mut self, conditions: impl Into<Conditions>) -> Self {
        self.conditions = conditions.into();
        self
    }
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// `` `field` = 'value' `` pairs. Fields whose value is the empty string are
    /// left out; null is written as `NULL`.
    pub fn assignments<Q: Quoter + ?Sized>(&self, quoter: &Q) -> Vec<String> {
        self.values
            .iter()
            .filter(|(_, value)| value.is_null() || !value.to_string().is_empty())
            .map(|(field, value)| format!("{} = {}", field.backticked(), quote_value(quoter, value)))
            .collect()
    }

    pub fn to_sql<Q: Quoter + ?Sized>(&self, quoter: &Q) -> Result<String> {
        Ok(format!(
            "UPDATE {} SET {}{};",
            self.table,
            self.assignments(quoter).join(", "),
            condition::build(quoter, &self.table, &self.conditions)?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insert {
    pub table: Ident,
    pub values: IndexMap<Ident, SqlValue>,
    #[serde(default)]
    pub debug: bool,
}

impl Insert {
    pub fn into_table(table: Ident) -> Self {
        Self { table, values: IndexMap::new(), debug: false }
    }
    pub fn set(mut self, field: Ident, value: impl Into<SqlValue>) -> Self {
        self.values.insert(field, value.into());
        self
    }
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    pub fn to_sql<Q: Quoter + ?Sized>(&self, quoter: &Q) -> Result<String> {
        let (columns, values): (Vec<String>, Vec<String>) = self
            .values
            .iter()
            .map(|(field, value)| (field.backticked(), quote_value(quoter, value)))
            .unzip();
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.table,
            columns.join(", "),
            values.join(", ")
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delete {
    pub table: Ident,
    pub conditions: Conditions,
    #[serde(default)]
    pub debug: bool,
}

impl Delete {
    pub fn from_table(table: Ident, conditions: impl Into<Conditions>) -> Self {
        Self { table, conditions: conditions.into(), debug: false }
    }
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    pub fn to_sql<Q: Quoter + ?Sized>(&self, quoter: &Q) -> Result<String> {
        Ok(format!(
            "DELETE FROM {}{};",
            self.table,
            condition::build(quoter, &self.table, &self.conditions)?
        ))
    }
}
