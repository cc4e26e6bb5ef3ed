//! Condition descriptors and the WHERE clause builder.
//!
//! A condition list renders as ` WHERE p1 OP2 p2 OP3 p3 ...`, where each `OPn` is the
//! logical operator carried by the n-th descriptor. The first descriptor's operator
//! is never emitted; every later descriptor must carry one.
//!
//! Two descriptor shapes exist:
//! * [`SimpleCondition`] renders `table.`field` OPERATOR 'value'`.
//! * [`ConditionalFallback`] renders a ternary predicate
//!   `((IF AND THEN) OR (NOT(IF) AND ELSE))`.
//!
//! A raw string may be passed instead of a list ([`Conditions::Raw`]); it is
//! appended after ` WHERE table.` untouched.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{PersisqlError, Result};
use crate::escape::{Quoter, quote_value};
use crate::ident::{Ident, RawSql};
use crate::value::SqlValue;
use crate::wildcard::Wildcard;

const DEFAULT_OPERATOR: &str = "LIKE";
const DEFAULT_IF_OPERATOR: &str = "IS NOT";
const AMBIENT_TABLE: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_sql(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for LogicalOperator {
    type Err = PersisqlError;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(LogicalOperator::And),
            "OR" => Ok(LogicalOperator::Or),
            other => Err(PersisqlError::validation(format!(
                "Unknown logical operator '{other}', expected AND or OR"
            ))),
        }
    }
}

// A blank operator decodes as absent; the builder decides whether that is allowed.
fn deserialize_logical<'de, D>(deserializer: D) -> std::result::Result<Option<LogicalOperator>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(s) if !s.trim().is_empty() => s.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

fn default_operator() -> String {
    DEFAULT_OPERATOR.to_string()
}

fn resolve_table<'a>(ambient: &'a Ident, table_override: Option<&'a Ident>) -> &'a Ident {
    match table_override {
        Some(t) if !t.is_empty() && t.as_str() != AMBIENT_TABLE => t,
        _ => ambient,
    }
}

/// `table.`field` OPERATOR value`. The operator is interpolated verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleCondition {
    pub field: Ident,
    #[serde(default, deserialize_with = "deserialize_logical")]
    pub logical_operator: Option<LogicalOperator>,
    #[serde(default = "default_operator")]
    pub operator: String,
    /// Null renders the literal `NULL`; pair it with `IS` / `IS NOT`.
    #[serde(default)]
    pub queue: SqlValue,
    #[serde(default)]
    pub wildcard: Wildcard,
    #[serde(default)]
    pub table_override: Option<Ident>,
}

impl SimpleCondition {
    pub fn new(field: Ident, queue: impl Into<SqlValue>) -> Self {
        Self {
            field,
            logical_operator: None,
            operator: default_operator(),
            queue: queue.into(),
            wildcard: Wildcard::None,
            table_override: None,
        }
    }
    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }
    pub fn wildcard(mut self, wildcard: Wildcard) -> Self {
        self.wildcard = wildcard;
        self
    }
    pub fn table(mut self, table: Ident) -> Self {
        self.table_override = Some(table);
        self
    }
    pub fn joined_by(mut self, op: LogicalOperator) -> Self {
        self.logical_operator = Some(op);
        self
    }

    fn render<Q: Quoter + ?Sized>(&self, quoter: &Q, table: &Ident) -> String {
        let table = resolve_table(table, self.table_override.as_ref());
        let value = if self.queue.is_null() {
            "NULL".to_string()
        } else {
            quoter.quote(&self.wildcard.expand(&self.queue))
        };
        format!("{table}.{} {} {value}", self.field.backticked(), self.operator)
    }
}

/// One branch of a [`ConditionalFallback`]. The operator defaults per branch:
/// `IS NOT` for the test, `LIKE` for the outcomes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackBranch {
    pub field: Ident,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub queue: SqlValue,
    /// Applies to the `then` and `else` branches only. The `if` branch always
    /// compares against the plain value and ignores it.
    #[serde(default)]
    pub wildcard: Wildcard,
    #[serde(default)]
    pub table_override: Option<Ident>,
}

impl FallbackBranch {
    pub fn new(field: Ident) -> Self {
        Self {
            field,
            operator: None,
            queue: SqlValue::Null,
            wildcard: Wildcard::None,
            table_override: None,
        }
    }
    pub fn queue(mut self, queue: impl Into<SqlValue>) -> Self {
        self.queue = queue.into();
        self
    }
    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }
    pub fn wildcard(mut self, wildcard: Wildcard) -> Self {
        self.wildcard = wildcard;
        self
    }
    pub fn table(mut self, table: Ident) -> Self {
        self.table_override = Some(table);
        self
    }

    fn column(&self, table: &Ident) -> String {
        let table = resolve_table(table, self.table_override.as_ref());
        format!("{table}.{}", self.field.backticked())
    }

    // The test branch compares against the plain value, no wildcards.
    fn render_test<Q: Quoter + ?Sized>(&self, quoter: &Q, table: &Ident) -> String {
        format!(
            "{} {} {}",
            self.column(table),
            self.operator.as_deref().unwrap_or(DEFAULT_IF_OPERATOR),
            quote_value(quoter, &self.queue)
        )
    }

    fn render_outcome<Q: Quoter + ?Sized>(&self, quoter: &Q, table: &Ident) -> String {
        format!(
            "{} {} {}",
            self.column(table),
            self.operator.as_deref().unwrap_or(DEFAULT_OPERATOR),
            quoter.quote(&self.wildcard.expand(&self.queue))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum FallbackTag {
    #[serde(rename = "conditionalFallback")]
    ConditionalFallback,
}

/// If the `test` branch holds, filter by `then`, otherwise filter by `otherwise`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalFallback {
    #[serde(rename = "type")]
    tag: FallbackTag,
    #[serde(default, deserialize_with = "deserialize_logical")]
    pub logical_operator: Option<LogicalOperator>,
    #[serde(rename = "if")]
    pub test: FallbackBranch,
    pub then: FallbackBranch,
    #[serde(rename = "else")]
    pub otherwise: FallbackBranch,
}

impl ConditionalFallback {
    pub fn new(test: FallbackBranch, then: FallbackBranch, otherwise: FallbackBranch) -> Self {
        Self {
            tag: FallbackTag::ConditionalFallback,
            logical_operator: None,
            test,
            then,
            otherwise,
        }
    }
    pub fn joined_by(mut self, op: LogicalOperator) -> Self {
        self.logical_operator = Some(op);
        self
    }

    fn render<Q: Quoter + ?Sized>(&self, quoter: &Q, table: &Ident) -> String {
        let test = self.test.render_test(quoter, table);
        let then = self.then.render_outcome(quoter, table);
        let otherwise = self.otherwise.render_outcome(quoter, table);
        format!("(({test} AND {then}) OR (NOT({test}) AND {otherwise}))")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    ConditionalFallback(ConditionalFallback),
    Simple(SimpleCondition),
}

impl Condition {
    pub fn logical_operator(&self) -> Option<LogicalOperator> {
        match self {
            Condition::ConditionalFallback(c) => c.logical_operator,
            Condition::Simple(c) => c.logical_operator,
        }
    }

    /// The predicate alone, without any logical operator.
    pub fn render<Q: Quoter + ?Sized>(&self, quoter: &Q, table: &Ident) -> String {
        match self {
            Condition::ConditionalFallback(c) => c.render(quoter, table),
            Condition::Simple(c) => c.render(quoter, table),
        }
    }
}

impl From<SimpleCondition> for Condition {
    fn from(c: SimpleCondition) -> Self {
        Condition::Simple(c)
    }
}

impl From<ConditionalFallback> for Condition {
    fn from(c: ConditionalFallback) -> Self {
        Condition::ConditionalFallback(c)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConditionsRepr {
    Raw(RawSql),
    List(Vec<Condition>),
}

/// Either a raw predicate or a list of descriptors. `null` decodes as the empty list.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditions {
    Raw(RawSql),
    List(Vec<Condition>),
}

impl<'de> Deserialize<'de> for Conditions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match Option::<ConditionsRepr>::deserialize(deserializer)? {
            Some(ConditionsRepr::Raw(sql)) => Conditions::Raw(sql),
            Some(ConditionsRepr::List(list)) => Conditions::List(list),
            None => Conditions::default(),
        })
    }
}

impl Default for Conditions {
    fn default() -> Self {
        Conditions::List(Vec::new())
    }
}

impl Conditions {
    pub fn none() -> Self {
        Self::default()
    }
    pub fn raw(sql: RawSql) -> Self {
        Conditions::Raw(sql)
    }
    pub fn list<I, C>(conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Conditions::List(conditions.into_iter().map(Into::into).collect())
    }
    /// Decode descriptor JSON: a string is a raw predicate, an array a descriptor
    /// list, `null` no conditions at all.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
    /// True when nothing would be rendered, whitespace-only raw text included.
    pub fn is_empty(&self) -> bool {
        match self {
            Conditions::Raw(sql) => sql.is_blank(),
            Conditions::List(list) => list.is_empty(),
        }
    }
}

impl From<Vec<Condition>> for Conditions {
    fn from(list: Vec<Condition>) -> Self {
        Conditions::List(list)
    }
}

impl From<RawSql> for Conditions {
    fn from(sql: RawSql) -> Self {
        Conditions::Raw(sql)
    }
}

/// Render the WHERE clause for `conditions` against the ambient `table`:
/// the empty string, or ` WHERE ` followed by the joined predicates.
pub fn build<Q: Quoter + ?Sized>(quoter: &Q, table: &Ident, conditions: &Conditions) -> Result<String> {
    let list = match conditions {
        Conditions::Raw(sql) if sql.as_str().is_empty() => return Ok(String::new()),
        Conditions::Raw(sql) => return Ok(format!(" WHERE {table}.{sql}")),
        Conditions::List(list) => list,
    };
    let mut bound = String::new();
    for (position, condition) in list.iter().enumerate() {
        let predicate = condition.render(quoter, table);
        if position == 0 {
            bound.push_str(&predicate);
            continue;
        }
        let op = condition.logical_operator().ok_or_else(|| {
            PersisqlError::validation(format!(
                "Condition #{} on table '{table}' has no logical operator; every condition after the first needs AND or OR",
                position + 1
            ))
        })?;
        bound.push(' ');
        bound.push_str(op.as_sql());
        bound.push(' ');
        bound.push_str(&predicate);
    }
    if bound.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(" WHERE {bound}"))
}
