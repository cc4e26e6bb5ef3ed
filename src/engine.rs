//! The public call surface.

use tracing::{debug, info, warn};

use crate::condition::{self, Conditions};
use crate::error::{PersisqlError, Result};
use crate::gateway::{Gateway, SqliteGateway, Transaction};
use crate::ident::{Ident, RawSql};
use crate::normalize::{Records, normalize};
use crate::settings::ConnectionSettings;
use crate::statement::{Delete, Field, Insert, Outcome, Select, SelectMany, Update};
use crate::value::Row;

/// What [`Engine::get`] found.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Row(Row),
    Value(String),
}

impl Fetched {
    pub fn into_row(self) -> Option<Row> {
        match self {
            Fetched::Row(row) => Some(row),
            Fetched::Value(_) => None,
        }
    }
    pub fn into_value(self) -> Option<String> {
        match self {
            Fetched::Value(value) => Some(value),
            Fetched::Row(_) => None,
        }
    }
}

/// Owns one gateway and runs requests through it.
pub struct Engine<G: Gateway = SqliteGateway> {
    gateway: G,
}

impl Engine<SqliteGateway> {
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        Ok(Self::new(SqliteGateway::open(settings)?))
    }
}

impl<G: Gateway> Engine<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }
    pub fn gateway(&self) -> &G {
        &self.gateway
    }
    pub fn into_gateway(self) -> G {
        self.gateway
    }

    fn surface<T>(&self, sql: String) -> Outcome<T> {
        info!(%sql, "debug mode, statement not executed");
        Outcome::Debug(sql)
    }

    /// First row matching `select`, or one field of it.
    pub fn get(&self, select: &Select) -> Result<Outcome<Option<Fetched>>> {
        let sql = select.to_sql(&self.gateway)?;
        if select.debug {
            return Ok(self.surface(sql));
        }
        let Some(row) = self.gateway.fetch_one(&sql)? else {
            return Ok(Outcome::Executed(None));
        };
        let fetched = match &select.field {
            Field::All => Fetched::Row(row),
            Field::Named(name) => {
                let value = row.get(name).ok_or_else(|| {
                    PersisqlError::validation(format!(
                        "field '{name}' is not a column of the result from '{}'",
                        select.table
                    ))
                })?;
                Fetched::Value(value.to_string())
            }
        };
        Ok(Outcome::Executed(Some(fetched)))
    }

    /// Every matching row, folded by key column.
    pub fn get_all(&self, select: &SelectMany) -> Result<Outcome<Option<Records>>> {
        let sql = select.to_sql(&self.gateway)?;
        self.get_all_base(&RawSql::trusted(sql), select.debug)
    }

    /// Run a caller-written SELECT and fold its rows by key column.
    pub fn get_all_base(&self, sql: &RawSql, debug: bool) -> Result<Outcome<Option<Records>>> {
        if debug {
            return Ok(self.surface(sql.to_string()));
        }
        let rows = self.gateway.fetch_all(sql.as_str())?;
        debug!(rows = rows.len(), "fetched");
        Ok(Outcome::Executed(normalize(&rows)))
    }

    pub fn update(&self, update: &Update) -> Result<Outcome<bool>> {
        let sql = update.to_sql(&self.gateway)?;
        if update.debug {
            return Ok(self.surface(sql));
        }
        if update.assignments(&self.gateway).is_empty() {
            return Err(PersisqlError::validation(format!(
                "update of '{}' has nothing to set",
                update.table
            )));
        }
        Ok(Outcome::Executed(self.gateway.execute(&sql)?))
    }

    /// Insert one row inside a transaction. `Some(id)` with the generated row id
    /// on success, `None` when the database refused the row (nothing committed).
    /// Errors roll back before they are returned.
    pub fn insert(&self, insert: &Insert) -> Result<Outcome<Option<i64>>> {
        if insert.values.is_empty() {
            return Err(PersisqlError::validation(format!(
                "insert into '{}' has no values",
                insert.table
            )));
        }
        let sql = insert.to_sql(&self.gateway)?;
        if insert.debug {
            return Ok(self.surface(sql));
        }
        let transaction = Transaction::begin(&self.gateway)?;
        if self.gateway.execute(&sql)? {
            let id = self.gateway.last_insert_id();
            transaction.commit()?;
            info!(table = %insert.table, id, "row inserted");
            Ok(Outcome::Executed(Some(id)))
        } else {
            transaction.rollback()?;
            warn!(table = %insert.table, "insert refused, rolled back");
            Ok(Outcome::Executed(None))
        }
    }

    /// Conditions are mandatory; an empty list or blank raw predicate is refused
    /// instead of deleting the whole table.
    pub fn delete(&self, delete: &Delete) -> Result<Outcome<bool>> {
        if delete.conditions.is_empty() {
            return Err(PersisqlError::validation(format!(
                "delete from '{}' without conditions",
                delete.table
            )));
        }
        let sql = delete.to_sql(&self.gateway)?;
        if delete.debug {
            return Ok(self.surface(sql));
        }
        Ok(Outcome::Executed(self.gateway.execute(&sql)?))
    }

    /// The WHERE clause this engine would generate, for callers writing their own SQL.
    pub fn condition_string(&self, table: &Ident, conditions: &Conditions) -> Result<String> {
        condition::build(&self.gateway, table, conditions)
    }
}
