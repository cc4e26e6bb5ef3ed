//! Connection gateway.
//!
//! The engine talks to the database only through [`Gateway`]: run a statement,
//! fetch rows, quote a literal, drive a transaction. [`SqliteGateway`] is the
//! rusqlite-backed implementation.
//!
//! A gateway is a single connection and is not meant to be shared between
//! threads without outside synchronisation.

use rusqlite::{Connection, ErrorCode, OpenFlags};
use tracing::{debug, warn};

use crate::error::{PersisqlError, Result};
use crate::escape::{Quoter, quote_literal};
use crate::settings::{ConnectionSettings, Dsn};
use crate::value::{Row, SqlValue};

pub trait Gateway: Quoter {
    /// Prepare and run a statement that returns no rows.
    /// `Ok(false)` means the driver refused the statement without raising
    /// (constraint violations), anything worse is an `Err`.
    fn execute(&self, sql: &str) -> Result<bool>;
    fn fetch_one(&self, sql: &str) -> Result<Option<Row>>;
    fn fetch_all(&self, sql: &str) -> Result<Vec<Row>>;
    fn begin(&self) -> Result<()>;
    fn commit(&self) -> Result<()>;
    fn rollback(&self) -> Result<()>;
    fn last_insert_id(&self) -> i64;
}

/// An open transaction. Commit or roll back explicitly; dropping an unfinished
/// transaction rolls it back. A failed commit counts as unfinished.
pub struct Transaction<'g, G: Gateway + ?Sized> {
    gateway: &'g G,
    finished: bool,
}

impl<'g, G: Gateway + ?Sized> Transaction<'g, G> {
    pub fn begin(gateway: &'g G) -> Result<Self> {
        gateway.begin()?;
        Ok(Self { gateway, finished: false })
    }
    pub fn commit(mut self) -> Result<()> {
        self.gateway.commit()?;
        self.finished = true;
        Ok(())
    }
    pub fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.gateway.rollback()
    }
}

impl<G: Gateway + ?Sized> Drop for Transaction<'_, G> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("transaction abandoned, rolling back");
            if let Err(e) = self.gateway.rollback() {
                warn!(error = %e, "rollback of abandoned transaction failed");
            }
        }
    }
}

// ------------- SQLite -------------
pub struct SqliteGateway {
    connection: Connection,
}

impl SqliteGateway {
    pub fn open(settings: &ConnectionSettings) -> Result<Self> {
        match settings.dsn()? {
            Dsn::SqliteMemory => Self::open_in_memory(),
            Dsn::SqliteFile(path) => {
                let connection = Connection::open_with_flags(
                    &path,
                    OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
                )
                .map_err(|e| PersisqlError::Config(format!("could not open '{path}': {e}")))?;
                Ok(Self::from_connection(connection))
            }
        }
    }
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }
    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
    pub fn into_connection(self) -> Connection {
        self.connection
    }

    fn prepare(&self, sql: &str) -> Result<rusqlite::Statement<'_>> {
        debug!(%sql, "preparing statement");
        self.connection.prepare(sql).map_err(|e| PersisqlError::Prepare {
            sql: sql.to_string(),
            message: e.to_string(),
        })
    }

    fn collect(&self, sql: &str, limit: Option<usize>) -> Result<Vec<Row>> {
        let mut statement = self.prepare(sql)?;
        let columns: Vec<String> = statement.column_names().into_iter().map(String::from).collect();
        let mut rows = statement.query([])?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(SqlValue::from(row.get_ref(i)?));
            }
            collected.push(Row::new(columns.clone(), values)?);
            if limit.is_some_and(|l| collected.len() >= l) {
                break;
            }
        }
        Ok(collected)
    }
}

impl Quoter for SqliteGateway {
    fn quote(&self, value: &str) -> String {
        quote_literal(value)
    }
}

impl Gateway for SqliteGateway {
    fn execute(&self, sql: &str) -> Result<bool> {
        let mut statement = self.prepare(sql)?;
        match statement.execute([]) {
            Ok(changed) => {
                debug!(changed, "statement executed");
                Ok(true)
            }
            Err(rusqlite::Error::SqliteFailure(failure, message))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                warn!(?message, "statement rejected by constraint");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
    fn fetch_one(&self, sql: &str) -> Result<Option<Row>> {
        Ok(self.collect(sql, Some(1))?.into_iter().next())
    }
    fn fetch_all(&self, sql: &str) -> Result<Vec<Row>> {
        self.collect(sql, None)
    }
    fn begin(&self) -> Result<()> {
        self.connection
            .execute_batch("BEGIN")
            .map_err(|e| PersisqlError::Transaction(format!("begin failed: {e}")))
    }
    fn commit(&self) -> Result<()> {
        self.connection
            .execute_batch("COMMIT")
            .map_err(|e| PersisqlError::Transaction(format!("commit failed: {e}")))
    }
    fn rollback(&self) -> Result<()> {
        self.connection
            .execute_batch("ROLLBACK")
            .map_err(|e| PersisqlError::Transaction(format!("rollback failed: {e}")))
    }
    fn last_insert_id(&self) -> i64 {
        self.connection.last_insert_rowid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_transaction_rolls_back() {
        let gateway = SqliteGateway::open_in_memory().unwrap();
        gateway.connection().execute_batch("create table t (x integer);").unwrap();
        {
            let _tx = Transaction::begin(&gateway).unwrap();
            assert!(gateway.execute("insert into t (x) values (1);").unwrap());
        }
        assert!(gateway.connection().is_autocommit());
        assert!(gateway.fetch_all("select * from t;").unwrap().is_empty());
    }

    #[test]
    fn constraint_violation_is_soft_failure() {
        let gateway = SqliteGateway::open_in_memory().unwrap();
        gateway
            .connection()
            .execute_batch("create table t (x integer primary key);")
            .unwrap();
        assert!(gateway.execute("insert into t (x) values (1);").unwrap());
        assert!(!gateway.execute("insert into t (x) values (1);").unwrap());
    }

    #[test]
    fn unknown_table_fails_to_prepare() {
        let gateway = SqliteGateway::open_in_memory().unwrap();
        let err = gateway.fetch_all("select * from missing;").unwrap_err();
        assert!(matches!(err, PersisqlError::Prepare { .. }));
    }
}
