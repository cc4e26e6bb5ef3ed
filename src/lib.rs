//! Persisql – descriptor-driven SQL statements over a single database connection.
//!
//! Callers describe *what* they want with plain values:
//! * [`condition::Condition`] – a filter, either `table.`field` OP 'value'` or a
//!   conditional fallback (`if` this holds filter by `then`, else by `else`).
//! * [`join::Join`] – a `LEFT JOIN table ON ...` rule.
//! * [`grouping::Grouping`] – `GROUP BY` plus `GROUP_CONCAT(DISTINCT ...)` columns.
//!
//! The [`engine::Engine`] turns these into SELECT / INSERT / UPDATE / DELETE text,
//! runs it through a [`gateway::Gateway`], and for multi-row selects folds the
//! rows produced by one-to-many joins back into one record per key
//! ([`normalize`]).
//!
//! ## Trust boundary
//! Values always pass through the gateway's literal quoting. Identifiers and raw
//! fragments (ON clauses, ORDER BY, raw predicates) are interpolated untouched;
//! they are wrapped in [`ident::Ident`] / [`ident::RawSql`] so every place that
//! hands trusted text to the engine is visible in the code.
//!
//! ## Modules
//! * [`wildcard`] – `%` placement for LIKE values.
//! * [`escape`] – literal and identifier quoting.
//! * [`condition`], [`join`], [`grouping`] – fragment builders.
//! * [`statement`] – request types and statement assembly.
//! * [`normalize`] – key column detection and row folding.
//! * [`gateway`] – connection capability, scoped transactions, SQLite backend.
//! * [`settings`] – config file / environment loading.
//!
//! ## Quick Start
//! ```
//! use persisql::{Conditions, Engine, Ident, Insert, SelectMany, SimpleCondition, SqliteGateway, Wildcard};
//! let gateway = SqliteGateway::open_in_memory().unwrap();
//! gateway
//!     .connection()
//!     .execute_batch("create table users (userId integer primary key, name text);")
//!     .unwrap();
//! let engine = Engine::new(gateway);
//! engine
//!     .insert(&Insert::into_table(Ident::trusted("users")).set(Ident::trusted("name"), "Alice"))
//!     .unwrap();
//! let filter = SimpleCondition::new(Ident::trusted("name"), "ali").wildcard(Wildcard::After);
//! let records = engine
//!     .get_all(&SelectMany::from_table(Ident::trusted("users")).conditions(Conditions::list([filter])))
//!     .unwrap()
//!     .executed()
//!     .flatten()
//!     .unwrap();
//! assert_eq!(records["1"]["name"], "Alice");
//! ```

pub mod condition;
pub mod engine;
pub mod error;
pub mod escape;
pub mod gateway;
pub mod grouping;
pub mod ident;
pub mod join;
pub mod normalize;
pub mod settings;
pub mod statement;
pub mod value;
pub mod wildcard;

pub use condition::{Condition, ConditionalFallback, Conditions, FallbackBranch, LogicalOperator, SimpleCondition};
pub use engine::{Engine, Fetched};
pub use error::{PersisqlError, Result};
pub use escape::{Quoter, StandardQuoter};
pub use gateway::{Gateway, SqliteGateway, Transaction};
pub use grouping::{GroupConcat, Grouping};
pub use ident::{Ident, RawSql};
pub use join::Join;
pub use normalize::{Record, Records};
pub use settings::{ConnectionSettings, Dsn};
pub use statement::{Delete, Field, Insert, Outcome, Select, SelectMany, Update};
pub use value::{Row, SqlValue};
pub use wildcard::Wildcard;
