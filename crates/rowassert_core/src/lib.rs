//! Database assertion helpers for integration tests.
//!
//! Persist fixture entities through a small unit of work, then assert that a
//! table (optionally narrowed by a customized query) does or does not contain
//! a given row shape or substring.

pub mod assertion;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use assertion::{DatabaseTestCase, Expected, TestDatabase};
pub use db::{open_db, open_db_in_memory, DatabaseConfig, DatabaseLocation, DbError, Migration};
pub use error::{HelperError, HelperResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::Entity;
pub use query::{HydratedRow, JoinKind, Order, QueryBuilder, ROOT_ALIAS};
pub use repo::entity_repo::{Criteria, EntityRepository};
pub use service::entity_manager::EntityManager;
