//! Fixture creation and database content assertions.
//!
//! # Responsibility
//! - Offer `create_*` helpers that persist fixture entities.
//! - Offer `assert_database_has` / `assert_database_not_has` over hydrated
//!   query results, either by row shape or by substring.
//!
//! # Invariants
//! - A row-shape expectation with a key absent from the results is an error,
//!   never a silent assertion pass.
//! - An empty result set contains nothing and raises nothing.

mod case;
mod expected;
pub mod matching;

pub use case::{DatabaseTestCase, TestDatabase};
pub use expected::Expected;
