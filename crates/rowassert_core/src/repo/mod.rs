//! Read-side repositories over entity tables.
//!
//! # Responsibility
//! - Provide typed lookups (`find`, `find_by`, `count`) per entity.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Results are ordered by primary key so fixtures read back predictably.

pub mod entity_repo;
