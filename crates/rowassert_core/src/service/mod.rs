//! Persistence orchestration for fixture entities.
//!
//! # Responsibility
//! - Queue entity inserts and write them in one transaction on flush.
//! - Hand out query builders and repositories bound to the same connection.
//!
//! # Invariants
//! - Writes never bypass `Entity::validate()`.
//! - A failed flush leaves no partial rows behind.

pub mod entity_manager;
