//! Entity mapping contract.
//!
//! # Responsibility
//! - Describe how a Rust fixture type maps onto one table.
//! - Keep column naming and value conversion next to the type that owns it.
//!
//! # Invariants
//! - `Entity::to_values()` and `Entity::from_row()` agree on column names.

pub mod entity;
