//! Query building and array hydration.
//!
//! # Responsibility
//! - Compose SELECT statements from small SQL fragments.
//! - Hydrate results as plain column-keyed maps or as entities.
//!
//! # Invariants
//! - Table names and aliases are always emitted as quoted identifiers.
//! - Parameter values are always bound, never interpolated.

mod builder;
mod hydrate;

pub use builder::{JoinKind, Order, QueryBuilder};
pub use hydrate::{hydrate_rows, sqlite_value_to_json, HydratedRow};

/// Root alias used by the assertion helpers.
///
/// Chosen so it cannot collide with an alias a customizer introduces.
pub const ROOT_ALIAS: &str = "rowassert_root_entity";

/// Quotes an SQL identifier, escaping embedded double quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::quote_identifier;

    #[test]
    fn quote_identifier_escapes_embedded_quotes() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
