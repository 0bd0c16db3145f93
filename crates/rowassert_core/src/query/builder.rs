use super::hydrate::{hydrate_rows, HydratedRow};
use super::quote_identifier;
use crate::error::{HelperError, HelperResult};
use crate::model::entity::Entity;
use log::debug;
use rusqlite::types::{ToSql, Value};
use rusqlite::Connection;
use std::time::Instant;

/// Sort direction for [`QueryBuilder::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
        }
    }
}

#[derive(Debug, Clone)]
struct Source {
    table: String,
    alias: String,
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    source: Source,
    on: String,
}

/// Fluent SELECT builder handed to assertion customizers.
///
/// Conditions and select expressions are raw SQL fragments that reference
/// aliases directly, e.g. `"{alias}.email = :email"`. Values go through
/// [`QueryBuilder::set_parameter`] and are bound as named parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    select: Vec<String>,
    from: Option<Source>,
    joins: Vec<Join>,
    condition: Option<String>,
    order_by: Vec<String>,
    parameters: Vec<(String, Value)>,
    max_results: Option<u32>,
    first_result: u32,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the select list.
    ///
    /// A bare alias (`"u"`) selects every column of that alias.
    pub fn select(&mut self, expression: impl Into<String>) -> &mut Self {
        self.select = vec![expression.into()];
        self
    }

    pub fn add_select(&mut self, expression: impl Into<String>) -> &mut Self {
        self.select.push(expression.into());
        self
    }

    pub fn from(&mut self, table: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.from = Some(Source {
            table: table.into(),
            alias: alias.into(),
        });
        self
    }

    pub fn inner_join(
        &mut self,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: impl Into<String>,
    ) -> &mut Self {
        self.join(JoinKind::Inner, table.into(), alias.into(), on.into())
    }

    pub fn left_join(
        &mut self,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: impl Into<String>,
    ) -> &mut Self {
        self.join(JoinKind::Left, table.into(), alias.into(), on.into())
    }

    /// Replaces any existing condition.
    pub fn where_clause(&mut self, condition: impl Into<String>) -> &mut Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn and_where(&mut self, condition: impl Into<String>) -> &mut Self {
        self.combine_condition("AND", condition.into())
    }

    pub fn or_where(&mut self, condition: impl Into<String>) -> &mut Self {
        self.combine_condition("OR", condition.into())
    }

    /// Replaces the ordering.
    pub fn order_by(&mut self, expression: impl Into<String>, order: Order) -> &mut Self {
        self.order_by.clear();
        self.add_order_by(expression, order)
    }

    pub fn add_order_by(&mut self, expression: impl Into<String>, order: Order) -> &mut Self {
        self.order_by
            .push(format!("{} {}", expression.into(), order.keyword()));
        self
    }

    /// Binds `value` to the named placeholder `:name`.
    ///
    /// The leading colon is optional. Setting the same name twice keeps the
    /// latest value.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let name = name.trim_start_matches(':').to_string();
        let value = value.into();
        match self.parameters.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.parameters.push((name, value)),
        }
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        let name = name.trim_start_matches(':');
        self.parameters
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn set_max_results(&mut self, max_results: u32) -> &mut Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn set_first_result(&mut self, first_result: u32) -> &mut Self {
        self.first_result = first_result;
        self
    }

    pub fn root_alias(&self) -> Option<&str> {
        self.from.as_ref().map(|source| source.alias.as_str())
    }

    /// Renders the statement.
    ///
    /// # Errors
    /// - Returns [`HelperError::InvalidQuery`] when no FROM clause was set.
    pub fn get_sql(&self) -> HelperResult<String> {
        let from = self.from.as_ref().ok_or_else(|| {
            HelperError::InvalidQuery("query has no FROM clause".to_string())
        })?;

        let select = if self.select.is_empty() {
            format!("{}.*", quote_identifier(&from.alias))
        } else {
            self.select
                .iter()
                .map(|expression| self.expand_select(expression))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!(
            "SELECT {select} FROM {} AS {}",
            quote_identifier(&from.table),
            quote_identifier(&from.alias)
        );

        for join in &self.joins {
            sql.push_str(&format!(
                " {} {} AS {} ON {}",
                join.kind.keyword(),
                quote_identifier(&join.source.table),
                quote_identifier(&join.source.alias),
                join.on
            ));
        }

        if let Some(condition) = &self.condition {
            sql.push_str(&format!(" WHERE {condition}"));
        }

        if !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }

        if let Some(limit) = self.max_results {
            sql.push_str(&format!(" LIMIT {limit}"));
            if self.first_result > 0 {
                sql.push_str(&format!(" OFFSET {}", self.first_result));
            }
        } else if self.first_result > 0 {
            sql.push_str(&format!(" LIMIT -1 OFFSET {}", self.first_result));
        }

        Ok(sql)
    }

    /// Executes the query and hydrates every row as a column-keyed map.
    pub fn get_array_result(&self, conn: &Connection) -> HelperResult<Vec<HydratedRow>> {
        let started_at = Instant::now();
        let sql = self.get_sql()?;
        let mut stmt = conn.prepare(&sql)?;

        let names = self.placeholder_names();
        let bound = self.bound_parameters(&names);
        let rows = hydrate_rows(&mut stmt, bound.as_slice())?;

        debug!(
            "event=query_execute module=query status=ok hydration=array rows={} duration_ms={}",
            rows.len(),
            started_at.elapsed().as_millis()
        );
        Ok(rows)
    }

    /// Executes the query and hydrates every row through [`Entity::from_row`].
    pub fn get_result<E: Entity>(&self, conn: &Connection) -> HelperResult<Vec<E>> {
        let started_at = Instant::now();
        let sql = self.get_sql()?;
        let mut stmt = conn.prepare(&sql)?;

        let names = self.placeholder_names();
        let bound = self.bound_parameters(&names);
        let entities = stmt
            .query_map(bound.as_slice(), E::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "event=query_execute module=query status=ok hydration=entity table={} rows={} duration_ms={}",
            E::TABLE,
            entities.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entities)
    }

    fn join(&mut self, kind: JoinKind, table: String, alias: String, on: String) -> &mut Self {
        self.joins.push(Join {
            kind,
            source: Source { table, alias },
            on,
        });
        self
    }

    fn combine_condition(&mut self, operator: &str, condition: String) -> &mut Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => format!("({existing}) {operator} ({condition})"),
            None => condition,
        });
        self
    }

    fn expand_select(&self, expression: &str) -> String {
        let trimmed = expression.trim();
        if self.is_alias(trimmed) {
            format!("{}.*", quote_identifier(trimmed))
        } else {
            trimmed.to_string()
        }
    }

    fn is_alias(&self, name: &str) -> bool {
        self.from
            .iter()
            .chain(self.joins.iter().map(|join| &join.source))
            .any(|source| source.alias == name)
    }

    fn placeholder_names(&self) -> Vec<String> {
        self.parameters
            .iter()
            .map(|(name, _)| format!(":{name}"))
            .collect()
    }

    fn bound_parameters<'a>(&'a self, names: &'a [String]) -> Vec<(&'a str, &'a dyn ToSql)> {
        names
            .iter()
            .zip(&self.parameters)
            .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Order, QueryBuilder};
    use crate::error::HelperError;
    use rusqlite::types::Value;

    #[test]
    fn bare_alias_expands_to_all_columns() {
        let mut qb = QueryBuilder::new();
        qb.select("u").from("users", "u");

        assert_eq!(qb.get_sql().unwrap(), "SELECT \"u\".* FROM \"users\" AS \"u\"");
    }

    #[test]
    fn conditions_are_grouped_in_call_order() {
        let mut qb = QueryBuilder::new();
        qb.from("users", "u")
            .where_clause("u.age > 18")
            .and_where("u.active = 1")
            .or_where("u.role = :role");

        let sql = qb.get_sql().unwrap();
        assert!(
            sql.ends_with("WHERE ((u.age > 18) AND (u.active = 1)) OR (u.role = :role)"),
            "unexpected sql: {sql}"
        );
    }

    #[test]
    fn offset_without_limit_uses_unbounded_limit() {
        let mut qb = QueryBuilder::new();
        qb.from("users", "u")
            .order_by("u.id", Order::Desc)
            .set_first_result(5);

        let sql = qb.get_sql().unwrap();
        assert!(sql.ends_with("ORDER BY u.id DESC LIMIT -1 OFFSET 5"), "unexpected sql: {sql}");

        qb.set_max_results(2);
        let sql = qb.get_sql().unwrap();
        assert!(sql.ends_with("LIMIT 2 OFFSET 5"), "unexpected sql: {sql}");
    }

    #[test]
    fn set_parameter_overwrites_same_name() {
        let mut qb = QueryBuilder::new();
        qb.set_parameter(":email", "a@example.com".to_string())
            .set_parameter("email", "b@example.com".to_string());

        assert_eq!(
            qb.parameter("email"),
            Some(&Value::Text("b@example.com".to_string()))
        );
    }

    #[test]
    fn missing_from_is_rejected() {
        let qb = QueryBuilder::new();
        assert!(matches!(qb.get_sql(), Err(HelperError::InvalidQuery(_))));
    }
}
