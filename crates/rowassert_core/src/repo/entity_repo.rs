use crate::error::HelperResult;
use crate::model::entity::Entity;
use crate::query::quote_identifier;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::marker::PhantomData;

/// Equality criteria combined with AND. A `Value::Null` matches `IS NULL`.
pub type Criteria<'a> = [(&'a str, Value)];

/// Typed read access to the table behind `E`.
pub struct EntityRepository<'conn, E> {
    conn: &'conn Connection,
    _entity: PhantomData<E>,
}

impl<'conn, E: Entity> EntityRepository<'conn, E> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    pub fn find(&self, id: i64) -> HelperResult<Option<E>> {
        self.find_one_by(&[(E::PRIMARY_KEY, Value::Integer(id))])
    }

    pub fn find_all(&self) -> HelperResult<Vec<E>> {
        self.find_by(&[])
    }

    pub fn find_by(&self, criteria: &Criteria<'_>) -> HelperResult<Vec<E>> {
        let (condition, bind_values) = build_condition(criteria);
        let sql = format!(
            "SELECT * FROM {}{condition} ORDER BY {} ASC;",
            quote_identifier(E::TABLE),
            quote_identifier(E::PRIMARY_KEY)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let entities = stmt
            .query_map(params_from_iter(bind_values), E::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entities)
    }

    pub fn find_one_by(&self, criteria: &Criteria<'_>) -> HelperResult<Option<E>> {
        let (condition, bind_values) = build_condition(criteria);
        let sql = format!(
            "SELECT * FROM {}{condition} ORDER BY {} ASC LIMIT 1;",
            quote_identifier(E::TABLE),
            quote_identifier(E::PRIMARY_KEY)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        if let Some(row) = rows.next()? {
            return Ok(Some(E::from_row(row)?));
        }

        Ok(None)
    }

    pub fn count(&self, criteria: &Criteria<'_>) -> HelperResult<u64> {
        let (condition, bind_values) = build_condition(criteria);
        let sql = format!(
            "SELECT COUNT(*) FROM {}{condition};",
            quote_identifier(E::TABLE)
        );

        let count = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get::<_, i64>(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn build_condition(criteria: &Criteria<'_>) -> (String, Vec<Value>) {
    if criteria.is_empty() {
        return (String::new(), Vec::new());
    }

    let mut clauses = Vec::with_capacity(criteria.len());
    let mut bind_values = Vec::new();
    for (column, value) in criteria {
        if matches!(value, Value::Null) {
            clauses.push(format!("{} IS NULL", quote_identifier(column)));
        } else {
            bind_values.push(value.clone());
            clauses.push(format!(
                "{} = ?{}",
                quote_identifier(column),
                bind_values.len()
            ));
        }
    }

    (format!(" WHERE {}", clauses.join(" AND ")), bind_values)
}
