use crate::db::{open_db, DatabaseConfig};
use crate::error::{HelperError, HelperResult};
use crate::model::entity::Entity;
use crate::query::{quote_identifier, QueryBuilder};
use crate::repo::entity_repo::EntityRepository;
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::time::Instant;

#[derive(Debug)]
struct PendingInsert {
    table: &'static str,
    values: Vec<(&'static str, Value)>,
}

impl PendingInsert {
    fn sql(&self) -> String {
        if self.values.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES;", quote_identifier(self.table));
        }

        let columns = self
            .values
            .iter()
            .map(|(column, _)| quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.values.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders});",
            quote_identifier(self.table)
        )
    }
}

/// Unit of work over one SQLite connection.
///
/// `persist` only records the insert; nothing reaches the database until
/// [`EntityManager::flush`].
#[derive(Debug)]
pub struct EntityManager {
    conn: Connection,
    pending: Vec<PendingInsert>,
}

impl EntityManager {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            pending: Vec::new(),
        }
    }

    /// Opens the configured database, applies migrations and wraps it.
    pub fn open(config: &DatabaseConfig) -> HelperResult<Self> {
        Ok(Self::new(open_db(config)?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Validates `entity` and queues its insert.
    pub fn persist<E: Entity>(&mut self, entity: &E) -> HelperResult<()> {
        entity
            .validate()
            .map_err(|message| HelperError::Validation {
                table: E::TABLE,
                message,
            })?;

        self.pending.push(PendingInsert {
            table: E::TABLE,
            values: entity.to_values(),
        });
        Ok(())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drops queued inserts without writing them.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Writes every queued insert in one transaction.
    ///
    /// Returns generated row ids in persist order. On error the transaction
    /// is rolled back and the queue is discarded.
    pub fn flush(&mut self) -> HelperResult<Vec<i64>> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let started_at = Instant::now();
        let pending = std::mem::take(&mut self.pending);
        match write_all(&mut self.conn, &pending) {
            Ok(ids) => {
                debug!(
                    "event=flush module=manager status=ok rows={} duration_ms={}",
                    ids.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(ids)
            }
            Err(err) => {
                error!(
                    "event=flush module=manager status=error rows={} duration_ms={} error={}",
                    pending.len(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    pub fn create_query_builder(&self) -> QueryBuilder {
        QueryBuilder::new()
    }

    pub fn repository<E: Entity>(&self) -> EntityRepository<'_, E> {
        EntityRepository::new(&self.conn)
    }
}

fn write_all(conn: &mut Connection, pending: &[PendingInsert]) -> HelperResult<Vec<i64>> {
    let tx = conn.transaction()?;
    let mut ids = Vec::with_capacity(pending.len());

    for insert in pending {
        tx.execute(
            &insert.sql(),
            params_from_iter(insert.values.iter().map(|(_, value)| value)),
        )?;
        ids.push(tx.last_insert_rowid());
    }

    tx.commit()?;
    Ok(ids)
}
