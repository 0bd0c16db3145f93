use super::expected::Expected;
use super::matching::{rows_contain, rows_mention};
use crate::db::{DatabaseConfig, Migration};
use crate::error::HelperResult;
use crate::model::entity::Entity;
use crate::query::{HydratedRow, QueryBuilder, ROOT_ALIAS};
use crate::repo::entity_repo::EntityRepository;
use crate::service::entity_manager::EntityManager;
use log::info;
use std::time::Instant;

/// Database helpers mixed into a test fixture.
///
/// Implementors only provide access to an [`EntityManager`]; fixture creation
/// and the `assert_database_*` family are provided on top of it.
///
/// Assertion mismatches panic like `assert!`. Database errors and row shapes
/// that the result set cannot contain at all (a key missing from the
/// results) are returned as `Err` instead.
pub trait DatabaseTestCase {
    fn manager(&mut self) -> HelperResult<&mut EntityManager>;

    fn repository<E: Entity>(&mut self) -> HelperResult<EntityRepository<'_, E>>
    where
        Self: Sized,
    {
        Ok(self.manager()?.repository())
    }

    /// Persists and flushes `entity`, returning it with its generated id.
    fn create_one<E: Entity>(&mut self, mut entity: E) -> HelperResult<E>
    where
        Self: Sized,
    {
        let manager = self.manager()?;
        manager.persist(&entity)?;
        let ids = manager.flush()?;
        if let Some(id) = ids.last() {
            entity.assign_id(*id);
        }
        Ok(entity)
    }

    /// Default-constructs an entity, lets `customize` fill it in, then
    /// persists and flushes it.
    fn create_one_with<E, F>(&mut self, customize: F) -> HelperResult<E>
    where
        Self: Sized,
        E: Entity + Default,
        F: FnOnce(&mut E),
    {
        let mut entity = E::default();
        customize(&mut entity);
        self.create_one(entity)
    }

    /// Creates `count` entities, calling `customize` with each entity and its
    /// index, then flushes them together.
    ///
    /// A validation failure discards the whole pending queue, so no entity of
    /// the batch is written by a later flush.
    fn create_many<E, F>(&mut self, count: usize, mut customize: F) -> HelperResult<Vec<E>>
    where
        Self: Sized,
        E: Entity + Default,
        F: FnMut(&mut E, usize),
    {
        let started_at = Instant::now();
        let manager = self.manager()?;

        let mut entities = Vec::with_capacity(count);
        for index in 0..count {
            let mut entity = E::default();
            customize(&mut entity, index);
            if let Err(err) = manager.persist(&entity) {
                manager.clear();
                return Err(err);
            }
            entities.push(entity);
        }

        let ids = manager.flush()?;
        let generated = &ids[ids.len().saturating_sub(entities.len())..];
        for (entity, id) in entities.iter_mut().zip(generated) {
            entity.assign_id(*id);
        }

        info!(
            "event=fixtures_create module=fixtures status=ok table={} count={} duration_ms={}",
            E::TABLE,
            entities.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entities)
    }

    /// [`DatabaseTestCase::create_many`] without per-row customization.
    fn create_many_default<E>(&mut self, count: usize) -> HelperResult<Vec<E>>
    where
        Self: Sized,
        E: Entity + Default,
    {
        self.create_many(count, |_: &mut E, _| {})
    }

    /// Selects every `E` row, lets `customize` refine the query, and returns
    /// the rows as column-keyed maps.
    ///
    /// `customize` receives the builder and the root alias.
    fn query_results<E, F>(&mut self, customize: F) -> HelperResult<Vec<HydratedRow>>
    where
        Self: Sized,
        E: Entity,
        F: FnOnce(&mut QueryBuilder, &str),
    {
        let manager = self.manager()?;
        let mut query_builder = manager.create_query_builder();
        query_builder.select(ROOT_ALIAS).from(E::TABLE, ROOT_ALIAS);
        customize(&mut query_builder, ROOT_ALIAS);
        query_builder.get_array_result(manager.connection())
    }

    /// Non-panicking form of the assertions: whether the customized `E`
    /// query contains `expected`.
    fn database_has<E, F>(&mut self, expected: &Expected, customize: F) -> HelperResult<bool>
    where
        Self: Sized,
        E: Entity,
        F: FnOnce(&mut QueryBuilder, &str),
    {
        let rows = self.query_results::<E, F>(customize)?;
        match expected {
            Expected::Row(row) => rows_contain(row, &rows),
            Expected::Text(text) => rows_mention(text, &rows),
        }
    }

    /// Asserts that some `E` row matches `expected`.
    fn assert_database_has<E>(&mut self, expected: impl Into<Expected>) -> HelperResult<&mut Self>
    where
        Self: Sized,
        E: Entity,
    {
        self.assert_database_has_matching::<E, _>(expected, |_, _| {})
    }

    /// Asserts that some row of the customized `E` query matches `expected`.
    fn assert_database_has_matching<E, F>(
        &mut self,
        expected: impl Into<Expected>,
        customize: F,
    ) -> HelperResult<&mut Self>
    where
        Self: Sized,
        E: Entity,
        F: FnOnce(&mut QueryBuilder, &str),
    {
        let expected = expected.into();
        let found = self.database_has::<E, F>(&expected, customize)?;
        assert!(
            found,
            "Failed to assert that {} was found in database table `{}`",
            expected,
            E::TABLE
        );
        Ok(self)
    }

    /// Asserts that no `E` row matches `expected`.
    fn assert_database_not_has<E>(
        &mut self,
        expected: impl Into<Expected>,
    ) -> HelperResult<&mut Self>
    where
        Self: Sized,
        E: Entity,
    {
        self.assert_database_not_has_matching::<E, _>(expected, |_, _| {})
    }

    /// Asserts that no row of the customized `E` query matches `expected`.
    fn assert_database_not_has_matching<E, F>(
        &mut self,
        expected: impl Into<Expected>,
        customize: F,
    ) -> HelperResult<&mut Self>
    where
        Self: Sized,
        E: Entity,
        F: FnOnce(&mut QueryBuilder, &str),
    {
        let expected = expected.into();
        let found = self.database_has::<E, F>(&expected, customize)?;
        assert!(
            !found,
            "Failed to assert that {} was not found in database table `{}`",
            expected,
            E::TABLE
        );
        Ok(self)
    }
}

/// Ready-made fixture owning its database configuration.
///
/// The database is opened lazily on first use and reused afterwards.
#[derive(Debug)]
pub struct TestDatabase {
    config: DatabaseConfig,
    manager: Option<EntityManager>,
}

impl TestDatabase {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            manager: None,
        }
    }

    /// In-memory database with the given schema migrations.
    pub fn in_memory(migrations: impl IntoIterator<Item = Migration>) -> Self {
        Self::new(DatabaseConfig::in_memory().with_migrations(migrations))
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.manager.is_some()
    }
}

impl DatabaseTestCase for TestDatabase {
    fn manager(&mut self) -> HelperResult<&mut EntityManager> {
        let manager = match self.manager.take() {
            Some(manager) => manager,
            None => EntityManager::open(&self.config)?,
        };
        Ok(self.manager.insert(manager))
    }
}
