//! Test database configuration.

use super::migrations::Migration;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the test database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Private in-memory database, discarded when the connection drops.
    Memory,
    /// SQLite file on disk.
    File(PathBuf),
}

/// Connection and schema settings used to bootstrap a test database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub location: DatabaseLocation,
    pub foreign_keys: bool,
    pub busy_timeout: Duration,
    /// Schema migrations, in strictly increasing `version` order.
    pub migrations: Vec<Migration>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            location: DatabaseLocation::Memory,
            foreign_keys: true,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            migrations: Vec::new(),
        }
    }
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DatabaseLocation::File(path.into()),
            ..Self::default()
        }
    }

    pub fn with_migration(mut self, version: u32, sql: &'static str) -> Self {
        self.migrations.push(Migration::new(version, sql));
        self
    }

    pub fn with_migrations(mut self, migrations: impl IntoIterator<Item = Migration>) -> Self {
        self.migrations.extend(migrations);
        self
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub(crate) fn mode(&self) -> &'static str {
        match self.location {
            DatabaseLocation::Memory => "memory",
            DatabaseLocation::File(_) => "file",
        }
    }
}
