#![allow(dead_code)]

use rowassert_core::{DatabaseConfig, Entity, Migration, TestDatabase};
use rusqlite::types::Value;
use rusqlite::Row;

pub const USERS: Migration = Migration::new(
    1,
    "CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL DEFAULT '',
        age INTEGER,
        active INTEGER NOT NULL DEFAULT 1
    );",
);

pub const POSTS: Migration = Migration::new(
    2,
    "CREATE TABLE posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id),
        title TEXT NOT NULL,
        published INTEGER NOT NULL DEFAULT 0
    );",
);

pub const VISITS: Migration = Migration::new(
    3,
    "CREATE TABLE visits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        path TEXT NOT NULL DEFAULT '/',
        hits INTEGER NOT NULL DEFAULT 0
    );",
);

pub fn migrations() -> Vec<Migration> {
    vec![USERS, POSTS, VISITS]
}

pub fn test_database() -> TestDatabase {
    TestDatabase::new(DatabaseConfig::in_memory().with_migrations(migrations()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: Option<i64>,
    pub email: String,
    pub name: String,
    pub age: Option<i64>,
    pub active: bool,
}

impl User {
    pub fn new(email: &str, name: &str) -> Self {
        Self {
            id: None,
            email: email.to_string(),
            name: name.to_string(),
            age: None,
            active: true,
        }
    }

    pub fn aged(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";

    fn to_values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("email", Value::Text(self.email.clone())),
            ("name", Value::Text(self.name.clone())),
            ("age", self.age.map_or(Value::Null, Value::Integer)),
            ("active", Value::Integer(i64::from(self.active))),
        ];
        if let Some(id) = self.id {
            values.push(("id", Value::Integer(id)));
        }
        values
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            name: row.get("name")?,
            age: row.get("age")?,
            active: row.get("active")?,
        })
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), String> {
        match self.age {
            Some(age) if age < 0 => Err(format!("age must not be negative, got {age}")),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub id: Option<i64>,
    pub user_id: i64,
    pub title: String,
    pub published: bool,
}

impl Entity for Post {
    const TABLE: &'static str = "posts";

    fn to_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("user_id", Value::Integer(self.user_id)),
            ("title", Value::Text(self.title.clone())),
            ("published", Value::Integer(i64::from(self.published))),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            title: row.get("title")?,
            published: row.get("published")?,
        })
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

/// Relies entirely on column defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visit {
    pub id: Option<i64>,
}

impl Entity for Visit {
    const TABLE: &'static str = "visits";

    fn to_values(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self { id: row.get("id")? })
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}
