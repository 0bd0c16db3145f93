mod common;

use common::{migrations, Post, User, Visit};
use rowassert_core::{DatabaseConfig, EntityManager, HelperError};
use rusqlite::types::Value;

fn manager() -> EntityManager {
    EntityManager::open(&DatabaseConfig::in_memory().with_migrations(migrations())).unwrap()
}

#[test]
fn persist_defers_writes_until_flush() {
    let mut manager = manager();

    manager.persist(&User::new("ada@example.com", "Ada")).unwrap();
    assert_eq!(manager.pending_count(), 1);
    assert_eq!(manager.repository::<User>().count(&[]).unwrap(), 0);

    let ids = manager.flush().unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(manager.pending_count(), 0);
    assert_eq!(manager.repository::<User>().count(&[]).unwrap(), 1);
}

#[test]
fn flush_returns_ids_in_persist_order() {
    let mut manager = manager();
    manager.persist(&User::new("a@example.com", "A")).unwrap();
    manager.persist(&User::new("b@example.com", "B")).unwrap();
    manager.persist(&Visit::default()).unwrap();

    let ids = manager.flush().unwrap();
    assert_eq!(ids, vec![1, 2, 1]);

    let second = manager.repository::<User>().find(ids[1]).unwrap().unwrap();
    assert_eq!(second.email, "b@example.com");
}

#[test]
fn empty_flush_is_a_no_op() {
    let mut manager = manager();
    assert!(manager.flush().unwrap().is_empty());
}

#[test]
fn failed_flush_rolls_back_and_discards_queue() {
    let mut manager = manager();
    manager.persist(&User::new("dup@example.com", "First")).unwrap();
    manager.persist(&User::new("dup@example.com", "Second")).unwrap();

    let err = manager.flush().unwrap_err();
    assert!(matches!(err, HelperError::Db(_)));
    assert_eq!(manager.pending_count(), 0);
    assert_eq!(manager.repository::<User>().count(&[]).unwrap(), 0);
}

#[test]
fn persist_rejects_invalid_entity() {
    let mut manager = manager();

    let err = manager
        .persist(&User::new("young@example.com", "Young").aged(-1))
        .unwrap_err();
    match err {
        HelperError::Validation { table, message } => {
            assert_eq!(table, "users");
            assert!(message.contains("negative"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(manager.pending_count(), 0);
}

#[test]
fn clear_drops_pending_inserts() {
    let mut manager = manager();
    manager.persist(&User::new("gone@example.com", "Gone")).unwrap();
    manager.clear();

    assert!(manager.flush().unwrap().is_empty());
    assert_eq!(manager.repository::<User>().count(&[]).unwrap(), 0);
}

#[test]
fn repository_finds_by_criteria() {
    let mut manager = manager();
    manager.persist(&User::new("a@example.com", "Ada").aged(36)).unwrap();
    manager.persist(&User::new("b@example.com", "Bob")).unwrap();
    manager.persist(&User::new("c@example.com", "Cy").aged(36)).unwrap();
    manager.flush().unwrap();

    let repo = manager.repository::<User>();

    let same_age = repo.find_by(&[("age", Value::Integer(36))]).unwrap();
    let names: Vec<_> = same_age.iter().map(|user| user.name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Cy"]);

    let unknown_age = repo.find_one_by(&[("age", Value::Null)]).unwrap().unwrap();
    assert_eq!(unknown_age.email, "b@example.com");

    assert_eq!(repo.count(&[("age", Value::Integer(36))]).unwrap(), 2);
    assert_eq!(repo.find_all().unwrap().len(), 3);
    assert!(repo.find(99).unwrap().is_none());
}

#[test]
fn foreign_key_violation_surfaces_on_flush() {
    let mut manager = manager();
    manager
        .persist(&Post {
            user_id: 404,
            title: "orphan".to_string(),
            ..Post::default()
        })
        .unwrap();

    assert!(matches!(manager.flush(), Err(HelperError::Db(_))));
}
