use std::sync::{Arc, Barrier};
use std::thread;
use todolists_core::db::schema::list_table_exists;
use todolists_core::{ListRepository, PoolOptions, RepoError, SqliteListRepository, StorageHandle};

#[test]
fn create_schema_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let handle = StorageHandle::open(dir.path().join("lists.db"), PoolOptions::default()).unwrap();

    handle.create_schema().unwrap();
    handle.create_schema().unwrap();

    let session = handle.acquire().unwrap();
    assert!(list_table_exists(&session).unwrap());
}

#[test]
fn data_persists_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lists.db");

    let first = StorageHandle::open(&path, PoolOptions::default()).unwrap();
    first.create_schema().unwrap();
    let id = SqliteListRepository::new(first.clone()).create("durable").unwrap();
    drop(first);

    let second = StorageHandle::open(&path, PoolOptions::default()).unwrap();
    second.create_schema().unwrap();
    let loaded = SqliteListRepository::new(second).get(id).unwrap();
    assert_eq!(loaded.name, "durable");
}

#[test]
fn distinct_handles_are_isolated() {
    let first = StorageHandle::open_in_memory().unwrap();
    let second = StorageHandle::open_in_memory().unwrap();
    first.create_schema().unwrap();
    second.create_schema().unwrap();

    SqliteListRepository::new(first.clone()).create("only-in-first").unwrap();

    assert_eq!(SqliteListRepository::new(first).count().unwrap(), 1);
    assert_eq!(SqliteListRepository::new(second).count().unwrap(), 0);
}

#[test]
fn concurrent_creates_with_same_name_have_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let handle = StorageHandle::open(dir.path().join("race.db"), PoolOptions::default()).unwrap();
    handle.create_schema().unwrap();
    let repo = Arc::new(SqliteListRepository::new(handle.clone()));

    let racers = 8;
    let barrier = Arc::new(Barrier::new(racers));
    let workers: Vec<_> = (0..racers)
        .map(|_| {
            let repo = Arc::clone(&repo);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                repo.create("contested")
            })
        })
        .collect();

    let results: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(RepoError::DuplicateName(_))))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(duplicates, racers - 1);
    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(handle.outstanding_sessions(), 0);
}
