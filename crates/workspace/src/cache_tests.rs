// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use harbor_core::test_support::nightly_repository;
use harbor_core::{snapshot_id, Repository};
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

fn key() -> OriginKey {
    OriginKey::new("0123456789abcdef")
}

fn snapshot(version: u64, repos: Vec<Repository>) -> Arc<LocationSnapshot> {
    Arc::new(LocationSnapshot::new(key(), "etl", repos, version))
}

#[test]
fn publishes_and_reads() {
    let cache = SnapshotCache::new();
    assert!(cache.get(&key()).is_none());

    let first = snapshot(1, vec![nightly_repository("R")]);
    cache.publish(&key(), Arc::clone(&first)).unwrap();
    assert_eq!(cache.get(&key()).unwrap().version, 1);
    assert!(cache.is_current(&key(), &first.snapshot_id));
    assert_eq!(cache.keys(), vec![key()]);
}

#[test]
fn rejects_non_monotonic_versions() {
    let cache = SnapshotCache::new();
    cache.publish(&key(), snapshot(2, vec![])).unwrap();

    let err = cache.publish(&key(), snapshot(2, vec![])).unwrap_err();
    assert_eq!(
        err,
        PublishError::Stale {
            key: key(),
            offered: 2,
            current: 2
        }
    );
    assert!(cache.publish(&key(), snapshot(1, vec![])).is_err());
    assert!(cache.publish(&key(), snapshot(3, vec![])).is_ok());
}

#[test]
fn rejects_snapshot_for_other_origin() {
    let cache = SnapshotCache::new();
    let other = Arc::new(LocationSnapshot::new(OriginKey::new("ffff"), "x", vec![], 1));
    assert!(matches!(
        cache.publish(&key(), other),
        Err(PublishError::KeyMismatch { .. })
    ));
}

#[test]
fn old_holders_detect_staleness() {
    let cache = SnapshotCache::new();
    let old = snapshot(1, vec![nightly_repository("R")]);
    cache.publish(&key(), Arc::clone(&old)).unwrap();
    cache
        .publish(&key(), snapshot(2, vec![nightly_repository("R"), nightly_repository("S")]))
        .unwrap();

    assert!(!cache.is_current(&key(), &old.snapshot_id));
    // The old Arc is still whole
    assert_eq!(old.repository_names(), ["R"]);
}

#[test]
fn remove_clears_the_origin() {
    let cache = SnapshotCache::new();
    cache.publish(&key(), snapshot(1, vec![])).unwrap();
    assert!(cache.remove(&key()).is_some());
    assert!(cache.is_empty());
    // A fresh slot may start counting again
    assert!(cache.publish(&key(), snapshot(1, vec![])).is_ok());
}

#[test]
fn readers_never_see_a_partial_snapshot() {
    let cache = Arc::new(SnapshotCache::new());
    cache.publish(&key(), snapshot(1, vec![nightly_repository("A")])).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                let mut last = 0;
                while !done.load(Ordering::SeqCst) {
                    let s = cache.get(&key()).unwrap();
                    assert_eq!(s.snapshot_id, snapshot_id(&s.repositories));
                    assert_eq!(s.repositories.len() as u64, s.version);
                    assert!(s.version >= last);
                    last = s.version;
                }
            })
        })
        .collect();

    for version in 2..=60u64 {
        let repos = (0..version).map(|i| nightly_repository(&format!("R{}", i))).collect();
        cache.publish(&key(), snapshot(version, repos)).unwrap();
    }
    done.store(true, Ordering::SeqCst);
    for reader in readers {
        reader.join().unwrap();
    }
}

proptest! {
    #[test]
    fn current_version_is_the_highest_accepted(versions in proptest::collection::vec(1u64..50, 1..30)) {
        let cache = SnapshotCache::new();
        let mut highest = 0;
        for v in versions {
            let accepted = cache.publish(&key(), snapshot(v, vec![])).is_ok();
            prop_assert_eq!(accepted, v > highest);
            highest = highest.max(v);
            prop_assert_eq!(cache.get(&key()).unwrap().version, highest);
        }
    }
}
