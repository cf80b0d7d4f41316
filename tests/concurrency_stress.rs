//! Concurrent add/list stress tests
//!
//! Regression coverage for the catalog's read-modify-write cycle: parallel
//! inserts must never overwrite each other.

use catalog_store::{CatalogBuilder, CatalogService, ImageStore};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn catalog(temp: &TempDir) -> Arc<CatalogService> {
    Arc::new(
        CatalogBuilder::new()
            .catalog_path(temp.path().join("items.json"))
            .image_dir(temp.path().join("images"))
            .build()
            .unwrap(),
    )
}

#[test]
fn test_concurrent_add_item_loses_nothing() {
    let temp = TempDir::new().unwrap();
    let catalog = catalog(&temp);
    const M: usize = 32;

    let handles: Vec<_> = (0..M)
        .map(|thread_id| {
            let catalog = catalog.clone();
            std::thread::spawn(move || {
                let payload = format!("photo-{}", thread_id);
                catalog
                    .add_item(&format!("item{}", thread_id), "bulk", payload.as_bytes())
                    .unwrap()
            })
        })
        .collect();

    let returned: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let items = catalog.get_items().unwrap();
    assert_eq!(items.len(), M);

    // every returned id points at the item that call inserted
    for item in &returned {
        assert_eq!(&items[item.id as usize - 1], item);
    }

    let names: HashSet<_> = items.iter().map(|i| i.name.clone()).collect();
    assert_eq!(names.len(), M);

    let ids: Vec<_> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, (1..=M as u64).collect::<Vec<_>>());
}

#[test]
fn test_readers_never_see_partial_catalog() {
    let temp = TempDir::new().unwrap();
    let catalog = catalog(&temp);
    let write_count = Arc::new(AtomicUsize::new(0));

    let writers: Vec<_> = (0..4)
        .map(|thread_id| {
            let catalog = catalog.clone();
            let write_count = write_count.clone();
            std::thread::spawn(move || {
                for i in 0..15 {
                    let payload: Vec<u8> = (0..64).map(|_| rand::random::<u8>()).collect();
                    catalog
                        .add_item(&format!("w{}_{}", thread_id, i), "stress", &payload)
                        .unwrap();
                    write_count.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..6)
        .map(|_| {
            let catalog = catalog.clone();
            std::thread::spawn(move || {
                let mut last_len = 0;
                for _ in 0..100 {
                    let items = catalog.get_items().unwrap();
                    // append-only: a later read never shrinks
                    assert!(items.len() >= last_len);
                    last_len = items.len();
                }
            })
        })
        .collect();

    for h in writers.into_iter().chain(readers) {
        h.join().unwrap();
    }

    assert_eq!(write_count.load(Ordering::Relaxed), 60);
    assert_eq!(catalog.get_items().unwrap().len(), 60);
}

#[test]
fn test_concurrent_identical_uploads_share_one_blob() {
    let temp = TempDir::new().unwrap();
    let catalog = catalog(&temp);

    let handles: Vec<_> = (0..16)
        .map(|thread_id| {
            let catalog = catalog.clone();
            std::thread::spawn(move || {
                catalog
                    .add_item(&format!("copy{}", thread_id), "dupes", b"same bytes")
                    .unwrap()
                    .image_name
            })
        })
        .collect();

    let names: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(names.len(), 1);
    assert!(names.contains(&ImageStore::file_name_for(b"same bytes")));

    let blobs = std::fs::read_dir(temp.path().join("images")).unwrap().count();
    assert_eq!(blobs, 1);
    assert_eq!(catalog.get_items().unwrap().len(), 16);
}
