//! End-to-end pool scenarios driven through the public API.

use std::collections::HashSet;

use netbuf_core::{BufferPool, BufferTag, FrameKind, NetBufError, PoolConfig};

#[test]
fn test_four_slot_pool_scenario() {
    let mut pool = BufferPool::new(4, 16).unwrap();

    let slots: Vec<_> = (0..4).map(|_| pool.acquire().unwrap()).collect();
    assert_eq!(slots.iter().collect::<HashSet<_>>().len(), 4);
    assert!(pool.acquire().is_none());

    pool.release(slots[0]).unwrap();
    assert_eq!(pool.least_recently_used(), Some(slots[1]));

    let target = slots[1];
    assert_eq!(pool.write_checked(target, &[0x5Au8; 15]).unwrap(), 15);
    assert_eq!(pool.buffer(target).unwrap().user_data_length(), 15);

    let err = pool.write_checked(target, &[0xFFu8; 17]).unwrap_err();
    assert!(matches!(err, NetBufError::PayloadTooLarge { len: 17, capacity: 16 }));
    let buf = pool.buffer(target).unwrap();
    assert_eq!(buf.user_data_length(), 15);
    assert_eq!(buf.user_data(), &[0x5Au8; 15]);
}

#[test]
fn test_released_slot_is_reacquired_first() {
    let mut pool = BufferPool::new(4, 8).unwrap();
    let a = pool.acquire().unwrap();
    let _b = pool.acquire().unwrap();
    pool.release(a).unwrap();

    assert_eq!(pool.acquire(), Some(a));
    assert_eq!(pool.most_recently_used(), Some(a));
}

#[test]
fn test_lru_eviction_loop_drains_in_acquisition_order() {
    let mut pool = BufferPool::new(6, 8).unwrap();
    let acquired: Vec<_> = (0..6).map(|_| pool.acquire().unwrap()).collect();

    let mut evicted = Vec::new();
    while let Some(lru) = pool.least_recently_used() {
        pool.release(lru).unwrap();
        evicted.push(lru);
    }

    assert_eq!(evicted, acquired);
    assert_eq!(pool.stats().slow_releases, 0);
    assert_eq!(pool.free_count(), 6);
}

#[test]
fn test_tags_survive_until_reuse() {
    let mut pool = BufferPool::new(2, 8).unwrap();
    let slot = pool.acquire().unwrap();
    let tag = BufferTag {
        if_type: 2,
        if_id: 1,
        id: 0x18DA_F110,
        frame_kind: FrameKind::Data,
    };
    pool.buffer_mut(slot).unwrap().set_tag(tag);
    pool.write_checked(slot, &[1, 2, 3]).unwrap();
    pool.release(slot).unwrap();

    // Default policy keeps the previous occupant's contents.
    let again = pool.acquire().unwrap();
    assert_eq!(again, slot);
    let buf = pool.buffer(again).unwrap();
    assert_eq!(buf.tag(), tag);
    assert_eq!(buf.user_data(), &[1u8, 2, 3]);
}

#[test]
fn test_scrub_policy_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pool.json");
    std::fs::write(
        &path,
        r#"{ "num_buffers": 2, "buffer_payload_size": 8, "scrub_on_release": true }"#,
    )
    .unwrap();

    let config = PoolConfig::from_file(&path).unwrap();
    let mut pool = BufferPool::with_config(config).unwrap();
    let slot = pool.acquire().unwrap();
    pool.write_checked(slot, b"private").unwrap();
    pool.release(slot).unwrap();

    let again = pool.acquire().unwrap();
    let buf = pool.buffer(again).unwrap();
    assert_eq!(buf.user_data_length(), 0);
    assert!(buf.is_empty());
}

#[test]
fn test_failed_release_is_a_noop() {
    let mut pool = BufferPool::new(3, 8).unwrap();
    let a = pool.acquire().unwrap();
    let b = pool.acquire().unwrap();
    pool.release(b).unwrap();

    let before: Vec<_> = pool.iter_used().collect();
    assert!(pool.release(b).is_err());
    assert_eq!(pool.iter_used().collect::<Vec<_>>(), before);
    assert_eq!(pool.least_recently_used(), Some(a));
    assert_eq!(pool.free_count() + pool.used_count(), 3);
}

#[test]
fn test_stats_snapshot() {
    let mut pool = BufferPool::new(3, 8).unwrap();
    let a = pool.acquire().unwrap();
    let b = pool.acquire().unwrap();
    let c = pool.acquire().unwrap();
    assert!(pool.acquire().is_none());
    pool.update_counters();
    pool.release(b).unwrap();
    pool.release(a).unwrap();
    pool.release(c).unwrap();
    let _ = pool.release(c);

    let stats = pool.stats();
    assert_eq!(stats.num_buffers, 3);
    assert_eq!(stats.buffer_capacity, 8);
    assert_eq!(stats.used, 0);
    assert_eq!(stats.free, 3);
    assert_eq!(stats.high_water, 3);
    assert_eq!(stats.acquisitions, 3);
    assert_eq!(stats.failed_acquisitions, 1);
    assert_eq!(stats.releases, 3);
    assert_eq!(stats.slow_releases, 1);
    assert_eq!(stats.rejected_releases, 1);
}

#[test]
fn test_deinit_then_drop() {
    let mut pool = BufferPool::new(2, 8).unwrap();
    let slot = pool.acquire().unwrap();
    pool.deinit();
    assert!(matches!(pool.buffer(slot), Err(NetBufError::Uninitialized)));
    assert_eq!(pool.stats().free, 0);
    drop(pool);
}
