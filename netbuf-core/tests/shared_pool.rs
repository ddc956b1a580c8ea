//! A pool shared between tasks behind an async mutex.
//!
//! The pool itself is single-threaded; every access here goes through one
//! `tokio::sync::Mutex` so acquire and release never interleave.

use std::collections::HashSet;
use std::sync::Arc;

use netbuf_core::{BufferPool, BufferTag, FrameKind};
use tokio::sync::Mutex;

const WORKERS: u32 = 8;
const ROUNDS: u32 = 200;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pool_shared_across_tasks() {
    let pool = Arc::new(Mutex::new(BufferPool::new(4, 8).unwrap()));

    let mut tasks = Vec::new();
    for worker in 0..WORKERS {
        let pool = Arc::clone(&pool);
        tasks.push(tokio::spawn(async move {
            let mut completed = 0u32;
            for round in 0..ROUNDS {
                let slot = {
                    let mut pool = pool.lock().await;
                    let Some(slot) = pool.acquire() else {
                        continue;
                    };
                    pool.write_checked(slot, &worker.to_le_bytes()).unwrap();
                    pool.buffer_mut(slot).unwrap().set_tag(BufferTag {
                        id: round,
                        frame_kind: FrameKind::Data,
                        ..BufferTag::default()
                    });
                    pool.update_counters();
                    slot
                };

                tokio::task::yield_now().await;

                let mut pool = pool.lock().await;
                let buf = pool.buffer(slot).unwrap();
                assert_eq!(buf.user_data(), &worker.to_le_bytes());
                assert_eq!(buf.tag().id, round);
                pool.release(slot).unwrap();
                completed += 1;
            }
            completed
        }));
    }

    let mut completed = 0;
    for task in tasks {
        completed += task.await.unwrap();
    }

    let pool = pool.lock().await;
    let stats = pool.stats();
    assert_eq!(pool.used_count(), 0);
    assert_eq!(pool.free_count(), 4);
    assert_eq!(stats.releases, u64::from(completed));
    assert_eq!(stats.acquisitions, u64::from(completed));
    assert_eq!(
        stats.acquisitions + stats.failed_acquisitions,
        u64::from(WORKERS * ROUNDS)
    );
    assert_eq!(stats.rejected_releases, 0);
    assert!(stats.high_water >= 1 && stats.high_water <= 4);
}

#[tokio::test]
async fn test_handles_stay_distinct_under_contention() {
    let pool = Arc::new(Mutex::new(BufferPool::new(16, 4).unwrap()));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let pool = Arc::clone(&pool);
        tasks.push(tokio::spawn(async move { pool.lock().await.acquire() }));
    }

    let mut handles = HashSet::new();
    for task in tasks {
        let slot = task.await.unwrap().expect("pool sized for every task");
        assert!(handles.insert(slot));
    }

    let mut pool = pool.lock().await;
    assert!(pool.acquire().is_none());
    for slot in handles {
        pool.release(slot).unwrap();
    }
    assert_eq!(pool.free_count(), 16);
}
