//! Work queue ordering, isolation and shutdown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spoolguard_queue::{QueueStats, WorkQueue};

#[tokio::test]
async fn test_actions_run_in_submission_order() {
    let queue = WorkQueue::spawn();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for index in 0..20u32 {
        let seen = Arc::clone(&seen);
        assert!(queue.enqueue(format!("push-{index}"), move || async move {
            // Earlier actions sleep longer; ordering must still hold.
            tokio::time::sleep(Duration::from_millis(u64::from(20 - index))).await;
            seen.lock().unwrap().push(index);
            Ok(())
        }));
    }
    queue.stop().await;

    assert_eq!(*seen.lock().unwrap(), (0..20).collect::<Vec<_>>());
    assert_eq!(
        queue.stats(),
        QueueStats {
            enqueued: 20,
            completed: 20,
            failed: 0
        }
    );
}

#[tokio::test]
async fn test_failure_and_panic_do_not_halt_consumer() {
    let queue = WorkQueue::spawn();
    let ran = Arc::new(AtomicUsize::new(0));

    queue.enqueue("fails", || async { anyhow::bail!("spooler unavailable") });
    queue.enqueue("panics", || async { panic!("boom") });
    let counter = Arc::clone(&ran);
    queue.enqueue("after", move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    queue.stop().await;

    assert_eq!(ran.load(Ordering::SeqCst), 1);
    let stats = queue.stats();
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending(), 0);
}

#[tokio::test]
async fn test_stop_is_idempotent_and_rejects_new_work() {
    let queue = WorkQueue::spawn();
    assert!(!queue.is_stopped());
    queue.stop().await;
    queue.stop().await;
    assert!(queue.is_stopped());
    assert!(!queue.enqueue("late", || async { Ok(()) }));
    assert_eq!(queue.stats().enqueued, 0);
}

#[tokio::test]
async fn test_stop_drains_pending_actions() {
    let queue = Arc::new(WorkQueue::spawn());
    let ran = Arc::new(AtomicUsize::new(0));
    for _ in 0..5 {
        let ran = Arc::clone(&ran);
        queue.enqueue("slow", move || async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }

    let first = tokio::spawn({
        let queue = Arc::clone(&queue);
        async move { queue.stop().await }
    });
    queue.stop().await;
    first.await.unwrap();

    assert_eq!(ran.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_enqueue_from_blocking_thread() {
    let queue = Arc::new(WorkQueue::spawn());
    let ran = Arc::new(AtomicUsize::new(0));
    let producer = {
        let queue = Arc::clone(&queue);
        let ran = Arc::clone(&ran);
        std::thread::spawn(move || {
            queue.enqueue("from-thread", move || async move {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
    };
    assert!(producer.join().unwrap());
    queue.stop().await;
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}
