use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use scheduler::{CancellationToken, PeriodicTask};

#[tokio::test(start_paused = true)]
async fn fires_immediately_then_every_period() {
    let count = Arc::new(AtomicU64::new(0));
    let cancel = CancellationToken::new();

    let c = count.clone();
    let handle = PeriodicTask::new("refresh", Duration::from_secs(20)).spawn(cancel.clone(), move || {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
        }
    });

    // First tick completes immediately.
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);

    tokio::time::sleep(Duration::from_secs(40)).await;
    assert_eq!(count.load(Ordering::SeqCst), 4);

    cancel.cancel();
    assert_eq!(handle.await.unwrap(), 4);
}

#[tokio::test(start_paused = true)]
async fn slow_cycle_skips_missed_ticks() {
    let count = Arc::new(AtomicU64::new(0));
    let cancel = CancellationToken::new();

    let c = count.clone();
    let handle = PeriodicTask::new("slow", Duration::from_secs(1)).spawn(cancel.clone(), move || {
        let c = c.clone();
        async move {
            // Overruns three periods.
            tokio::time::sleep(Duration::from_millis(3_500)).await;
            c.fetch_add(1, Ordering::SeqCst);
        }
    });

    tokio::time::sleep(Duration::from_millis(7_100)).await;
    cancel.cancel();
    let cycles = handle.await.unwrap();

    // No burst of catch-up cycles: at most one cycle per 3.5s.
    assert!(cycles <= 3, "cycles = {cycles}");
    assert!(count.load(Ordering::SeqCst) >= 2);
}

#[tokio::test(start_paused = true)]
async fn cycle_that_fails_internally_does_not_stop_schedule() {
    let count = Arc::new(AtomicU64::new(0));
    let cancel = CancellationToken::new();

    let c = count.clone();
    let handle = PeriodicTask::new("flaky", Duration::from_secs(1)).spawn(cancel.clone(), move || {
        let c = c.clone();
        async move {
            let n = c.fetch_add(1, Ordering::SeqCst);
            let outcome: Result<(), &str> = if n % 2 == 0 { Err("db down") } else { Ok(()) };
            if let Err(e) = outcome {
                tracing::warn!(error = e, "cycle failed");
            }
        }
    });

    tokio::time::sleep(Duration::from_millis(4_500)).await;
    cancel.cancel();

    assert_eq!(handle.await.unwrap(), 5);
}
