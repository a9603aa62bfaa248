//! Fixed-period polling loop.
//!
//! The next tick is scheduled only after the previous one has completed,
//! so a slow tick pushes the schedule back instead of overlapping.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Sleep `period`, run `tick` to completion, repeat.
///
/// Runs until `cancel` is triggered or `tick` returns
/// [`ControlFlow::Break`]. The first tick fires one full period after the
/// call.
pub async fn run<F, Fut>(period: Duration, cancel: CancellationToken, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ControlFlow<()>>,
{
    tracing::info!(period_ms = period.as_millis() as u64, "Status polling started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(period) => {}
        }

        let flow = tokio::select! {
            _ = cancel.cancelled() => break,
            flow = tick() => flow,
        };
        if flow.is_break() {
            break;
        }
    }

    tracing::info!("Status polling stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let counter = Arc::clone(&ticks);
        let handle = tokio::spawn(run(Duration::from_secs(30), cancel.clone(), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }
        }));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(62)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_ticks_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(Mutex::new(Vec::new()));
        let origin = Instant::now();
        let cancel = CancellationToken::new();

        let (flight, max, starts) = (
            Arc::clone(&in_flight),
            Arc::clone(&max_in_flight),
            Arc::clone(&started),
        );
        let handle = tokio::spawn(run(Duration::from_secs(30), cancel.clone(), move || {
            let (flight, max, starts) = (Arc::clone(&flight), Arc::clone(&max), Arc::clone(&starts));
            async move {
                let now = flight.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                starts.lock().unwrap().push(origin.elapsed().as_secs());
                // Slower than the polling period.
                tokio::time::sleep(Duration::from_secs(45)).await;
                flight.fetch_sub(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }
        }));

        tokio::time::sleep(Duration::from_secs(200)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(*started.lock().unwrap(), vec![30, 105, 180]);
    }

    #[tokio::test(start_paused = true)]
    async fn break_stops_the_loop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        run(Duration::from_secs(1), CancellationToken::new(), move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        })
        .await;

        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_in_flight_tick() {
        let cancel = CancellationToken::new();
        let finished = Arc::new(AtomicUsize::new(0));
        let done = Arc::clone(&finished);

        let handle = tokio::spawn(run(Duration::from_secs(1), cancel.clone(), move || {
            let done = Arc::clone(&done);
            async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                done.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }
        }));

        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
