//! Bounded concurrent execution of per-item work
//!
//! A fixed number of workers pull item indices from a shared counter until
//! the batch is exhausted. Results keep the input order, and a failed item
//! only fills its own slot.

use futures::future::join_all;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Runs `worker` over `items` with at most `concurrency` calls in flight
///
/// The returned vector has the same length and order as `items`. A
/// `concurrency` of 0 is treated as 1, and no more workers than items are
/// started.
pub async fn run_bounded<'a, T, R, E, F, Fut>(
    items: &'a [T],
    worker: F,
    concurrency: usize,
) -> Vec<Result<R, E>>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    if items.is_empty() {
        return Vec::new();
    }

    let workers = concurrency.clamp(1, items.len());
    let next = AtomicUsize::new(0);
    let next = &next;
    let worker = &worker;

    let lanes = (0..workers).map(|_| async move {
        let mut finished = Vec::new();
        loop {
            let index = next.fetch_add(1, Ordering::Relaxed);
            let Some(item) = items.get(index) else {
                break;
            };
            finished.push((index, worker(item).await));
        }
        finished
    });

    let mut results: Vec<(usize, Result<R, E>)> =
        join_all(lanes).await.into_iter().flatten().collect();
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}
