//! Bounded fan-out/join.
//!
//! Every submitted task runs to completion: a failing task never cancels its
//! siblings. Results are only observed after all workers have joined.

use std::num::NonZeroUsize;
use std::thread;

use crossbeam_channel::{bounded, unbounded};

/// Worker count used when none is configured.
pub fn default_jobs() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Run `run` over every task on at most `jobs` threads.
///
/// Results are returned in submission order.
pub fn fan_out<T, R, F>(jobs: usize, tasks: Vec<T>, run: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let count = tasks.len();
    if count == 0 {
        return Vec::new();
    }
    let workers = jobs.clamp(1, count);

    let (task_tx, task_rx) = bounded::<(usize, T)>(workers);
    let (result_tx, result_rx) = unbounded::<(usize, R)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let run = &run;
            scope.spawn(move || {
                for (index, task) in task_rx {
                    let _ = result_tx.send((index, run(task)));
                }
            });
        }
        drop(result_tx);

        for task in tasks.into_iter().enumerate() {
            if task_tx.send(task).is_err() {
                // Every worker is gone; the scope re-raises their panic.
                break;
            }
        }
        drop(task_tx);
    });

    let mut slots: Vec<Option<R>> = (0..count).map(|_| None).collect();
    for (index, result) in result_rx.try_iter() {
        slots[index] = Some(result);
    }
    slots.into_iter().flatten().collect()
}

/// Logical AND over a fan-out group; an empty group succeeds.
pub fn all_succeeded(results: impl IntoIterator<Item = bool>) -> bool {
    results.into_iter().min().unwrap_or(true)
}
