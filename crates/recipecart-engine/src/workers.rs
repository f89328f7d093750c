//! # Bounded Worker Groups
//!
//! Spawn-all, join-all execution with a cap on tasks in flight.
//!
//! ```text
//! inputs:  [a] [b] [c] [d] [e]        concurrency = 2
//!
//! spawn a, spawn b ── full ── join one ── spawn c ── full ── join one ...
//!                                                                │
//!                                    drain remaining ◄───────────┘
//!
//! slots:   [Ra][Rb][Rc][Rd][Re]       each task writes only its own slot
//! ```
//!
//! Results come back in input order regardless of completion order. A slot
//! stays `None` if its task panicked. Dropping the returned future aborts
//! every task still in flight.

use std::future::Future;
use tokio::task::{JoinError, JoinSet};
use tracing::{warn, Instrument};

/// Runs `work` over `inputs` with at most `concurrency` tasks at once.
pub async fn join_bounded<I, R, F, Fut>(
    inputs: Vec<I>,
    concurrency: usize,
    work: F,
) -> Vec<Option<R>>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    let concurrency = concurrency.max(1);
    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(inputs.len()).collect();
    let mut tasks = JoinSet::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let job = work(input);
        tasks.spawn(async move { (index, job.await) }.in_current_span());

        if tasks.len() >= concurrency {
            if let Some(joined) = tasks.join_next().await {
                fill(&mut slots, joined);
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        fill(&mut slots, joined);
    }

    slots
}

fn fill<R>(slots: &mut [Option<R>], joined: Result<(usize, R), JoinError>) {
    match joined {
        Ok((index, value)) => {
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(value);
            }
        }
        Err(e) => warn!(error = %e, "Worker task did not complete"),
    }
}
