use std::future::Future;

use futures::stream::{self, StreamExt};

/// Runs `task` over `inputs` with at most `limit` futures in flight.
///
/// Every task is driven to completion before returning, even when one fails.
/// Results come back in input order and the first error in that order wins.
pub(crate) async fn fan_out<I, T, E, F, Fut>(inputs: I, limit: usize, task: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let results: Vec<Result<T, E>> = stream::iter(inputs)
        .map(task)
        .buffered(limit.max(1))
        .collect()
        .await;

    results.into_iter().collect()
}
