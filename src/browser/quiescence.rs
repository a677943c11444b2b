use anyhow::{anyhow, Result};
use futures_util::{stream, Stream, StreamExt};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Network activity observed on a page, keyed by request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Started(String),
    /// Finished, failed or served from cache; the request is no longer in flight.
    Finished(String),
}

/// Merges per-kind event streams into one.
///
/// The merge interleaves its inputs, so a request's `Finished` may be yielded
/// before its `Started`; [`wait_for_quiescence`] accounts for that.
pub fn merge_network_events<A, B, C>(
    started: A,
    finished: B,
    failed: C,
) -> impl Stream<Item = NetworkEvent>
where
    A: Stream<Item = NetworkEvent>,
    B: Stream<Item = NetworkEvent>,
    C: Stream<Item = NetworkEvent>,
{
    stream::select(started, stream::select(finished, failed))
}

/// Resolves once no request has been in flight for a full `window`.
///
/// The window restarts on every event. Request ids are never reused once
/// finished, so a `Started` arriving after its `Finished` is ignored. If the
/// stream ends while requests are still outstanding the page went away
/// mid-load, which is an error. This function never times out on its own;
/// callers wrap it in a deadline.
pub async fn wait_for_quiescence<S>(events: S, window: Duration) -> Result<()>
where
    S: Stream<Item = NetworkEvent>,
{
    let mut events = std::pin::pin!(events);
    let mut in_flight: HashSet<String> = HashSet::new();
    let mut finished: HashSet<String> = HashSet::new();

    loop {
        let next = if in_flight.is_empty() {
            match tokio::time::timeout(window, events.next()).await {
                Ok(next) => next,
                Err(_) => {
                    debug!("Network idle for {:?}", window);
                    return Ok(());
                }
            }
        } else {
            events.next().await
        };

        match next {
            Some(NetworkEvent::Started(id)) => {
                if !finished.contains(&id) {
                    in_flight.insert(id);
                }
            }
            Some(NetworkEvent::Finished(id)) => {
                in_flight.remove(&id);
                finished.insert(id);
            }
            None if in_flight.is_empty() => return Ok(()),
            None => {
                return Err(anyhow!(
                    "page closed with {} requests still in flight",
                    in_flight.len()
                ))
            }
        }
    }
}
