//! Drives one summary request to a terminal state.

use std::time::Duration;

use futures_util::StreamExt;
use sift_search::NormalizedHit;
use tokio_util::sync::CancellationToken;

use super::error::SummaryError;
use super::provider::SummaryProvider;
use super::state::{SummaryAccumulator, SummaryState};
use super::{SUMMARY_FAILED_MESSAGE, build_prompt};

enum Step<T> {
    Cancelled,
    Ready(T),
}

/// Wait for `fut`, the idle timeout, or cancellation, whichever comes first.
async fn step<T>(
    cancel: &CancellationToken,
    idle_timeout: Duration,
    fut: impl Future<Output = T>,
) -> Step<Result<T, SummaryError>> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Step::Cancelled,
        result = tokio::time::timeout(idle_timeout, fut) => Step::Ready(result.map_err(|_| {
            SummaryError::TimeoutError(format!("no data within {}s", idle_timeout.as_secs_f32()))
        })),
    }
}

/// Build the prompt, stream the answer and report every state change.
///
/// `on_state` sees `Loading`, then one `Streaming` per non-empty fragment,
/// then `Done` or `Failed`. Any provider, transport or timeout failure is
/// logged and reported as `Failed` with [`SUMMARY_FAILED_MESSAGE`].
///
/// Once `cancel` fires nothing more is reported and `None` is returned;
/// dropping the stream closes the underlying response. Otherwise the
/// terminal state is returned.
pub async fn stream_summary<P>(
    provider: &P,
    query: &str,
    hits: &[NormalizedHit],
    cancel: &CancellationToken,
    idle_timeout: Duration,
    mut on_state: impl FnMut(SummaryState),
) -> Option<SummaryState>
where
    P: SummaryProvider + ?Sized,
{
    if cancel.is_cancelled() {
        return None;
    }
    on_state(SummaryState::Loading);

    let prompt = build_prompt(query, hits);
    let fail = |err: SummaryError, fragments: usize| {
        tracing::error!(
            provider = provider.name(),
            code = err.code(),
            fragments,
            "summary failed: {}",
            err.message()
        );
        SummaryState::Failed(SUMMARY_FAILED_MESSAGE.to_owned())
    };

    let mut stream = match step(cancel, idle_timeout, provider.stream(&prompt)).await {
        Step::Cancelled => return None,
        Step::Ready(Ok(Ok(stream))) => stream,
        Step::Ready(Ok(Err(err)) | Err(err)) => {
            let failed = fail(err, 0);
            on_state(failed.clone());
            return Some(failed);
        }
    };

    let mut accumulator = SummaryAccumulator::new();
    let terminal = loop {
        match step(cancel, idle_timeout, stream.next()).await {
            Step::Cancelled => {
                tracing::debug!(
                    fragments = accumulator.fragments(),
                    "summary superseded, dropping stream"
                );
                return None;
            }
            Step::Ready(Ok(Some(Ok(fragment)))) => {
                if accumulator.push(&fragment) {
                    on_state(accumulator.streaming());
                }
            }
            Step::Ready(Ok(None)) => {
                tracing::debug!(
                    provider = provider.name(),
                    fragments = accumulator.fragments(),
                    chars = accumulator.as_str().len(),
                    "summary complete"
                );
                break accumulator.finish();
            }
            Step::Ready(Ok(Some(Err(err))) | Err(err)) => {
                break fail(err, accumulator.fragments());
            }
        }
    };

    if cancel.is_cancelled() {
        return None;
    }
    on_state(terminal.clone());
    Some(terminal)
}
