use std::sync::Arc;

use futures::future::{self, BoxFuture};
use tracing::{debug, warn};

use crate::{error::ServiceError, state::MovieId};

/// Best-effort sink counting guesses per challenge.
pub trait GuessTelemetry: Send + Sync {
    /// Count one guess of `movie_id` on `challenge_id`.
    fn record_guess(
        &self,
        challenge_id: i64,
        movie_id: MovieId,
    ) -> BoxFuture<'static, Result<(), ServiceError>>;
}

/// Sink that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl GuessTelemetry for NoopTelemetry {
    fn record_guess(
        &self,
        _challenge_id: i64,
        _movie_id: MovieId,
    ) -> BoxFuture<'static, Result<(), ServiceError>> {
        Box::pin(future::ready(Ok(())))
    }
}

/// Fire and forget: failures are logged and never reach gameplay.
pub fn report_guess(sink: &Arc<dyn GuessTelemetry>, challenge_id: i64, movie_id: MovieId) {
    let pending = sink.record_guess(challenge_id, movie_id);
    tokio::spawn(async move {
        match pending.await {
            Ok(()) => debug!(challenge_id, movie_id, "guess recorded"),
            Err(err) => warn!(challenge_id, movie_id, error = %err, "failed to record guess"),
        }
    });
}
