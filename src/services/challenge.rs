use futures::future::BoxFuture;
use tracing::info;

use crate::{dates, error::ServiceError, state::Challenge};

/// Producer of daily challenges.
pub trait ChallengeSource: Send + Sync {
    /// Challenge published for `date`, `None` when there is none.
    fn fetch_challenge(
        &self,
        date: &str,
    ) -> BoxFuture<'static, Result<Option<Challenge>, ServiceError>>;
}

/// Challenge for the local calendar day.
pub async fn fetch_today(source: &dyn ChallengeSource) -> Result<Challenge, ServiceError> {
    fetch_for(source, &dates::today_key()).await
}

/// Challenge for `date`; a missing or answerless challenge maps to
/// [`ServiceError::NotFound`], a malformed day key to [`ServiceError::InvalidInput`].
pub async fn fetch_for(source: &dyn ChallengeSource, date: &str) -> Result<Challenge, ServiceError> {
    if dates::parse_day_key(date).is_none() {
        return Err(ServiceError::InvalidInput(format!(
            "`{date}` is not a YYYY-MM-DD day key"
        )));
    }
    let Some(challenge) = source.fetch_challenge(date).await? else {
        return Err(ServiceError::NotFound(format!("no challenge for {date}")));
    };

    if challenge.valid_movie_ids.is_empty() || challenge.total_movies == 0 {
        return Err(ServiceError::NotFound(format!(
            "challenge `{}` for {date} has no answers",
            challenge.id
        )));
    }

    info!(
        challenge_id = challenge.id,
        date,
        total_movies = challenge.total_movies,
        "challenge loaded"
    );
    Ok(challenge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future;

    struct Fixed(Option<Challenge>);

    impl ChallengeSource for Fixed {
        fn fetch_challenge(
            &self,
            _date: &str,
        ) -> BoxFuture<'static, Result<Option<Challenge>, ServiceError>> {
            Box::pin(future::ready(Ok(self.0.clone())))
        }
    }

    struct Down;

    impl ChallengeSource for Down {
        fn fetch_challenge(
            &self,
            _date: &str,
        ) -> BoxFuture<'static, Result<Option<Challenge>, ServiceError>> {
            Box::pin(future::ready(Err(ServiceError::Unavailable(
                "connection refused".into(),
            ))))
        }
    }

    fn challenge(valid: &[u64]) -> Challenge {
        Challenge {
            id: 4,
            date: "2026-01-19".into(),
            prompt: "Meryl Streep".into(),
            kind: "actor".into(),
            total_movies: valid.len(),
            valid_movie_ids: valid.iter().copied().collect(),
        }
    }

    #[tokio::test]
    async fn missing_challenge_is_not_found() {
        let err = fetch_for(&Fixed(None), "2026-01-19").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn challenge_without_answers_is_not_found() {
        let err = fetch_for(&Fixed(Some(challenge(&[]))), "2026-01-19")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_day_key_is_invalid_input() {
        let err = fetch_for(&Fixed(Some(challenge(&[1]))), "19/01/2026")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn unavailable_source_is_retryable() {
        let err = fetch_today(&Down).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn published_challenge_is_returned() {
        let loaded = fetch_for(&Fixed(Some(challenge(&[1, 2]))), "2026-01-19")
            .await
            .unwrap();
        assert_eq!(loaded.total_movies, 2);
    }
}
