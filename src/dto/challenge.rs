use serde::Deserialize;

use crate::state::{Challenge, MovieId};

/// Challenge as served by `GET /api/challenge`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengePayload {
    /// Primary key.
    pub id: i64,
    /// Day key, sometimes serialized as a full timestamp.
    pub date: String,
    /// Actor, director or theme the movies share.
    pub prompt: String,
    /// Challenge category.
    #[serde(rename = "type")]
    pub kind: String,
    /// Answers to find; defaults to the size of the answer set.
    #[serde(default)]
    pub total_movies: Option<usize>,
    /// Accepted answers.
    pub valid_movie_ids: Vec<MovieId>,
}

impl From<ChallengePayload> for Challenge {
    fn from(value: ChallengePayload) -> Self {
        let valid_movie_ids: std::collections::HashSet<MovieId> =
            value.valid_movie_ids.into_iter().collect();
        let total_movies = value
            .total_movies
            .unwrap_or(valid_movie_ids.len())
            .min(valid_movie_ids.len());

        Self {
            id: value.id,
            date: day_part(&value.date).to_owned(),
            prompt: value.prompt,
            kind: value.kind,
            total_movies,
            valid_movie_ids,
        }
    }
}

fn day_part(date: &str) -> &str {
    date.get(..10).unwrap_or(date)
}
