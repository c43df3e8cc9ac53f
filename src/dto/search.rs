use serde::{Deserialize, Serialize};

use crate::state::{CandidateMovie, MovieId};

/// Body of `POST /api/autocomplete`.
#[derive(Debug, Clone, Serialize)]
pub struct AutocompleteRequest<'a> {
    /// Raw text typed by the player.
    pub query: &'a str,
}

/// Response of `POST /api/autocomplete`.
#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteResponse {
    /// Hits, most relevant first; absent means none.
    #[serde(default)]
    pub results: Vec<CandidatePayload>,
}

/// One search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidatePayload {
    /// Catalog identifier.
    pub id: MovieId,
    /// Display title.
    pub title: String,
    /// `YYYY-MM-DD`; may be empty.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Relative poster path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Number of ratings.
    #[serde(default)]
    pub vote_count: u64,
    /// Mean rating out of ten.
    #[serde(default)]
    pub vote_average: f64,
}

impl From<CandidatePayload> for CandidateMovie {
    fn from(value: CandidatePayload) -> Self {
        Self {
            id: value.id,
            title: value.title,
            vote_count: value.vote_count,
            vote_average: value.vote_average,
            poster_path: value.poster_path,
            release_date: value.release_date.filter(|date| !date.is_empty()),
        }
    }
}

/// Body of `POST /api/stats/record-guess`.
#[derive(Debug, Clone, Serialize)]
pub struct RecordGuessRequest {
    /// Challenge the guess belongs to.
    pub challenge_id: i64,
    /// Correctly guessed movie.
    pub tmdb_id: MovieId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_votes_default_to_zero() {
        let response: AutocompleteResponse = serde_json::from_str(
            r#"{"results":[{"id":603,"title":"The Matrix","release_date":"","poster_path":null,"popularity":80.1}]}"#,
        )
        .unwrap();

        let candidate = CandidateMovie::from(response.results[0].clone());
        assert_eq!(candidate.vote_count, 0);
        assert_eq!(candidate.vote_average, 0.0);
        assert_eq!(candidate.release_date, None);
    }

    #[test]
    fn record_guess_uses_snake_case() {
        let body = serde_json::to_value(RecordGuessRequest {
            challenge_id: 3,
            tmdb_id: 603,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"challenge_id": 3, "tmdb_id": 603}));
    }
}
