use serde::{Deserialize, Serialize};

use crate::state::{
    CompletionRecord, GamePhase, GameSession, GuessedMovie, MovieId, PlayerStats,
    SessionSnapshot, TriedMovieSet,
};

/// Persisted phase label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhaseEntity {
    /// Not started.
    Idle,
    /// Clock running.
    Playing,
    /// Finished.
    Ended,
}

/// Session state as stored under the live snapshot key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameStateEntity {
    /// Day key of the challenge.
    pub date: String,
    /// Challenge identifier.
    pub challenge_id: i64,
    /// Lifecycle phase.
    pub phase: PhaseEntity,
    /// Epoch milliseconds at start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    /// Epoch milliseconds at end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    /// Correctly guessed identifiers.
    pub guessed_movie_ids: Vec<MovieId>,
    /// Distinct incorrect guesses.
    pub incorrect_count: u32,
    /// Seconds left.
    pub time_remaining: f64,
    /// Final score once ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<u32>,
}

/// Correct guess as stored in snapshots and completion records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuessedMovieEntity {
    /// Catalog identifier.
    pub id: MovieId,
    /// Display title.
    pub title: String,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Points awarded.
    pub points_awarded: u32,
    /// Seconds granted.
    pub time_bonus: u32,
}

/// Document stored under the live snapshot key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshotEntity {
    /// Session state.
    pub game_state: GameStateEntity,
    /// Correct guesses in insertion order.
    pub guessed_movies: Vec<GuessedMovieEntity>,
    /// Every attempted identifier.
    #[serde(default)]
    pub tried_movie_ids: Vec<MovieId>,
}

/// Document stored under the per-day completion key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecordEntity {
    /// Always `true`; records without it are ignored.
    pub completed: bool,
    /// Final score.
    pub score: u32,
    /// Number of movies found.
    pub movies_found: usize,
    /// Correct guesses.
    pub guessed_movies: Vec<GuessedMovieEntity>,
    /// Day key.
    pub date: String,
    /// RFC 3339 completion timestamp.
    pub timestamp: String,
}

/// Long-running player statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsEntity {
    /// Completed daily sessions.
    pub games_played: u32,
    /// Sum of final scores.
    pub total_score: u64,
    /// Best final score.
    pub best_score: u32,
    /// Consecutive days played.
    pub current_streak: u32,
    /// Day key of the last completed session.
    #[serde(default)]
    pub last_played: String,
}

impl From<PhaseEntity> for GamePhase {
    fn from(value: PhaseEntity) -> Self {
        match value {
            PhaseEntity::Idle => GamePhase::Idle,
            PhaseEntity::Playing => GamePhase::Playing,
            PhaseEntity::Ended => GamePhase::Ended,
        }
    }
}

impl From<GamePhase> for PhaseEntity {
    fn from(value: GamePhase) -> Self {
        match value {
            GamePhase::Idle => PhaseEntity::Idle,
            GamePhase::Playing => PhaseEntity::Playing,
            GamePhase::Ended => PhaseEntity::Ended,
        }
    }
}

impl From<GuessedMovieEntity> for GuessedMovie {
    fn from(value: GuessedMovieEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            poster_path: value.poster_path,
            points_awarded: value.points_awarded,
            time_bonus: value.time_bonus,
        }
    }
}

impl From<GuessedMovie> for GuessedMovieEntity {
    fn from(value: GuessedMovie) -> Self {
        Self {
            id: value.id,
            title: value.title,
            poster_path: value.poster_path,
            points_awarded: value.points_awarded,
            time_bonus: value.time_bonus,
        }
    }
}

impl From<GameStateEntity> for GameSession {
    fn from(value: GameStateEntity) -> Self {
        Self {
            date: value.date,
            challenge_id: value.challenge_id,
            phase: value.phase.into(),
            started_at: value.started_at,
            completed_at: value.completed_at,
            guessed_movie_ids: value.guessed_movie_ids.into_iter().collect(),
            incorrect_count: value.incorrect_count,
            time_remaining: value.time_remaining,
            final_score: value.final_score,
        }
    }
}

impl From<GameSession> for GameStateEntity {
    fn from(value: GameSession) -> Self {
        Self {
            date: value.date,
            challenge_id: value.challenge_id,
            phase: value.phase.into(),
            started_at: value.started_at,
            completed_at: value.completed_at,
            guessed_movie_ids: value.guessed_movie_ids.into_iter().collect(),
            incorrect_count: value.incorrect_count,
            time_remaining: value.time_remaining,
            final_score: value.final_score,
        }
    }
}

impl From<SessionSnapshotEntity> for SessionSnapshot {
    fn from(value: SessionSnapshotEntity) -> Self {
        Self {
            session: value.game_state.into(),
            guessed_movies: value.guessed_movies.into_iter().map(Into::into).collect(),
            tried: value.tried_movie_ids.into_iter().collect::<TriedMovieSet>(),
        }
    }
}

impl From<SessionSnapshot> for SessionSnapshotEntity {
    fn from(value: SessionSnapshot) -> Self {
        Self {
            game_state: value.session.into(),
            guessed_movies: value.guessed_movies.into_iter().map(Into::into).collect(),
            tried_movie_ids: value.tried.iter().collect(),
        }
    }
}

impl From<CompletionRecordEntity> for CompletionRecord {
    fn from(value: CompletionRecordEntity) -> Self {
        Self {
            score: value.score,
            guessed_movies: value.guessed_movies.into_iter().map(Into::into).collect(),
            date: value.date,
            timestamp: value.timestamp,
        }
    }
}

impl From<CompletionRecord> for CompletionRecordEntity {
    fn from(value: CompletionRecord) -> Self {
        Self {
            completed: true,
            score: value.score,
            movies_found: value.guessed_movies.len(),
            guessed_movies: value.guessed_movies.into_iter().map(Into::into).collect(),
            date: value.date,
            timestamp: value.timestamp,
        }
    }
}

impl From<PlayerStatsEntity> for PlayerStats {
    fn from(value: PlayerStatsEntity) -> Self {
        Self {
            games_played: value.games_played,
            total_score: value.total_score,
            best_score: value.best_score,
            current_streak: value.current_streak,
            last_played: value.last_played,
        }
    }
}

impl From<PlayerStats> for PlayerStatsEntity {
    fn from(value: PlayerStats) -> Self {
        Self {
            games_played: value.games_played,
            total_score: value.total_score,
            best_score: value.best_score,
            current_streak: value.current_streak,
            last_played: value.last_played,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let entity = SessionSnapshotEntity {
            game_state: GameStateEntity {
                date: "2026-01-19".into(),
                challenge_id: 3,
                phase: PhaseEntity::Playing,
                started_at: Some(10),
                completed_at: None,
                guessed_movie_ids: vec![603],
                incorrect_count: 1,
                time_remaining: 27.0,
                final_score: None,
            },
            guessed_movies: vec![GuessedMovieEntity {
                id: 603,
                title: "The Matrix".into(),
                poster_path: None,
                points_awarded: 5,
                time_bonus: 3,
            }],
            tried_movie_ids: vec![603, 12],
        };

        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["gameState"]["phase"], "playing");
        assert_eq!(value["gameState"]["challengeId"], 3);
        assert_eq!(value["gameState"]["guessedMovieIds"], json!([603]));
        assert!(value["gameState"].get("completedAt").is_none());
        assert_eq!(value["guessedMovies"][0]["points_awarded"], 5);
        assert_eq!(value["triedMovieIds"], json!([603, 12]));
    }

    #[test]
    fn snapshot_without_tried_ids_still_parses() {
        let raw = r#"{
            "gameState": {
                "date": "2020-01-01",
                "challengeId": 1,
                "phase": "playing",
                "timeRemaining": 30,
                "guessedMovieIds": [],
                "incorrectCount": 0
            },
            "guessedMovies": []
        }"#;

        let entity: SessionSnapshotEntity = serde_json::from_str(raw).unwrap();
        let snapshot: SessionSnapshot = entity.into();
        assert_eq!(snapshot.session.phase, GamePhase::Playing);
        assert!(snapshot.tried.is_empty());
    }

    #[test]
    fn completion_record_counts_movies() {
        let record = CompletionRecord {
            score: 120,
            guessed_movies: vec![GuessedMovie {
                id: 1,
                title: "Speed".into(),
                poster_path: Some("/speed.jpg".into()),
                points_awarded: 120,
                time_bonus: 5,
            }],
            date: "2026-01-19".into(),
            timestamp: "2026-01-19T21:00:00Z".into(),
        };

        let entity = CompletionRecordEntity::from(record.clone());
        assert!(entity.completed);
        assert_eq!(entity.movies_found, 1);
        assert_eq!(CompletionRecord::from(entity), record);
    }
}
