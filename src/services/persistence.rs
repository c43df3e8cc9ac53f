//! Live snapshot, completion records and player stats on top of a [`SessionStore`].
//!
//! Reads fail soft: a missing, unreadable or corrupt value is logged and treated as
//! absent so a broken store can never block a player from a fresh session.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::{
    config::GameRules,
    dao::{
        models::{CompletionRecordEntity, PlayerStatsEntity, SessionSnapshotEntity},
        session_store::SessionStore,
        storage::StorageError,
    },
    dates,
    error::ServiceError,
    state::{Challenge, CompletionRecord, Game, GamePhase, PlayerStats, SessionSnapshot},
};

/// Key of the continuously overwritten live snapshot.
pub const LIVE_SESSION_KEY: &str = "movierush_game";
/// Key of the player statistics document.
pub const STATS_KEY: &str = "movierush_stats";

/// Key of the completion record for a calendar day.
pub fn completion_key(date: &str) -> String {
    format!("game_{date}")
}

/// Where a restored game came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    /// Nothing usable was stored; the game is idle.
    Fresh,
    /// Today's live snapshot was resumed.
    Resumed,
    /// Today's challenge was already completed; the game is read-only.
    Completed,
}

/// A game rebuilt from storage.
#[derive(Debug, Clone)]
pub struct Restored {
    /// The game, in whatever phase storage dictates.
    pub game: Game,
    /// How it was obtained.
    pub source: RestoreSource,
}

/// Persistence gateway used by the session owner.
#[derive(Clone)]
pub struct SessionPersistence {
    store: Arc<dyn SessionStore>,
}

impl SessionPersistence {
    /// Wrap a store backend.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Overwrite the live snapshot.
    pub async fn save(&self, snapshot: SessionSnapshot) -> Result<(), ServiceError> {
        self.write(LIVE_SESSION_KEY, &SessionSnapshotEntity::from(snapshot))
            .await
    }

    /// Read the live snapshot; `None` when missing or unusable.
    pub async fn load(&self) -> Option<SessionSnapshot> {
        self.read::<SessionSnapshotEntity>(LIVE_SESSION_KEY)
            .await
            .map(Into::into)
    }

    /// Remove the live snapshot.
    pub async fn clear(&self) -> Result<(), ServiceError> {
        self.store.remove(LIVE_SESSION_KEY).await?;
        Ok(())
    }

    /// Write the completion record for the record's day.
    pub async fn save_completion(&self, record: CompletionRecord) -> Result<(), ServiceError> {
        let key = completion_key(&record.date);
        self.write(&key, &CompletionRecordEntity::from(record)).await
    }

    /// Read the completion record for `date`; records not flagged completed are ignored.
    pub async fn load_completion(&self, date: &str) -> Option<CompletionRecord> {
        let entity = self
            .read::<CompletionRecordEntity>(&completion_key(date))
            .await?;
        if !entity.completed {
            debug!(date, "ignoring completion record without completed flag");
            return None;
        }
        Some(entity.into())
    }

    /// Current player stats, empty when none were stored.
    pub async fn load_stats(&self) -> PlayerStats {
        self.read::<PlayerStatsEntity>(STATS_KEY)
            .await
            .map(Into::into)
            .unwrap_or_default()
    }

    /// Fold a completed session into the stats; a day already recorded is skipped.
    pub async fn record_stats(&self, record: &CompletionRecord) -> Result<PlayerStats, ServiceError> {
        let mut stats = self.load_stats().await;
        if stats.record(&record.date, record.score) {
            self.write(STATS_KEY, &PlayerStatsEntity::from(stats.clone()))
                .await?;
            info!(
                date = %record.date,
                streak = stats.current_streak,
                games_played = stats.games_played,
                "player stats updated"
            );
        }
        Ok(stats)
    }

    /// Persist everything that follows from a finished session.
    pub async fn complete(&self, record: CompletionRecord) -> Result<PlayerStats, ServiceError> {
        self.save_completion(record.clone()).await?;
        self.record_stats(&record).await
    }

    /// Rebuild the game for `challenge` from storage.
    ///
    /// A completion record for the challenge's day always wins and yields an ended
    /// game. A live snapshot from another day or challenge is discarded. An ended
    /// snapshot whose completion record is missing gets the record written now.
    pub async fn restore(&self, challenge: Challenge, rules: GameRules) -> Restored {
        if let Some(record) = self.load_completion(&challenge.date).await {
            info!(date = %challenge.date, score = record.score, "challenge already completed today");
            return Restored {
                game: Game::from_completion(challenge, rules, record),
                source: RestoreSource::Completed,
            };
        }

        let Some(snapshot) = self.load().await else {
            return Restored {
                game: Game::new(challenge, rules),
                source: RestoreSource::Fresh,
            };
        };

        if snapshot.session.date != challenge.date
            || snapshot.session.challenge_id != challenge.id
        {
            info!(
                stored_date = %snapshot.session.date,
                date = %challenge.date,
                "discarding stale session snapshot"
            );
            if let Err(err) = self.clear().await {
                warn!(error = %err, "failed to remove stale session snapshot");
            }
            return Restored {
                game: Game::new(challenge, rules),
                source: RestoreSource::Fresh,
            };
        }

        let game = Game::resume(challenge, rules, snapshot);
        if game.phase() != GamePhase::Ended {
            info!(phase = game.phase().label(), "resumed session snapshot");
            return Restored {
                game,
                source: RestoreSource::Resumed,
            };
        }

        if let Some(record) = game.completion_record(dates::now_rfc3339()) {
            info!(date = %record.date, "writing missing completion record");
            if let Err(err) = self.complete(record).await {
                warn!(error = %err, "failed to write completion record on restore");
            }
        }
        Restored {
            game,
            source: RestoreSource::Completed,
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ServiceError> {
        let json = serde_json::to_string(value).map_err(StorageError::from)?;
        self.store.put(key, json).await?;
        Ok(())
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "failed to read stored value; treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "corrupt stored value; treating as absent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::session_store::MemorySessionStore,
        state::{CandidateMovie, MovieId},
    };

    const NOW: i64 = 1_760_000_000_000;

    fn challenge(date: &str, valid: &[MovieId]) -> Challenge {
        Challenge {
            id: 11,
            date: date.into(),
            prompt: "Tom Hanks".into(),
            kind: "actor".into(),
            total_movies: valid.len(),
            valid_movie_ids: valid.iter().copied().collect(),
        }
    }

    fn candidate(id: MovieId) -> CandidateMovie {
        CandidateMovie {
            id,
            title: format!("Movie {id}"),
            vote_count: 120,
            vote_average: 6.5,
            poster_path: Some(format!("/{id}.jpg")),
            release_date: None,
        }
    }

    fn persistence() -> (MemorySessionStore, SessionPersistence) {
        let store = MemorySessionStore::new();
        let persistence = SessionPersistence::new(Arc::new(store.clone()));
        (store, persistence)
    }

    #[tokio::test]
    async fn snapshot_round_trips() {
        let (_, persistence) = persistence();
        let mut game = Game::new(challenge("2026-01-19", &[1, 2]), GameRules::default());
        game.start(NOW).unwrap();
        game.guess(&candidate(1), NOW);
        game.guess(&candidate(9), NOW);

        persistence.save(game.snapshot()).await.unwrap();
        assert_eq!(persistence.load().await, Some(game.snapshot()));
    }

    #[tokio::test]
    async fn corrupt_snapshot_reads_as_absent() {
        let (store, persistence) = persistence();
        store
            .put(LIVE_SESSION_KEY, "{not json".into())
            .await
            .unwrap();

        assert!(persistence.load().await.is_none());
        let restored = persistence
            .restore(challenge("2026-01-19", &[1]), GameRules::default())
            .await;
        assert_eq!(restored.source, RestoreSource::Fresh);
        assert_eq!(restored.game.phase(), GamePhase::Idle);
    }

    #[tokio::test]
    async fn completion_record_blocks_replay() {
        let (store, persistence) = persistence();
        let mut game = Game::new(challenge("2026-01-19", &[1, 2]), GameRules::default());
        game.start(NOW).unwrap();
        game.guess(&candidate(1), NOW);
        game.end(NOW).unwrap();
        let record = game.completion_record("2026-01-19T20:00:00Z".into()).unwrap();
        persistence.complete(record.clone()).await.unwrap();
        persistence.clear().await.unwrap();

        let restored = persistence
            .restore(challenge("2026-01-19", &[1, 2]), GameRules::default())
            .await;
        assert_eq!(restored.source, RestoreSource::Completed);
        assert_eq!(restored.game.phase(), GamePhase::Ended);
        assert_eq!(restored.game.session().final_score, Some(record.score));
        assert!(store.get("game_2026-01-19").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn stale_snapshot_is_discarded() {
        let (store, persistence) = persistence();
        let mut game = Game::new(challenge("2026-01-18", &[1, 2]), GameRules::default());
        game.start(NOW).unwrap();
        persistence.save(game.snapshot()).await.unwrap();

        let restored = persistence
            .restore(challenge("2026-01-19", &[1, 2]), GameRules::default())
            .await;
        assert_eq!(restored.source, RestoreSource::Fresh);
        assert_eq!(restored.game.phase(), GamePhase::Idle);
        assert!(store.get(LIVE_SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ended_snapshot_without_record_gets_one() {
        let (_, persistence) = persistence();
        let mut game = Game::new(challenge("2026-01-19", &[1, 2]), GameRules::default());
        game.start(NOW).unwrap();
        game.guess(&candidate(2), NOW);
        game.end(NOW).unwrap();
        persistence.save(game.snapshot()).await.unwrap();

        let restored = persistence
            .restore(challenge("2026-01-19", &[1, 2]), GameRules::default())
            .await;
        assert_eq!(restored.source, RestoreSource::Completed);
        let record = persistence.load_completion("2026-01-19").await.unwrap();
        assert_eq!(record.score, game.total_score());
        assert_eq!(persistence.load_stats().await.games_played, 1);
    }

    #[tokio::test]
    async fn record_without_completed_flag_is_ignored() {
        let (store, persistence) = persistence();
        store
            .put(
                "game_2026-01-19",
                r#"{"completed":false,"score":1,"moviesFound":0,"guessedMovies":[],"date":"2026-01-19","timestamp":"x"}"#.into(),
            )
            .await
            .unwrap();

        assert!(persistence.load_completion("2026-01-19").await.is_none());
    }

    #[tokio::test]
    async fn stats_are_recorded_once_per_day() {
        let (_, persistence) = persistence();
        let record = CompletionRecord {
            score: 90,
            guessed_movies: Vec::new(),
            date: "2026-01-19".into(),
            timestamp: "2026-01-19T20:00:00Z".into(),
        };

        persistence.record_stats(&record).await.unwrap();
        let stats = persistence.record_stats(&record).await.unwrap();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.total_score, 90);
        assert_eq!(persistence.load_stats().await, stats);
    }
}
