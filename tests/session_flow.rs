use std::{sync::Arc, time::Duration};

use movierush::{
    config::GameRules,
    dao::session_store::{MemorySessionStore, SessionStore},
    dates,
    services::{
        game_service::SessionHandle,
        persistence::{LIVE_SESSION_KEY, RestoreSource, SessionPersistence},
        results,
        telemetry::NoopTelemetry,
    },
    state::{CandidateMovie, Challenge, GamePhase, GuessOutcome, MovieId},
};

fn challenge(date: &str, valid: &[MovieId]) -> Challenge {
    Challenge {
        id: 101,
        date: date.into(),
        prompt: "Keanu Reeves".into(),
        kind: "actor".into(),
        total_movies: valid.len(),
        valid_movie_ids: valid.iter().copied().collect(),
    }
}

fn candidate(id: MovieId, vote_count: u64, vote_average: f64) -> CandidateMovie {
    CandidateMovie {
        id,
        title: format!("Movie {id}"),
        vote_count,
        vote_average,
        poster_path: None,
        release_date: Some("1999-03-31".into()),
    }
}

async fn spawn(store: &MemorySessionStore, challenge: Challenge) -> SessionHandle {
    SessionHandle::spawn(
        challenge,
        GameRules::default(),
        SessionPersistence::new(Arc::new(store.clone())),
        Arc::new(NoopTelemetry),
    )
    .await
}

/// A played session survives a restart, then blocks replays once completed.
#[tokio::test(start_paused = true)]
async fn test_resume_then_replay_prevention() {
    let today = dates::today_key();
    let store = MemorySessionStore::new();
    let rules = GameRules::default();

    let handle = spawn(&store, challenge(&today, &[603, 604, 605])).await;
    assert_eq!(handle.restore_source(), RestoreSource::Fresh);
    handle.start().await.expect("start");

    let correct = handle.guess(candidate(603, 25_000, 8.2)).await.unwrap();
    assert!(matches!(correct, GuessOutcome::Correct { finished: false, .. }));
    let wrong = handle.guess(candidate(999, 10, 5.0)).await.unwrap();
    assert!(matches!(wrong, GuessOutcome::Incorrect { .. }));
    assert_eq!(
        handle.guess(candidate(999, 10, 5.0)).await.unwrap(),
        GuessOutcome::AlreadyTried
    );

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    let before = handle.snapshot().await.unwrap();
    handle.shutdown().await.unwrap();

    // Reload: same day, same challenge.
    let handle = spawn(&store, challenge(&today, &[603, 604, 605])).await;
    assert_eq!(handle.restore_source(), RestoreSource::Resumed);
    let resumed = handle.snapshot().await.unwrap();
    assert_eq!(resumed.phase, GamePhase::Playing);
    assert_eq!(resumed.found, 1);
    assert_eq!(resumed.incorrect_count, 1);
    assert!(resumed.time_remaining <= before.time_remaining);
    assert!(resumed.time_remaining <= rules.max_time);

    // The tried set was persisted, so the remembered mistake stays free.
    assert_eq!(
        handle.guess(candidate(999, 10, 5.0)).await.unwrap(),
        GuessOutcome::AlreadyTried
    );

    let view = handle.end().await.unwrap();
    assert_eq!(view.phase, GamePhase::Ended);
    handle.shutdown().await.unwrap();

    // Clearing the live snapshot does not unlock a replay.
    store.remove(LIVE_SESSION_KEY).await.unwrap();
    let handle = spawn(&store, challenge(&today, &[603, 604, 605])).await;
    assert_eq!(handle.restore_source(), RestoreSource::Completed);
    let locked = handle.snapshot().await.unwrap();
    assert_eq!(locked.phase, GamePhase::Ended);
    assert_eq!(locked.score, view.score);
    assert!(handle.start().await.is_err());

    let stats = SessionPersistence::new(Arc::new(store.clone()))
        .load_stats()
        .await;
    assert_eq!(stats.games_played, 1);
    assert_eq!(stats.best_score, view.score);
}

/// Yesterday's unfinished snapshot never leaks into today's session.
#[tokio::test(start_paused = true)]
async fn test_stale_day_is_discarded() {
    let store = MemorySessionStore::new();
    let handle = spawn(&store, challenge("2020-01-01", &[1, 2])).await;
    handle.start().await.unwrap();
    handle.guess(candidate(1, 5, 6.0)).await.unwrap();
    handle.shutdown().await.unwrap();

    let handle = spawn(&store, challenge(&dates::today_key(), &[1, 2])).await;
    assert_eq!(handle.restore_source(), RestoreSource::Fresh);
    let view = handle.snapshot().await.unwrap();
    assert_eq!(view.phase, GamePhase::Idle);
    assert_eq!(view.found, 0);
}

/// Finding every answer ends the session immediately with a shareable summary.
#[tokio::test(start_paused = true)]
async fn test_early_completion_summary() {
    let today = dates::today_key();
    let store = MemorySessionStore::new();
    let handle = spawn(&store, challenge(&today, &[10, 20])).await;
    handle.start().await.unwrap();

    handle.guess(candidate(10, 30_000, 8.5)).await.unwrap();
    let last = handle.guess(candidate(20, 0, 0.0)).await.unwrap();
    assert!(matches!(last, GuessOutcome::Correct { finished: true, .. }));

    let view = handle.snapshot().await.unwrap();
    assert_eq!(view.phase, GamePhase::Ended);

    let persistence = SessionPersistence::new(Arc::new(store.clone()));
    let record = persistence
        .load_completion(&today)
        .await
        .expect("completion record written");
    assert_eq!(record.score, view.score);

    let ranked = results::ranked(&record.guessed_movies);
    assert_eq!(ranked[0].id, 20);
    assert_eq!(
        results::share_text(&record),
        format!(
            "MovieRush {today}\n\n{} points\n2 movies found\n\nPlay at: movierush.vercel.app",
            view.score
        )
    );
}
