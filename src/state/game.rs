use std::collections::HashSet;

use indexmap::IndexSet;
use tracing::debug;

use crate::{
    config::GameRules,
    state::state_machine::{
        FinishReason, GameEvent, GamePhase, GameStateMachine, InvalidTransition,
    },
};

/// Identifier of a movie in the metadata catalog.
pub type MovieId = u64;

/// Daily challenge produced by the generation pipeline; read-only to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    /// Primary key of the challenge.
    pub id: i64,
    /// Calendar day key (`YYYY-MM-DD`).
    pub date: String,
    /// Display text, e.g. the featured actor.
    pub prompt: String,
    /// Kind of challenge (actor, director, ...).
    pub kind: String,
    /// Size of the answer set.
    pub total_movies: usize,
    /// Every movie accepted as a correct answer.
    pub valid_movie_ids: HashSet<MovieId>,
}

impl Challenge {
    /// Whether `id` belongs to the answer set.
    pub fn is_valid(&self, id: MovieId) -> bool {
        self.valid_movie_ids.contains(&id)
    }
}

/// Search result offered to the player before it is submitted as a guess.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMovie {
    /// Catalog identifier.
    pub id: MovieId,
    /// Display title.
    pub title: String,
    /// Number of votes on the catalog.
    pub vote_count: u64,
    /// Average vote in `[0, 10]`.
    pub vote_average: f64,
    /// Poster image path, if any.
    pub poster_path: Option<String>,
    /// Release date as reported by the catalog, used for display.
    pub release_date: Option<String>,
}

/// A correct guess, recorded once and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessedMovie {
    /// Catalog identifier.
    pub id: MovieId,
    /// Display title.
    pub title: String,
    /// Poster image path, if any.
    pub poster_path: Option<String>,
    /// Points awarded when it was guessed.
    pub points_awarded: u32,
    /// Seconds added to the clock when it was guessed.
    pub time_bonus: u32,
}

/// Mutable state of one player's attempt at a daily challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    /// Day key of the challenge being played.
    pub date: String,
    /// Challenge being played.
    pub challenge_id: i64,
    /// Current lifecycle phase.
    pub phase: GamePhase,
    /// Epoch milliseconds at start.
    pub started_at: Option<i64>,
    /// Epoch milliseconds at end.
    pub completed_at: Option<i64>,
    /// Correctly guessed movies; always a subset of the valid answers.
    pub guessed_movie_ids: IndexSet<MovieId>,
    /// Number of distinct incorrect guesses.
    pub incorrect_count: u32,
    /// Seconds left, within `[0, max_time]`.
    pub time_remaining: f64,
    /// Sum of awarded points, set once the session ends.
    pub final_score: Option<u32>,
}

impl GameSession {
    /// Fresh idle session for a challenge.
    pub fn idle(challenge: &Challenge, rules: &GameRules) -> Self {
        Self {
            date: challenge.date.clone(),
            challenge_id: challenge.id,
            phase: GamePhase::Idle,
            started_at: None,
            completed_at: None,
            guessed_movie_ids: IndexSet::new(),
            incorrect_count: 0,
            time_remaining: sanitize_time(rules.initial_time, rules.max_time),
            final_score: None,
        }
    }
}

/// Every movie attempted during the current session, correct or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriedMovieSet(IndexSet<MovieId>);

impl TriedMovieSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` was already attempted.
    pub fn contains(&self, id: MovieId) -> bool {
        self.0.contains(&id)
    }

    /// Record an attempt; returns `false` when it was already present.
    pub fn insert(&mut self, id: MovieId) -> bool {
        self.0.insert(id)
    }

    /// Forget every attempt.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Number of attempts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was attempted yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Attempts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = MovieId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<MovieId> for TriedMovieSet {
    fn from_iter<I: IntoIterator<Item = MovieId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything needed to resume a session after a reload.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Session state.
    pub session: GameSession,
    /// Correct guesses in insertion order.
    pub guessed_movies: Vec<GuessedMovie>,
    /// Attempted identifiers.
    pub tried: TriedMovieSet,
}

/// Completion record written once a day's session ends; blocks replays.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRecord {
    /// Final score.
    pub score: u32,
    /// Correct guesses in insertion order.
    pub guessed_movies: Vec<GuessedMovie>,
    /// Day key of the completed challenge.
    pub date: String,
    /// RFC 3339 completion timestamp.
    pub timestamp: String,
}

/// Read-only summary handed to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    /// Display text of the challenge.
    pub prompt: String,
    /// Day key of the challenge.
    pub date: String,
    /// Current phase.
    pub phase: GamePhase,
    /// Seconds left.
    pub time_remaining: f64,
    /// Number of answers found.
    pub found: usize,
    /// Size of the answer set.
    pub total: usize,
    /// Points so far (final score once ended).
    pub score: u32,
    /// Distinct incorrect guesses.
    pub incorrect_count: u32,
    /// Correct guesses in insertion order.
    pub guessed_movies: Vec<GuessedMovie>,
}

/// Result of submitting a candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    /// Session is not accepting guesses.
    Ignored,
    /// Movie was already found; nothing changes.
    AlreadyFound,
    /// Movie was already tried and rejected; nothing changes.
    AlreadyTried,
    /// New correct answer.
    Correct {
        /// Record appended to the guessed list.
        movie: GuessedMovie,
        /// Whether this guess completed the answer set.
        finished: bool,
    },
    /// New incorrect answer.
    Incorrect {
        /// Seconds removed from the clock.
        penalty: f64,
        /// Whether the penalty emptied the clock.
        finished: bool,
    },
}

impl GuessOutcome {
    /// Whether the outcome changed the session.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            GuessOutcome::Correct { .. } | GuessOutcome::Incorrect { .. }
        )
    }
}

/// Result of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Session is not running.
    Ignored,
    /// Clock decremented.
    Running {
        /// Seconds left.
        time_remaining: f64,
    },
    /// Clock reached zero and the session ended.
    Expired,
}

/// A challenge together with the session played against it.
#[derive(Debug, Clone)]
pub struct Game {
    challenge: Challenge,
    rules: GameRules,
    machine: GameStateMachine,
    session: GameSession,
    guessed_movies: Vec<GuessedMovie>,
    tried: TriedMovieSet,
}

impl Game {
    /// Idle game for a freshly loaded challenge.
    pub fn new(challenge: Challenge, rules: GameRules) -> Self {
        let session = GameSession::idle(&challenge, &rules);
        Self {
            challenge,
            rules,
            machine: GameStateMachine::new(),
            session,
            guessed_movies: Vec::new(),
            tried: TriedMovieSet::new(),
        }
    }

    /// Resume a saved session. Guesses outside the answer set are dropped and the
    /// clock is clamped so a tampered snapshot cannot break the invariants.
    pub fn resume(challenge: Challenge, rules: GameRules, snapshot: SessionSnapshot) -> Self {
        let SessionSnapshot {
            mut session,
            guessed_movies,
            tried,
        } = snapshot;

        session
            .guessed_movie_ids
            .retain(|id| challenge.valid_movie_ids.contains(id));
        let guessed_movies = guessed_movies
            .into_iter()
            .filter(|movie| session.guessed_movie_ids.contains(&movie.id))
            .collect();
        session.time_remaining = sanitize_time(session.time_remaining, rules.max_time);

        Self {
            machine: GameStateMachine::resume(session.phase),
            challenge,
            rules,
            session,
            guessed_movies,
            tried,
        }
    }

    /// Rebuild a finished game straight from its completion record.
    pub fn from_completion(challenge: Challenge, rules: GameRules, record: CompletionRecord) -> Self {
        let mut session = GameSession::idle(&challenge, &rules);
        session.phase = GamePhase::Ended;
        session.time_remaining = 0.0;
        session.guessed_movie_ids = record.guessed_movies.iter().map(|movie| movie.id).collect();
        session.final_score = Some(record.score);

        Self {
            tried: record.guessed_movies.iter().map(|movie| movie.id).collect(),
            machine: GameStateMachine::resume(GamePhase::Ended),
            challenge,
            rules,
            session,
            guessed_movies: record.guessed_movies,
        }
    }

    /// Challenge being played.
    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    /// Rules in effect.
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Session state.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Correct guesses in insertion order.
    pub fn guessed_movies(&self) -> &[GuessedMovie] {
        &self.guessed_movies
    }

    /// Attempted identifiers.
    pub fn tried(&self) -> &TriedMovieSet {
        &self.tried
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.machine.phase()
    }

    /// Why the session ended, when it ended during this run.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.machine.snapshot().finish_reason
    }

    /// Sum of all awarded points so far.
    pub fn total_score(&self) -> u32 {
        self.guessed_movies
            .iter()
            .map(|movie| movie.points_awarded)
            .sum()
    }

    /// Clone the persisted part of the game.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.session.clone(),
            guessed_movies: self.guessed_movies.clone(),
            tried: self.tried.clone(),
        }
    }

    /// Summary for observers.
    pub fn view(&self) -> SessionView {
        SessionView {
            prompt: self.challenge.prompt.clone(),
            date: self.challenge.date.clone(),
            phase: self.phase(),
            time_remaining: self.session.time_remaining,
            found: self.session.guessed_movie_ids.len(),
            total: self.challenge.total_movies,
            score: self.session.final_score.unwrap_or_else(|| self.total_score()),
            incorrect_count: self.session.incorrect_count,
            guessed_movies: self.guessed_movies.clone(),
        }
    }

    /// Completion record for an ended session.
    pub fn completion_record(&self, timestamp: String) -> Option<CompletionRecord> {
        if self.phase() != GamePhase::Ended {
            return None;
        }

        Some(CompletionRecord {
            score: self.session.final_score.unwrap_or_else(|| self.total_score()),
            guessed_movies: self.guessed_movies.clone(),
            date: self.session.date.clone(),
            timestamp,
        })
    }

    /// Start the clock.
    pub fn start(&mut self, now_ms: i64) -> Result<GamePhase, InvalidTransition> {
        let next = self.machine.apply(GameEvent::Start)?;

        self.session.phase = next;
        self.session.started_at = Some(now_ms);
        self.session.completed_at = None;
        self.session.time_remaining = sanitize_time(self.rules.initial_time, self.rules.max_time);
        self.session.guessed_movie_ids.clear();
        self.session.incorrect_count = 0;
        self.session.final_score = None;
        self.guessed_movies.clear();
        self.tried.clear();

        debug!(
            challenge_id = self.challenge.id,
            time_remaining = self.session.time_remaining,
            "session started"
        );
        Ok(next)
    }

    /// Submit a candidate as a guess.
    pub fn guess(&mut self, candidate: &CandidateMovie, now_ms: i64) -> GuessOutcome {
        if self.phase() != GamePhase::Playing {
            return GuessOutcome::Ignored;
        }
        if self.session.guessed_movie_ids.contains(&candidate.id) {
            return GuessOutcome::AlreadyFound;
        }
        if !self.tried.insert(candidate.id) {
            return GuessOutcome::AlreadyTried;
        }

        if self.challenge.is_valid(candidate.id) {
            let bonus = self
                .rules
                .time_bonus
                .bonus(candidate.vote_count, candidate.vote_average);
            let points = self
                .rules
                .scoring
                .points(candidate.vote_count, candidate.vote_average);
            let movie = GuessedMovie {
                id: candidate.id,
                title: candidate.title.clone(),
                poster_path: candidate.poster_path.clone(),
                points_awarded: points,
                time_bonus: bonus,
            };

            self.guessed_movies.push(movie.clone());
            self.session.guessed_movie_ids.insert(candidate.id);
            self.session.time_remaining = sanitize_time(
                self.session.time_remaining + f64::from(bonus),
                self.rules.max_time,
            );

            let finished = self.session.guessed_movie_ids.len() >= self.challenge.total_movies;
            if finished {
                self.conclude(FinishReason::AllFound, now_ms);
            }

            debug!(movie_id = candidate.id, points, bonus, finished, "correct guess");
            GuessOutcome::Correct { movie, finished }
        } else {
            let penalty = self.rules.time_penalty;
            self.session.incorrect_count += 1;
            self.session.time_remaining =
                sanitize_time(self.session.time_remaining - penalty, self.rules.max_time);

            let finished = self.session.time_remaining <= 0.0;
            if finished {
                self.conclude(FinishReason::TimeExpired, now_ms);
            }

            debug!(movie_id = candidate.id, penalty, finished, "incorrect guess");
            GuessOutcome::Incorrect { penalty, finished }
        }
    }

    /// Advance the clock by one tick.
    pub fn tick(&mut self, now_ms: i64) -> TickOutcome {
        if self.phase() != GamePhase::Playing {
            return TickOutcome::Ignored;
        }

        self.session.time_remaining = sanitize_time(
            self.session.time_remaining - self.rules.tick_decrement,
            self.rules.max_time,
        );

        if self.session.time_remaining <= 0.0 {
            self.conclude(FinishReason::TimeExpired, now_ms);
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                time_remaining: self.session.time_remaining,
            }
        }
    }

    /// Stop the session at the player's request.
    pub fn end(&mut self, now_ms: i64) -> Result<GamePhase, InvalidTransition> {
        self.finish(FinishReason::ManualStop, now_ms)
    }

    /// Finish from inside `playing`, where the transition cannot be refused.
    fn conclude(&mut self, reason: FinishReason, now_ms: i64) {
        if let Err(err) = self.finish(reason, now_ms) {
            debug!(error = %err, ?reason, "finish refused by the state machine");
        }
    }

    fn finish(&mut self, reason: FinishReason, now_ms: i64) -> Result<GamePhase, InvalidTransition> {
        let next = self.machine.apply(GameEvent::Finish(reason))?;

        if reason == FinishReason::TimeExpired {
            self.session.time_remaining = 0.0;
        }
        self.session.phase = next;
        self.session.completed_at = Some(now_ms);
        self.session.final_score = Some(self.total_score());

        debug!(
            challenge_id = self.challenge.id,
            ?reason,
            score = self.total_score(),
            "session finished"
        );
        Ok(next)
    }
}

fn sanitize_time(value: f64, max_time: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max_time.max(0.0))
    }
}
