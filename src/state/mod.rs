//! Session domain: the game, its phase machine, events and player stats.

/// Broadcast events emitted by the session owner.
pub mod events;
/// Challenge, session and guess resolution.
pub mod game;
/// Phase transitions.
pub mod state_machine;
/// Cross-day player statistics.
pub mod stats;

pub use self::events::{EventHub, SessionEvent};
pub use self::game::{
    CandidateMovie, Challenge, CompletionRecord, Game, GameSession, GuessOutcome, GuessedMovie,
    MovieId, SessionSnapshot, SessionView, TickOutcome, TriedMovieSet,
};
pub use self::state_machine::{FinishReason, GamePhase, InvalidTransition};
pub use self::stats::PlayerStats;
