use tokio::sync::broadcast;

use crate::state::{
    game::{CompletionRecord, GuessOutcome, MovieId},
    state_machine::{FinishReason, GamePhase},
};

/// Notifications emitted by the session owner after each update.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Phase changed.
    PhaseChanged {
        /// New phase.
        phase: GamePhase,
        /// Set when the new phase is [`GamePhase::Ended`] during this run.
        reason: Option<FinishReason>,
    },
    /// A submitted candidate was resolved.
    GuessResolved {
        /// Candidate identifier.
        movie_id: MovieId,
        /// Candidate title.
        title: String,
        /// What happened.
        outcome: GuessOutcome,
    },
    /// Clock changed through a tick, a bonus or a penalty.
    TimeUpdated {
        /// Seconds left.
        time_remaining: f64,
    },
    /// Session ended and its completion record was produced.
    Completed(CompletionRecord),
}

/// Simple broadcast hub wrapper used to fan out session events.
pub struct EventHub {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}

impl Clone for EventHub {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
