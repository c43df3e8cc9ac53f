use thiserror::Error;

/// Lifecycle phases of a daily session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Challenge loaded, clock not started.
    Idle,
    /// Clock running, guesses accepted.
    Playing,
    /// Terminal: read-only.
    Ended,
}

impl GamePhase {
    /// Lowercase label shared with the persisted representation.
    pub fn label(self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Playing => "playing",
            GamePhase::Ended => "ended",
        }
    }
}

/// Indicates why a session reached [`GamePhase::Ended`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Every valid answer was found.
    AllFound,
    /// The clock ran out, through ticks or a penalty.
    TimeExpired,
    /// The player stopped the session.
    ManualStop,
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Player starts today's challenge.
    Start,
    /// Session reached its end.
    Finish(FinishReason),
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: GamePhase,
    /// The event that cannot be applied from this phase.
    pub event: GameEvent,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: GamePhase,
    /// Version number of the state machine (increments on each transition).
    pub version: usize,
    /// Why the session ended, once it has.
    pub finish_reason: Option<FinishReason>,
}

/// Monotonic phase machine: idle → playing → ended.
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    phase: GamePhase,
    version: usize,
    finish_reason: Option<FinishReason>,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self {
            phase: GamePhase::Idle,
            version: 0,
            finish_reason: None,
        }
    }
}

impl GameStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a machine sitting in `phase`, e.g. after restoring a snapshot.
    pub fn resume(phase: GamePhase) -> Self {
        Self {
            phase,
            ..Self::default()
        }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
            finish_reason: self.finish_reason,
        }
    }

    /// Apply an event, returning the new phase.
    pub fn apply(&mut self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        if let GameEvent::Finish(reason) = event {
            self.finish_reason = Some(reason);
        }
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (GamePhase::Idle, GameEvent::Start) => GamePhase::Playing,
            (GamePhase::Playing, GameEvent::Finish(_)) => GamePhase::Ended,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle() {
        let sm = GameStateMachine::new();
        assert_eq!(sm.phase(), GamePhase::Idle);
        assert_eq!(sm.snapshot().version, 0);
    }

    #[test]
    fn full_happy_path() {
        let mut sm = GameStateMachine::new();
        assert_eq!(sm.apply(GameEvent::Start), Ok(GamePhase::Playing));
        assert_eq!(
            sm.apply(GameEvent::Finish(FinishReason::AllFound)),
            Ok(GamePhase::Ended)
        );

        let snapshot = sm.snapshot();
        assert_eq!(snapshot.version, 2);
        assert_eq!(snapshot.finish_reason, Some(FinishReason::AllFound));
    }

    #[test]
    fn phases_never_move_backwards() {
        let mut sm = GameStateMachine::new();
        sm.apply(GameEvent::Start).unwrap();
        sm.apply(GameEvent::Finish(FinishReason::ManualStop)).unwrap();

        let err = sm.apply(GameEvent::Start).unwrap_err();
        assert_eq!(err.from, GamePhase::Ended);
        assert_eq!(err.event, GameEvent::Start);
        assert_eq!(sm.phase(), GamePhase::Ended);
    }

    #[test]
    fn cannot_finish_before_starting() {
        let mut sm = GameStateMachine::new();
        let err = sm
            .apply(GameEvent::Finish(FinishReason::TimeExpired))
            .unwrap_err();
        assert_eq!(err.from, GamePhase::Idle);
        assert_eq!(sm.snapshot().version, 0);
    }

    #[test]
    fn resumed_machine_keeps_phase() {
        let mut sm = GameStateMachine::resume(GamePhase::Playing);
        assert_eq!(sm.phase(), GamePhase::Playing);
        assert!(sm.apply(GameEvent::Start).is_err());
        assert_eq!(
            sm.apply(GameEvent::Finish(FinishReason::TimeExpired)),
            Ok(GamePhase::Ended)
        );
    }
}
