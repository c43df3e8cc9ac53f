//! Single owner of the daily session.
//!
//! One task holds the [`Game`]; guesses, ticks and lifecycle commands are queued on a
//! channel and applied one at a time, so a guess and a tick can never interleave.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    config::GameRules,
    dates,
    error::ServiceError,
    services::{
        persistence::{RestoreSource, SessionPersistence},
        telemetry::{self, GuessTelemetry},
        timer::Ticker,
    },
    state::{
        CandidateMovie, Challenge, EventHub, Game, GamePhase, GuessOutcome, SessionEvent,
        SessionView, TickOutcome,
    },
};

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 64;

/// Commands accepted by the session owner.
#[derive(Debug)]
pub enum SessionCommand {
    /// Start the clock.
    Start(oneshot::Sender<Result<SessionView, ServiceError>>),
    /// Submit a candidate.
    Guess(CandidateMovie, oneshot::Sender<GuessOutcome>),
    /// One timer period elapsed.
    Tick,
    /// Stop the session early.
    End(oneshot::Sender<Result<SessionView, ServiceError>>),
    /// Read the current state.
    Snapshot(oneshot::Sender<SessionView>),
    /// Persist and stop the owner task.
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable front end of a running session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    events: EventHub,
    restored: RestoreSource,
}

impl SessionHandle {
    /// Restore the session for `challenge` from storage and spawn its owner task.
    pub async fn spawn(
        challenge: Challenge,
        rules: GameRules,
        persistence: SessionPersistence,
        telemetry: Arc<dyn GuessTelemetry>,
    ) -> Self {
        let restored = persistence.restore(challenge, rules).await;
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let events = EventHub::new(EVENT_BUFFER);

        info!(
            challenge_id = restored.game.challenge().id,
            phase = restored.game.phase().label(),
            source = ?restored.source,
            "session ready"
        );

        let actor = SessionActor {
            game: restored.game,
            persistence,
            telemetry,
            events: events.clone(),
            ticker: Ticker::new(),
            commands: commands.downgrade(),
        };
        tokio::spawn(actor.run(receiver));

        Self {
            commands,
            events,
            restored: restored.source,
        }
    }

    /// How the session was obtained from storage.
    pub fn restore_source(&self) -> RestoreSource {
        self.restored
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Start the clock; fails when the session is not idle.
    pub async fn start(&self) -> Result<SessionView, ServiceError> {
        self.request(SessionCommand::Start).await?
    }

    /// Submit a candidate as a guess.
    pub async fn guess(&self, candidate: CandidateMovie) -> Result<GuessOutcome, ServiceError> {
        self.request(|reply| SessionCommand::Guess(candidate, reply))
            .await
    }

    /// End the session now; fails when it is not running.
    pub async fn end(&self) -> Result<SessionView, ServiceError> {
        self.request(SessionCommand::End).await?
    }

    /// Current state.
    pub async fn snapshot(&self) -> Result<SessionView, ServiceError> {
        self.request(SessionCommand::Snapshot).await
    }

    /// Persist the session and stop its owner; later calls fail.
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        self.request(SessionCommand::Shutdown).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| closed())?;
        response.await.map_err(|_| closed())
    }
}

fn closed() -> ServiceError {
    ServiceError::InvalidState("session is closed".into())
}

struct SessionActor {
    game: Game,
    persistence: SessionPersistence,
    telemetry: Arc<dyn GuessTelemetry>,
    events: EventHub,
    ticker: Ticker,
    commands: mpsc::WeakSender<SessionCommand>,
}

impl SessionActor {
    async fn run(mut self, mut receiver: mpsc::Receiver<SessionCommand>) {
        if self.game.phase() == GamePhase::Playing {
            self.start_ticker();
        }

        while let Some(command) = receiver.recv().await {
            match command {
                SessionCommand::Start(reply) => {
                    let result = self.start().await;
                    let _ = reply.send(result);
                }
                SessionCommand::Guess(candidate, reply) => {
                    let outcome = self.guess(candidate).await;
                    let _ = reply.send(outcome);
                }
                SessionCommand::Tick => self.tick().await,
                SessionCommand::End(reply) => {
                    let result = self.end().await;
                    let _ = reply.send(result);
                }
                SessionCommand::Snapshot(reply) => {
                    let _ = reply.send(self.game.view());
                }
                SessionCommand::Shutdown(reply) => {
                    self.ticker.stop();
                    self.save().await;
                    let _ = reply.send(());
                    break;
                }
            }
        }

        self.ticker.stop();
        info!(challenge_id = self.game.challenge().id, "session owner stopped");
    }

    async fn start(&mut self) -> Result<SessionView, ServiceError> {
        let phase = self.game.start(dates::now_millis())?;

        self.save().await;
        self.start_ticker();
        self.events.broadcast(SessionEvent::PhaseChanged {
            phase,
            reason: None,
        });
        self.events.broadcast(SessionEvent::TimeUpdated {
            time_remaining: self.game.session().time_remaining,
        });
        info!(challenge_id = self.game.challenge().id, "session started");
        Ok(self.game.view())
    }

    async fn guess(&mut self, candidate: CandidateMovie) -> GuessOutcome {
        let outcome = self.game.guess(&candidate, dates::now_millis());

        self.events.broadcast(SessionEvent::GuessResolved {
            movie_id: candidate.id,
            title: candidate.title.clone(),
            outcome: outcome.clone(),
        });
        if !outcome.is_mutation() {
            debug!(movie_id = candidate.id, ?outcome, "guess had no effect");
            return outcome;
        }

        if let GuessOutcome::Correct { .. } = outcome {
            telemetry::report_guess(&self.telemetry, self.game.challenge().id, candidate.id);
        }
        self.events.broadcast(SessionEvent::TimeUpdated {
            time_remaining: self.game.session().time_remaining,
        });
        self.save().await;

        if self.game.phase() == GamePhase::Ended {
            self.finished().await;
        }
        outcome
    }

    async fn tick(&mut self) {
        match self.game.tick(dates::now_millis()) {
            TickOutcome::Ignored => {}
            TickOutcome::Running { time_remaining } => {
                self.events
                    .broadcast(SessionEvent::TimeUpdated { time_remaining });
                self.save().await;
            }
            TickOutcome::Expired => {
                self.events.broadcast(SessionEvent::TimeUpdated {
                    time_remaining: 0.0,
                });
                self.save().await;
                self.finished().await;
            }
        }
    }

    async fn end(&mut self) -> Result<SessionView, ServiceError> {
        self.game.end(dates::now_millis())?;
        self.save().await;
        self.finished().await;
        Ok(self.game.view())
    }

    async fn finished(&mut self) {
        self.ticker.stop();
        self.events.broadcast(SessionEvent::PhaseChanged {
            phase: GamePhase::Ended,
            reason: self.game.finish_reason(),
        });

        let Some(record) = self.game.completion_record(dates::now_rfc3339()) else {
            return;
        };
        info!(
            date = %record.date,
            score = record.score,
            found = record.guessed_movies.len(),
            reason = ?self.game.finish_reason(),
            "session completed"
        );
        if let Err(err) = self.persistence.complete(record.clone()).await {
            warn!(error = %err, "failed to persist completion record");
        }
        self.events.broadcast(SessionEvent::Completed(record));
    }

    async fn save(&self) {
        if let Err(err) = self.persistence.save(self.game.snapshot()).await {
            warn!(error = %err, "failed to save session snapshot");
        }
    }

    fn start_ticker(&mut self) {
        self.ticker.start(
            self.game.rules().tick_interval,
            self.commands.clone(),
            || SessionCommand::Tick,
        );
    }
}
