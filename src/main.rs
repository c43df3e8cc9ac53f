//! MovieRush terminal player: loads today's challenge, restores the local session and
//! drives it from stdin.

use std::sync::Arc;

use anyhow::Context;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movierush::{
    config::AppConfig,
    dao::session_store::{FileSessionStore, MemorySessionStore, SessionStore},
    error::ServiceError,
    services::{
        api_client::ApiClient,
        challenge,
        game_service::SessionHandle,
        persistence::{RestoreSource, SessionPersistence},
        results,
        search::{SearchDebouncer, SearchUpdate},
    },
    state::{
        CandidateMovie, Challenge, CompletionRecord, FinishReason, GamePhase, GuessOutcome,
        SessionEvent,
    },
};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let client = ApiClient::new(&config.api_base_url).context("building API client")?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let Some(challenge) = load_challenge(&client, &mut input).await? else {
        return Ok(());
    };

    let store: Arc<dyn SessionStore> = match FileSessionStore::open(&config.storage_dir).await {
        Ok(store) => Arc::new(store),
        Err(err) => {
            warn!(
                dir = %config.storage_dir.display(),
                error = %err,
                "session directory unavailable; progress will not survive this run"
            );
            Arc::new(MemorySessionStore::new())
        }
    };
    let persistence = SessionPersistence::new(store);

    let handle = SessionHandle::spawn(
        challenge.clone(),
        config.rules.clone(),
        persistence.clone(),
        Arc::new(client.clone()),
    )
    .await;

    println!("MovieRush {}", challenge.date);
    println!("Name movies featuring: {}", challenge.prompt);

    let view = handle.snapshot().await?;
    match handle.restore_source() {
        RestoreSource::Completed => {
            println!("You already played today's challenge. Come back tomorrow!");
            print_summary(&CompletionRecord {
                score: view.score,
                guessed_movies: view.guessed_movies,
                date: view.date,
                timestamp: String::new(),
            });
            handle.shutdown().await?;
            return Ok(());
        }
        RestoreSource::Resumed => println!(
            "Resuming: {}/{} found, {:.0}s left.",
            view.found, view.total, view.time_remaining
        ),
        RestoreSource::Fresh => {}
    }
    if view.phase == GamePhase::Idle {
        println!(
            "Find all {} movies. Type `start` to begin, `quit` to leave.",
            view.total
        );
    }

    play(&handle, &client, &config, &mut input).await?;

    if let Err(err) = handle.shutdown().await {
        warn!(error = %err, "session did not shut down cleanly");
    }
    let stats = persistence.load_stats().await;
    info!(
        games_played = stats.games_played,
        streak = stats.current_streak,
        "goodbye"
    );
    Ok(())
}

/// Fetch today's challenge, offering a retry while the API is unreachable.
async fn load_challenge(client: &ApiClient, input: &mut Input) -> anyhow::Result<Option<Challenge>> {
    loop {
        match challenge::fetch_today(client).await {
            Ok(challenge) => return Ok(Some(challenge)),
            Err(ServiceError::NotFound(_)) => {
                println!("No challenge today. Check back tomorrow!");
                return Ok(None);
            }
            Err(err) if err.is_retryable() => {
                println!("Failed to load challenge ({err}). Retry? [Y/n]");
                let answer = input.next_line().await.context("reading stdin")?;
                match answer.as_deref().map(str::trim) {
                    None => return Ok(None),
                    Some(answer) if answer.eq_ignore_ascii_case("n") => return Ok(None),
                    Some(_) => continue,
                }
            }
            Err(err) => return Err(err).context("loading today's challenge"),
        }
    }
}

async fn play(
    handle: &SessionHandle,
    client: &ApiClient,
    config: &AppConfig,
    input: &mut Input,
) -> anyhow::Result<()> {
    let (mut debouncer, mut updates) = SearchDebouncer::new(
        Arc::new(client.clone()),
        config.rules.search_debounce,
        config.rules.min_query_len,
    );
    let mut events = handle.subscribe();
    let mut candidates: Vec<CandidateMovie> = Vec::new();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                let line = line.trim();
                match line {
                    "" => {}
                    "quit" => break,
                    "start" => match handle.start().await {
                        Ok(view) => println!("Go! {:.0}s on the clock.", view.time_remaining),
                        Err(err) => println!("Cannot start: {err}"),
                    },
                    "end" => match handle.end().await {
                        Ok(_) => {}
                        Err(err) => println!("Cannot end: {err}"),
                    },
                    _ => match line.parse::<usize>() {
                        Ok(choice) => {
                            let picked = choice.checked_sub(1).and_then(|i| candidates.get(i));
                            let Some(candidate) = picked.cloned() else {
                                println!("No candidate #{choice}.");
                                continue;
                            };
                            debouncer.dismiss();
                            candidates.clear();
                            let outcome = handle.guess(candidate.clone()).await?;
                            print_outcome(&candidate, &outcome);
                        }
                        Err(_) => debouncer.input(line),
                    },
                }
            }
            Some(update) = updates.recv() => match update {
                SearchUpdate::Results { query, candidates: found } => {
                    candidates = found;
                    if candidates.is_empty() {
                        println!("No matches for `{query}`.");
                    }
                    for (index, candidate) in candidates.iter().enumerate() {
                        let year = candidate
                            .release_date
                            .as_deref()
                            .and_then(|date| date.get(..4))
                            .unwrap_or("----");
                        println!("  {}. {} ({year})", index + 1, candidate.title);
                    }
                }
                SearchUpdate::Unavailable { query, message } => {
                    println!("Search failed ({message}). Type `{query}` again to retry.");
                }
            },
            event = events.recv() => match event {
                Ok(SessionEvent::TimeUpdated { time_remaining }) => {
                    let seconds = time_remaining.ceil() as u64;
                    if seconds > 0 && (seconds <= 5 || seconds % 10 == 0) {
                        println!("{seconds}s left");
                    }
                }
                Ok(SessionEvent::PhaseChanged { phase: GamePhase::Ended, reason }) => match reason {
                    Some(FinishReason::AllFound) => println!("You found them all!"),
                    Some(FinishReason::TimeExpired) => println!("Time's up!"),
                    Some(FinishReason::ManualStop) | None => println!("Session ended."),
                },
                Ok(SessionEvent::Completed(record)) => {
                    print_summary(&record);
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "missed session events"),
                Err(RecvError::Closed) => break,
            },
            () = &mut shutdown => {
                info!("interrupted; saving session");
                break;
            }
        }
    }

    Ok(())
}

fn print_outcome(candidate: &CandidateMovie, outcome: &GuessOutcome) {
    match outcome {
        GuessOutcome::Correct { movie, .. } => println!(
            "Correct: {} +{} points, +{}s",
            movie.title, movie.points_awarded, movie.time_bonus
        ),
        GuessOutcome::Incorrect { penalty, .. } => {
            println!("Not in this challenge: {} (-{penalty:.0}s)", candidate.title)
        }
        GuessOutcome::AlreadyFound => println!("Already found {}.", candidate.title),
        GuessOutcome::AlreadyTried => println!("Already tried {}.", candidate.title),
        GuessOutcome::Ignored => println!("Type `start` first."),
    }
}

fn print_summary(record: &CompletionRecord) {
    println!();
    for movie in results::ranked(&record.guessed_movies) {
        println!("  {:>4}  {}", movie.points_awarded, movie.title);
    }
    println!();
    println!("{}", results::share_text(record));
    if !record.guessed_movies.is_empty() {
        println!();
        println!("In the order you found them:");
        println!("{}", results::movie_list_text(&record.guessed_movies));
    }
}

/// Configure tracing subscribers; logs go to stderr so stdout stays playable.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
