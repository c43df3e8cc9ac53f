//! Text helpers for the end-of-session summary.

use crate::state::{CompletionRecord, GuessedMovie};

const SHARE_URL: &str = "movierush.vercel.app";

/// Guessed movies by points, highest first; ties keep guess order.
pub fn ranked(movies: &[GuessedMovie]) -> Vec<GuessedMovie> {
    let mut ranked = movies.to_vec();
    ranked.sort_by(|a, b| b.points_awarded.cmp(&a.points_awarded));
    ranked
}

/// Shareable summary of a completed day.
pub fn share_text(record: &CompletionRecord) -> String {
    format!(
        "MovieRush {}\n\n{} points\n{} movies found\n\nPlay at: {SHARE_URL}",
        record.date,
        record.score,
        record.guessed_movies.len()
    )
}

/// One title per line, in the given order.
pub fn movie_list_text(movies: &[GuessedMovie]) -> String {
    movies
        .iter()
        .map(|movie| movie.title.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
