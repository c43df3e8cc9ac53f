//! Library crate for movierush, a daily timed movie-guessing game, exposing the
//! session engine for the terminal player and integration tests.

pub mod config;
pub mod dao;
pub mod dates;
mod dto;
pub mod error;
pub mod scoring;
pub mod services;
pub mod state;
