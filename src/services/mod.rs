/// HTTP client for the remote game API.
#[cfg(feature = "http-client")]
pub mod api_client;
/// Daily challenge retrieval.
pub mod challenge;
/// Session owner task and its handle.
pub mod game_service;
/// Snapshot, completion record and stats persistence.
pub mod persistence;
/// End-of-session summary helpers.
pub mod results;
/// Debounced candidate search.
pub mod search;
/// Best-effort guess statistics.
pub mod telemetry;
/// Periodic tick producer.
pub mod timer;
