/// Daily challenge payloads.
pub mod challenge;
/// Autocomplete and guess statistics payloads.
pub mod search;
