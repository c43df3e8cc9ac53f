/// Persisted document shapes.
pub mod models;
/// Key-value stores holding the persisted documents.
pub mod session_store;
/// Storage abstraction layer errors.
pub mod storage;
