//! Implementations of the backend ports (development / test adapters).

pub mod inmem_backend;

pub use inmem_backend::{InMemoryBackend, TASKS_CHANNEL, TASKS_IMAGES_BUCKET};
