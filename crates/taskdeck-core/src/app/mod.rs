//! Application layer: the three client components and their wiring.

pub mod builder;
pub mod config;
pub mod session;
pub mod sync;
pub mod uploader;

pub use self::builder::{BuildError, Client, ClientBuilder};
pub use self::config::ClientConfig;
pub use self::session::SessionManager;
pub use self::sync::{SyncProgress, TaskSync};
pub use self::uploader::{AttachmentSource, AttachmentUploader};
