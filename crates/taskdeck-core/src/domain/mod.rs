//! Domain model (IDs, records, sessions, change events, errors).

pub mod errors;
pub mod events;
pub mod ids;
pub mod session;
pub mod task;

pub use self::errors::{AuthError, QueryError, UploadError};
pub use self::events::{FeedStatus, TaskChange};
pub use self::ids::{TaskId, UserId};
pub use self::session::Session;
pub use self::task::{NewTask, TaskPatch, TaskRecord};
