//! Task record: one row of the remote `tasks` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::TaskId;

/// A task as the backend stores it.
///
/// Design:
/// - `id` and `created_at` are server-assigned; clients never pick them.
/// - The local list holds clones of this record and mutates them only
///   through change-feed events, never from the action that caused them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    pub description: String,

    /// Email of the creator (taken from the session at insert time).
    pub email: String,

    /// Public URL of the attached image, if any.
    pub image_url: Option<String>,

    /// Server-assigned creation timestamp; the list order is ascending on this.
    pub created_at: DateTime<Utc>,
}

/// 挿入リクエストの運搬用データ（id / created_at はサーバー側が採番する）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub email: String,
    pub image_url: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            email: email.into(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// 部分更新の運搬用データ。
///
/// `None` のフィールドは「変更しない」を意味します（本設計で更新できるのは
/// description のみ）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub description: Option<String>,
}

impl TaskPatch {
    pub fn description(text: impl Into<String>) -> Self {
        Self {
            description: Some(text.into()),
        }
    }

    /// Apply this patch to a record, returning the updated copy.
    pub fn apply_to(&self, record: &TaskRecord) -> TaskRecord {
        let mut updated = record.clone();
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ulid::Ulid;

    fn sample_record() -> TaskRecord {
        TaskRecord {
            id: TaskId::from_ulid(Ulid::new()),
            title: "A".to_string(),
            description: "d".to_string(),
            email: "a@example.com".to_string(),
            image_url: None,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn patch_replaces_description_only() {
        let record = sample_record();
        let patched = TaskPatch::description("new text").apply_to(&record);

        assert_eq!(patched.description, "new text");
        assert_eq!(patched.id, record.id);
        assert_eq!(patched.title, record.title);
        assert_eq!(patched.created_at, record.created_at);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let record = sample_record();
        let patched = TaskPatch::default().apply_to(&record);
        assert_eq!(patched, record);
    }

    #[test]
    fn new_task_defaults_to_no_image() {
        let draft = NewTask::new("A", "d", "a@example.com");
        assert!(draft.image_url.is_none());

        let with_image = draft.with_image_url("mem://tasks-images/x");
        assert_eq!(with_image.image_url.as_deref(), Some("mem://tasks-images/x"));
    }
}
