//! Change-feed events - テーブルの行レベル変更通知
//!
//! バックエンドはコミット済みの書き込み 1 件につき 1 イベントを、
//! サーバー側の発生順で配送します。イベントは新旧レコードを丸ごと運びます
//! （id だけを運んで再取得させる設計にはしない）。

use serde::{Deserialize, Serialize};

use super::ids::TaskId;
use super::task::TaskRecord;

/// TaskChange は `tasks` テーブルで起きた 1 件の変更
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskChange {
    /// 行が挿入された（new = 挿入後の行）
    Inserted { new: TaskRecord },

    /// 行が更新された（new = 更新後、old = 更新前）
    Updated { new: TaskRecord, old: TaskRecord },

    /// 行が削除された（old = 削除された行）
    Deleted { old: TaskRecord },
}

impl TaskChange {
    /// このイベントが対象とする行の id
    pub fn task_id(&self) -> TaskId {
        match self {
            TaskChange::Inserted { new } => new.id,
            TaskChange::Updated { new, .. } => new.id,
            TaskChange::Deleted { old } => old.id,
        }
    }
}

/// FeedStatus はチャネル購読のライフサイクル通知
///
/// （サーバー由来のイベントではなく、購読そのものの状態を表す）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// 購読が確立し、イベントが流れ始めた
    Subscribed,
    /// 購読が解放された（明示的な close、または送信側の停止）
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ulid::Ulid;

    fn record(id: TaskId) -> TaskRecord {
        TaskRecord {
            id,
            title: "t".into(),
            description: "d".into(),
            email: "a@example.com".into(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn task_id_comes_from_the_surviving_side() {
        let id = TaskId::from_ulid(Ulid::new());
        let old = record(id);
        let mut new = old.clone();
        new.description = "changed".into();

        assert_eq!(TaskChange::Inserted { new: new.clone() }.task_id(), id);
        assert_eq!(TaskChange::Updated { new, old: old.clone() }.task_id(), id);
        assert_eq!(TaskChange::Deleted { old }.task_id(), id);
    }
}
