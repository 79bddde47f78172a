//! ChangeFeed port - 行レベル変更の push チャネル
//!
//! # 設計原則
//! - テーブル単位のチャネル。コミット済みの書き込み 1 件につき 1 イベント
//! - 配送順はサーバーの発生順。at-least-once は保証しない：受信側が遅れて
//!   イベントを取りこぼした場合は `Lagged` として観測される（再送はない）
//! - 購読はアクティブなビューごとに 1 本。解放は所有権で強制する
//!   （`close(self)` は一度しか呼べず、呼ばなければ Drop が解放する）

use tokio::sync::broadcast;

use crate::domain::{FeedStatus, TaskChange};

/// 購読側が受け取る 1 メッセージ
#[derive(Debug, Clone)]
pub enum FeedMessage {
    /// 行レベルの変更イベント
    Change(TaskChange),

    /// 受信が追いつかず、`missed` 件のイベントが失われた。
    /// 失われたイベントは再送されないので、呼び出し側は全件リロードで
    /// ドリフトを解消する必要がある。
    Lagged(u64),

    /// 送信側が停止した（チャネルはもう何も配送しない）
    Closed,
}

/// ChangeFeed は hosted backend の push チャネル面
pub trait ChangeFeed: Send + Sync {
    /// `tasks` テーブルにスコープした購読を開く
    fn subscribe(&self) -> FeedSubscription;
}

/// FeedSubscription は開いたチャネルの所有ハンドル
///
/// Design intent:
/// - 受信はこのハンドル経由のみ（broadcast::Receiver は外に出さない）
/// - `close(self)` は self を消費するので二重解放はコンパイルエラーになる
pub struct FeedSubscription {
    channel: String,
    receiver: broadcast::Receiver<TaskChange>,
    status: FeedStatus,
}

impl FeedSubscription {
    pub fn new(channel: impl Into<String>, receiver: broadcast::Receiver<TaskChange>) -> Self {
        let channel = channel.into();
        let sub = Self {
            channel,
            receiver,
            status: FeedStatus::Subscribed,
        };
        tracing::debug!(channel = %sub.channel, "change feed subscribed");
        sub
    }

    /// 購読状態（Subscribed / Closed）
    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// 次のメッセージを待つ
    pub async fn recv(&mut self) -> FeedMessage {
        match self.receiver.recv().await {
            Ok(change) => FeedMessage::Change(change),
            Err(broadcast::error::RecvError::Lagged(missed)) => FeedMessage::Lagged(missed),
            Err(broadcast::error::RecvError::Closed) => {
                self.status = FeedStatus::Closed;
                FeedMessage::Closed
            }
        }
    }

    /// チャネルを明示的に解放する
    pub fn close(mut self) {
        self.status = FeedStatus::Closed;
        tracing::debug!(channel = %self.channel, "change feed released");
        // receiver は Drop で外れる
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, TaskRecord};
    use chrono::Utc;
    use ulid::Ulid;

    fn record() -> TaskRecord {
        TaskRecord {
            id: TaskId::from_ulid(Ulid::new()),
            title: "t".into(),
            description: "d".into(),
            email: "a@example.com".into(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn recv_delivers_changes_in_emission_order() {
        let (tx, rx) = broadcast::channel(16);
        let mut sub = FeedSubscription::new("tasks-channel", rx);

        let first = record();
        let second = record();
        tx.send(TaskChange::Inserted { new: first.clone() }).unwrap();
        tx.send(TaskChange::Deleted { old: second.clone() }).unwrap();

        match sub.recv().await {
            FeedMessage::Change(TaskChange::Inserted { new }) => assert_eq!(new.id, first.id),
            other => panic!("unexpected message: {other:?}"),
        }
        match sub.recv().await {
            FeedMessage::Change(TaskChange::Deleted { old }) => assert_eq!(old.id, second.id),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn overflow_is_reported_as_lagged() {
        // 容量 1 のチャネルに 3 件流すと、古い 2 件が失われる
        let (tx, rx) = broadcast::channel(1);
        let mut sub = FeedSubscription::new("tasks-channel", rx);

        for _ in 0..3 {
            tx.send(TaskChange::Inserted { new: record() }).unwrap();
        }

        match sub.recv().await {
            FeedMessage::Lagged(missed) => assert_eq!(missed, 2),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sender_drop_closes_the_feed() {
        let (tx, rx) = broadcast::channel::<TaskChange>(4);
        let mut sub = FeedSubscription::new("tasks-channel", rx);
        drop(tx);

        assert!(matches!(sub.recv().await, FeedMessage::Closed));
        assert_eq!(sub.status(), FeedStatus::Closed);
    }
}
