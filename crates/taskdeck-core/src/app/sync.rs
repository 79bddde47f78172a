//! TaskSync - ローカルリストと change feed の照合
//!
//! # Single writer パターン
//! ローカルリストを変異させるのは次の 3 つだけ：
//! 1. 初期バルクロード（created_at 昇順）
//! 2. change feed のイベント（insert/update/delete、id で照合）
//! 3. ラグ検出時の全件リロード
//!
//! create/update/delete を発行した操作自身はリストを触らない。効果は必ず
//! echo として feed から届く。これで二重適用が構造的に起きない。
//!
//! # 照合規則
//! - insert: id が未登場なら末尾に追加（重複 insert はここで弾く）
//! - update: id 一致の要素を差し替え。無ければ no-op
//! - delete: id 一致の要素を除去。無ければ no-op
//! update/delete は再適用しても不変（冪等）。
//!
//! # 購読ライフサイクル
//! アクティブな TaskSync 1 つにつき購読は常に 1 本。解放は `close()` か
//! Drop のどちらか一度だけ（`Option::take` で二重解放を防ぐ）。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::domain::{QueryError, TaskChange, TaskRecord};
use crate::ports::{ChangeFeed, FeedMessage, FeedSubscription, TaskTable};

/// pump() 1 回の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncProgress {
    /// イベントを適用し、リストが変わった
    Applied,

    /// イベントは届いたがリストは変わらなかった
    /// （重複 insert、既に無い行への update/delete）
    Ignored,

    /// 受信が遅れてイベントを失ったため、全件リロードした
    Reloaded,

    /// チャネルが閉じた。以降 pump は進まない
    Closed,
}

/// TaskSync はローカルリストの所有者
pub struct TaskSync {
    table: Arc<dyn TaskTable>,
    subscription: Option<FeedSubscription>,
    tasks: Vec<TaskRecord>,
    request_timeout: Duration,
}

impl TaskSync {
    /// 購読を開いてから初期ロードする
    ///
    /// 先に購読することで、ロード中に起きた変更もチャネルにバッファされる。
    /// ロード結果と重なるイベントは照合規則の冪等性で吸収される。
    pub async fn open(
        table: Arc<dyn TaskTable>,
        feed: &dyn ChangeFeed,
        request_timeout: Duration,
    ) -> Result<Self, QueryError> {
        let subscription = feed.subscribe();
        let mut sync = Self {
            table,
            subscription: Some(subscription),
            tasks: Vec::new(),
            request_timeout,
        };
        sync.reload().await?;
        Ok(sync)
    }

    /// ローカルリストのスナップショット
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// 次の feed メッセージを待って処理する
    pub async fn pump(&mut self) -> Result<SyncProgress, QueryError> {
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(SyncProgress::Closed);
        };

        match subscription.recv().await {
            FeedMessage::Change(change) => {
                if self.apply(change) {
                    Ok(SyncProgress::Applied)
                } else {
                    Ok(SyncProgress::Ignored)
                }
            }
            FeedMessage::Lagged(missed) => {
                // 失われたイベントは再送されない。ドリフトを全件リロードで
                // 解消する（放置するとローカルが正本から離れたままになる）。
                tracing::warn!(missed, "change feed lagged; reloading task list");
                self.reload().await?;
                Ok(SyncProgress::Reloaded)
            }
            FeedMessage::Closed => {
                tracing::debug!("change feed closed");
                Ok(SyncProgress::Closed)
            }
        }
    }

    /// 変更イベントを 1 件適用する。リストが変わったら true
    pub fn apply(&mut self, change: TaskChange) -> bool {
        match change {
            TaskChange::Inserted { new } => {
                // id で弾かないと、重複配送された insert が二重エントリになる
                if self.tasks.iter().any(|task| task.id == new.id) {
                    return false;
                }
                // 初期ロード後の insert は追記。昇順不変量は created_at が
                // 単調である限り保たれる
                self.tasks.push(new);
                true
            }
            TaskChange::Updated { new, .. } => {
                match self.tasks.iter_mut().find(|task| task.id == new.id) {
                    Some(slot) if *slot != new => {
                        *slot = new;
                        true
                    }
                    _ => false,
                }
            }
            TaskChange::Deleted { old } => {
                let before = self.tasks.len();
                self.tasks.retain(|task| task.id != old.id);
                self.tasks.len() != before
            }
        }
    }

    /// 全件リロード（ローカルリストを丸ごと差し替える）
    async fn reload(&mut self) -> Result<(), QueryError> {
        let budget = self.request_timeout;
        self.tasks = match timeout(budget, self.table.list()).await {
            Ok(result) => result?,
            Err(_) => return Err(QueryError::Timeout(budget)),
        };
        Ok(())
    }

    /// 購読を明示的に解放する
    ///
    /// 呼ばずに drop しても subscription のフィールド drop でチャネルは
    /// 外れる。`close(self)` は self を消費するので二重解放は書けない。
    pub fn close(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }
    }
}
