//! TaskTable port - `tasks` テーブルの CRUD 面
//!
//! # 設計原則
//! - insert は作成済みレコードを丸ごと返す（`insert().select().single()` 相当）
//! - insert/update/delete はローカル状態を変更しない。効果は change feed の
//!   echo としてだけ観測される（single writer パターン）
//! - 行の同時実行制御はバックエンド側の責務（ここでは扱わない）

use async_trait::async_trait;

use crate::domain::{NewTask, QueryError, TaskId, TaskPatch, TaskRecord};

/// TaskTable は hosted backend のテーブル面
#[async_trait]
pub trait TaskTable: Send + Sync {
    /// 全件取得、created_at 昇順（`select(*).order(created_at, asc)` 相当）
    async fn list(&self) -> Result<Vec<TaskRecord>, QueryError>;

    /// 挿入。id と created_at はサーバーが採番し、作成済みレコードを返す
    async fn insert(&self, draft: NewTask) -> Result<TaskRecord, QueryError>;

    /// 部分更新（`update(partial).eq(id)` 相当）
    ///
    /// 該当行がなければ `QueryError::RowNotFound`。
    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<TaskRecord, QueryError>;

    /// 削除（`delete().eq(id)` 相当）。該当行がなければ `RowNotFound`
    async fn delete(&self, id: TaskId) -> Result<(), QueryError>;
}
