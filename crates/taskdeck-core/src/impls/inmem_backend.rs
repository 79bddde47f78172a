//! InMemoryBackend - 開発・テスト用の hosted backend
//!
//! 4 つのポート（AuthApi / TaskTable / ChangeFeed / ObjectStore)を
//! 1 プロセス内で実装します。サーバー側セマンティクスを持ちます：
//! - id と created_at はサーバー採番
//! - コミット済みの書き込みは必ず change feed に流れる（echo の源）
//! - 未確認メールのアカウントはサインインできない
//! - ストレージは同一キーへの put を拒否する
//!
//! # 実装詳細
//! - `Arc<Mutex<BackendState>>` に全状態を集約し、遷移は state のメソッドで行う
//! - change feed は `tokio::sync::broadcast`、auth 通知は `tokio::sync::watch`
//! - feed への send はロックを持ったまま行う（コミット順 = 配送順の保証）

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{Mutex, broadcast, watch};

use crate::domain::{
    AuthError, NewTask, QueryError, Session, TaskChange, TaskId, TaskPatch, TaskRecord,
    UploadError, UserId,
};
use crate::ports::{
    AuthApi, ChangeFeed, Clock, FeedSubscription, IdGenerator, ObjectStore, SystemClock, TaskTable,
    UlidGenerator,
};

/// デフォルトのチャネル名（テーブル単位）
pub const TASKS_CHANNEL: &str = "tasks-channel";

/// デフォルトの添付画像バケット
pub const TASKS_IMAGES_BUCKET: &str = "tasks-images";

/// feed バッファ。これを超えて受信が遅れると Lagged になる
const FEED_CAPACITY: usize = 64;

/// 登録済みアカウント
#[derive(Debug, Clone)]
struct UserAccount {
    user_id: UserId,
    password: String,
    /// 確認メールのリンクを踏んだか（踏むまでサインイン不可）
    verified: bool,
}

/// In-memory backend state.
struct BackendState {
    /// email -> account（auth の正本）
    users: HashMap<String, UserAccount>,

    /// `tasks` テーブルの正本
    rows: HashMap<TaskId, TaskRecord>,

    /// (bucket, key) -> blob
    objects: HashMap<(String, String), Bytes>,

    /// 作成済みバケット名
    buckets: Vec<String>,
}

impl BackendState {
    fn new() -> Self {
        Self {
            users: HashMap::new(),
            rows: HashMap::new(),
            objects: HashMap::new(),
            buckets: vec![TASKS_IMAGES_BUCKET.to_string()],
        }
    }

    /// created_at 昇順（同時刻は id で安定化）で全件返す
    fn list_rows(&self) -> Vec<TaskRecord> {
        let mut rows: Vec<TaskRecord> = self.rows.values().cloned().collect();
        rows.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        rows
    }
}

/// InMemoryBackend は開発用の hosted backend
///
/// # 使用例
/// ```ignore
/// let backend = Arc::new(InMemoryBackend::new());
/// backend.confirm_email("a@example.com").await; // ダッシュボード相当の操作
/// ```
pub struct InMemoryBackend {
    state: Arc<Mutex<BackendState>>,
    feed_tx: broadcast::Sender<TaskChange>,
    auth_tx: watch::Sender<Option<Session>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(SystemClock),
            Arc::new(UlidGenerator::new(SystemClock)),
        )
    }

    /// Clock / IdGenerator を差し替えて作成（テスト用）
    pub fn with_parts(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        let (feed_tx, _) = broadcast::channel(FEED_CAPACITY);
        let (auth_tx, _) = watch::channel(None);
        Self {
            state: Arc::new(Mutex::new(BackendState::new())),
            feed_tx,
            auth_tx,
            ids,
            clock,
        }
    }

    // ========================================
    // 管理操作（ダッシュボード相当、クライアント API ではない）
    // ========================================

    /// 確認メールのリンクを踏んだことにする
    ///
    /// 未登録の email なら false を返す。
    pub async fn confirm_email(&self, email: &str) -> bool {
        let mut state = self.state.lock().await;
        match state.users.get_mut(email) {
            Some(account) => {
                account.verified = true;
                true
            }
            None => false,
        }
    }

    /// バケットを作成する
    pub async fn create_bucket(&self, name: &str) {
        let mut state = self.state.lock().await;
        if !state.buckets.iter().any(|b| b == name) {
            state.buckets.push(name.to_string());
        }
    }

    /// 保存済みオブジェクトを取得する（テスト・デモ用の読み出し口）
    pub async fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        let state = self.state.lock().await;
        state.objects.get(&(bucket.to_string(), key.to_string())).cloned()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthApi for InMemoryBackend {
    async fn session(&self) -> Option<Session> {
        self.auth_tx.borrow().clone()
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let mut state = self.state.lock().await;
        if state.users.contains_key(email) {
            return Err(AuthError::AlreadyRegistered);
        }

        let account = UserAccount {
            user_id: self.ids.generate_user_id(),
            password: password.to_string(),
            verified: false,
        };
        state.users.insert(email.to_string(), account);

        // 実バックエンドはここで確認メールを送る。セッションはまだ作らない。
        tracing::debug!(email, "sign-up accepted, verification mail pending");
        Ok(())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let session = {
            let state = self.state.lock().await;
            let account = state
                .users
                .get(email)
                .ok_or(AuthError::InvalidCredentials)?;
            if account.password != password {
                return Err(AuthError::InvalidCredentials);
            }
            if !account.verified {
                return Err(AuthError::EmailNotConfirmed);
            }
            Session::new(account.user_id, email, self.ids.generate_suffix())
        };

        // auth-state 通知：セッションを丸ごと差し替える
        self.auth_tx.send_replace(Some(session));
        tracing::debug!(email, "signed in");
        Ok(())
    }

    async fn sign_out(&self) {
        self.auth_tx.send_replace(None);
        tracing::debug!("signed out");
    }

    fn watch_auth(&self) -> watch::Receiver<Option<Session>> {
        self.auth_tx.subscribe()
    }
}

#[async_trait]
impl TaskTable for InMemoryBackend {
    async fn list(&self) -> Result<Vec<TaskRecord>, QueryError> {
        let state = self.state.lock().await;
        Ok(state.list_rows())
    }

    async fn insert(&self, draft: NewTask) -> Result<TaskRecord, QueryError> {
        let mut state = self.state.lock().await;

        let record = TaskRecord {
            id: self.ids.generate_task_id(),
            title: draft.title,
            description: draft.description,
            email: draft.email,
            image_url: draft.image_url,
            created_at: self.clock.now(),
        };
        state.rows.insert(record.id, record.clone());

        // ロックを持ったまま send：コミット順と配送順を一致させる。
        // broadcast::send は await しないのでデッドロックはない。
        // 購読者ゼロのエラーは無視してよい（書き込み自体は成功している）。
        let _ = self.feed_tx.send(TaskChange::Inserted {
            new: record.clone(),
        });
        Ok(record)
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<TaskRecord, QueryError> {
        let mut state = self.state.lock().await;

        let old = state
            .rows
            .get(&id)
            .cloned()
            .ok_or(QueryError::RowNotFound(id))?;
        let new = patch.apply_to(&old);
        state.rows.insert(id, new.clone());

        let _ = self.feed_tx.send(TaskChange::Updated {
            new: new.clone(),
            old,
        });
        Ok(new)
    }

    async fn delete(&self, id: TaskId) -> Result<(), QueryError> {
        let mut state = self.state.lock().await;

        let old = state.rows.remove(&id).ok_or(QueryError::RowNotFound(id))?;
        let _ = self.feed_tx.send(TaskChange::Deleted { old });
        Ok(())
    }
}

impl ChangeFeed for InMemoryBackend {
    fn subscribe(&self) -> FeedSubscription {
        FeedSubscription::new(TASKS_CHANNEL, self.feed_tx.subscribe())
    }
}

#[async_trait]
impl ObjectStore for InMemoryBackend {
    async fn put(&self, bucket: &str, key: &str, blob: Bytes) -> Result<(), UploadError> {
        let mut state = self.state.lock().await;

        if !state.buckets.iter().any(|b| b == bucket) {
            return Err(UploadError::BucketNotFound(bucket.to_string()));
        }

        let slot = (bucket.to_string(), key.to_string());
        if state.objects.contains_key(&slot) {
            return Err(UploadError::AlreadyExists {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        state.objects.insert(slot, blob);
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("mem://{bucket}/{key}")
    }
}
