//! ClientBuilder - クライアントの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - ポート未設定・不正な設定は build() で即エラーにする

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::app::config::ClientConfig;
use crate::app::session::SessionManager;
use crate::app::sync::TaskSync;
use crate::app::uploader::{AttachmentSource, AttachmentUploader};
use crate::domain::{NewTask, QueryError, TaskId, TaskPatch, TaskRecord};
use crate::ports::{
    AuthApi, ChangeFeed, IdGenerator, ObjectStore, SystemClock, TaskTable, UlidGenerator,
};

/// BuildError はクライアント構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing port: {0}. Wire a backend before build().")]
    MissingPort(&'static str),

    #[error("bucket name must not be empty")]
    EmptyBucket,

    #[error("request timeout must be non-zero")]
    ZeroTimeout,
}

/// ClientBuilder は Client を構築
///
/// # 使用例
/// ```ignore
/// let backend = Arc::new(InMemoryBackend::new());
/// let client = ClientBuilder::new().backend(backend).build()?;
/// ```
///
/// # Fail-fast 設計
/// - 4 つのポートが全て配線されているかを build() 時にチェック
/// - 設定値（バケット名、タイムアウト）も同時に検証
pub struct ClientBuilder {
    auth: Option<Arc<dyn AuthApi>>,
    table: Option<Arc<dyn TaskTable>>,
    feed: Option<Arc<dyn ChangeFeed>>,
    storage: Option<Arc<dyn ObjectStore>>,
    ids: Arc<dyn IdGenerator>,
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            auth: None,
            table: None,
            feed: None,
            storage: None,
            ids: Arc::new(UlidGenerator::new(SystemClock)),
            config: ClientConfig::default(),
        }
    }

    /// 4 つのポート全てを 1 つのバックエンドで配線する
    pub fn backend<B>(self, backend: Arc<B>) -> Self
    where
        B: AuthApi + TaskTable + ChangeFeed + ObjectStore + 'static,
    {
        self.auth(backend.clone())
            .table(backend.clone())
            .feed(backend.clone())
            .storage(backend)
    }

    pub fn auth(mut self, auth: Arc<dyn AuthApi>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn table(mut self, table: Arc<dyn TaskTable>) -> Self {
        self.table = Some(table);
        self
    }

    pub fn feed(mut self, feed: Arc<dyn ChangeFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn ObjectStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// ストレージキーのサフィックス生成器を差し替える（テスト用）
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// ClientBuilder を検証して Client を生成
    pub fn build(self) -> Result<Client, BuildError> {
        if self.config.bucket.is_empty() {
            return Err(BuildError::EmptyBucket);
        }
        if self.config.request_timeout.is_zero() {
            return Err(BuildError::ZeroTimeout);
        }
        Ok(Client {
            auth: self.auth.ok_or(BuildError::MissingPort("auth"))?,
            table: self.table.ok_or(BuildError::MissingPort("table"))?,
            feed: self.feed.ok_or(BuildError::MissingPort("feed"))?,
            storage: self.storage.ok_or(BuildError::MissingPort("storage"))?,
            ids: self.ids,
            config: self.config,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Client はバックエンドへの単一の窓口
///
/// # エラーポリシー（spec §7 相当）
/// - auth エラーだけがメッセージとしてユーザーに返る（SessionManager 経由）
/// - update/delete の失敗はここでログに書いて握りつぶす。ローカル状態は
///   変わらず、ユーザーは同じ操作をやり直せる
/// - create は成功可否で後続（フォームのリセット等）が変わるので Result を返す
pub struct Client {
    auth: Arc<dyn AuthApi>,
    table: Arc<dyn TaskTable>,
    feed: Arc<dyn ChangeFeed>,
    storage: Arc<dyn ObjectStore>,
    ids: Arc<dyn IdGenerator>,
    config: ClientConfig,
}

impl Client {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// セッション管理コンポーネント
    pub fn session_manager(&self) -> SessionManager {
        SessionManager::new(self.auth.clone(), self.config.request_timeout)
    }

    /// 添付アップローダ
    pub fn uploader(&self) -> AttachmentUploader {
        AttachmentUploader::new(
            self.storage.clone(),
            self.ids.clone(),
            self.config.bucket.clone(),
            self.config.request_timeout,
        )
    }

    /// ローカルリスト + 購読を開く（初期ロード込み）
    pub async fn open_sync(&self) -> Result<TaskSync, QueryError> {
        TaskSync::open(
            self.table.clone(),
            self.feed.as_ref(),
            self.config.request_timeout,
        )
        .await
    }

    /// 全件取得（created_at 昇順）。エラーはログした上で呼び出し側に返す
    pub async fn list_tasks(&self) -> Result<Vec<TaskRecord>, QueryError> {
        let result = self.bounded(self.table.list()).await;
        if let Err(error) = &result {
            tracing::warn!(%error, "error reading tasks");
        }
        result
    }

    /// 挿入。作成済みレコードを返すが、ローカルリストは触らない
    /// （反映は change feed の echo を待つ）
    pub async fn create_task(&self, draft: NewTask) -> Result<TaskRecord, QueryError> {
        let result = self.bounded(self.table.insert(draft)).await;
        if let Err(error) = &result {
            tracing::warn!(%error, "error adding task");
        }
        result
    }

    /// アップロードしてから挿入する複合操作
    ///
    /// アップロードの失敗はログに残し、image_url 無しで挿入を続行する
    /// （元の操作をタスク作成として完遂させる）。
    pub async fn create_task_with_attachment(
        &self,
        draft: NewTask,
        attachment: Option<AttachmentSource>,
    ) -> Result<TaskRecord, QueryError> {
        let draft = match attachment {
            Some(source) => match self.uploader().upload(source).await {
                Some(url) => draft.with_image_url(url),
                None => draft,
            },
            None => draft,
        };
        self.create_task(draft).await
    }

    /// description の部分更新。失敗（該当行なし・転送エラー）はログのみ
    pub async fn update_task(&self, id: TaskId, patch: TaskPatch) {
        if let Err(error) = self.bounded(self.table.update(id, patch)).await {
            tracing::warn!(%id, %error, "error updating task");
        }
    }

    /// 削除。存在しない id は no-op（ログのみ、ユーザーにエラーは出さない）
    pub async fn delete_task(&self, id: TaskId) {
        if let Err(error) = self.bounded(self.table.delete(id)).await {
            tracing::warn!(%id, %error, "error deleting task");
        }
    }

    /// リモート呼び出しに時間予算を課す
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, QueryError>>,
    ) -> Result<T, QueryError> {
        let budget = self.config.request_timeout;
        match timeout(budget, fut).await {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout(budget)),
        }
    }
}

/// タイムアウトだけを予算化したヘルパ（Session/Uploader と共用）
pub(crate) async fn with_budget<T>(
    budget: Duration,
    fut: impl Future<Output = T>,
) -> Result<T, Duration> {
    timeout(budget, fut).await.map_err(|_| budget)
}
