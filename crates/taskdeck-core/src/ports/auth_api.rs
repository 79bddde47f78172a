//! AuthApi port - 認証サービスの抽象化
//!
//! # 設計原則
//! - セッションの正本はバックエンド側。クライアントは通知で差し替えるだけ
//! - auth-state 通知は `tokio::sync::watch` で配る。receiver を drop すれば
//!   購読解除になる（手動 unregister を RAII に置き換える）
//! - 失敗したサインインは状態を変えない（Unauthenticated のまま）

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{AuthError, Session};

/// AuthApi は hosted backend の認証面
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// 現在のセッションを取得（副作用なし）
    async fn session(&self) -> Option<Session>;

    /// アカウント登録
    ///
    /// 成功してもセッションは作られない（確認メールのリンクを踏むまで
    /// サインインできない）。
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// パスワードでサインイン
    ///
    /// 成功するとバックエンドが auth-state 通知を発火し、新しい Session が
    /// watch チャネルに流れる。
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// サインアウト（セッションを無効化し、`None` を通知する）
    async fn sign_out(&self);

    /// auth-state 通知の購読
    ///
    /// 返った receiver には現在値が入っている。drop で購読解除。
    fn watch_auth(&self) -> watch::Receiver<Option<Session>>;
}
