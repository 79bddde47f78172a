//! SessionManager - 現在の認証アイデンティティの追跡
//!
//! # 状態機械
//! `Unauthenticated -> Authenticated`（サインイン成功 / 確認済みサインアップ）
//! `Authenticated -> Unauthenticated`（サインアウト / 期限切れ）
//! 中間状態はモデル化しない。失敗したサインインは Unauthenticated のまま、
//! メッセージだけを返す。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::app::builder::with_budget;
use crate::domain::{AuthError, Session};
use crate::ports::AuthApi;

/// SessionManager は認証面の窓口
///
/// セッションの正本はバックエンド側。ここは読み取り専用プロジェクションと
/// 遷移の引き金（sign_in/sign_up/sign_out）だけを持つ。
pub struct SessionManager {
    auth: Arc<dyn AuthApi>,
    request_timeout: Duration,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthApi>, request_timeout: Duration) -> Self {
        Self {
            auth,
            request_timeout,
        }
    }

    /// アクティブなセッションがあれば返す（副作用なし）
    pub async fn current_session(&self) -> Option<Session> {
        self.auth.session().await
    }

    /// アカウント登録。成功しても確認メールを踏むまでセッションはできない
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        with_budget(self.request_timeout, self.auth.sign_up(email, password))
            .await
            .map_err(AuthError::Timeout)?
    }

    /// サインイン。成功すると auth-state 通知が新しい Session を運ぶ
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        with_budget(
            self.request_timeout,
            self.auth.sign_in_with_password(email, password),
        )
        .await
        .map_err(AuthError::Timeout)?
    }

    /// サインアウト。通知がセッションを `None` に遷移させる
    pub async fn sign_out(&self) {
        if with_budget(self.request_timeout, self.auth.sign_out())
            .await
            .is_err()
        {
            tracing::warn!("sign-out timed out; session may still be live on the backend");
        }
    }

    /// auth-state 通知の購読
    ///
    /// 遷移のたびに新しい `Option<Session>` が流れる。receiver を drop
    /// すれば購読解除（リーク防止のための明示 unregister は不要）。
    pub fn watch(&self) -> watch::Receiver<Option<Session>> {
        self.auth.watch_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryBackend;

    fn manager(backend: &Arc<InMemoryBackend>) -> SessionManager {
        SessionManager::new(backend.clone(), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn sign_in_then_out_round_trips_the_session() {
        let backend = Arc::new(InMemoryBackend::new());
        let sessions = manager(&backend);

        sessions.sign_up("a@example.com", "secret").await.unwrap();
        backend.confirm_email("a@example.com").await;

        assert!(sessions.current_session().await.is_none());
        sessions.sign_in("a@example.com", "secret").await.unwrap();
        let session = sessions.current_session().await.unwrap();
        assert_eq!(session.email(), "a@example.com");

        sessions.sign_out().await;
        assert!(sessions.current_session().await.is_none());
    }

    #[tokio::test]
    async fn failed_sign_in_surfaces_a_message_and_keeps_state() {
        let backend = Arc::new(InMemoryBackend::new());
        let sessions = manager(&backend);

        let err = sessions.sign_in("ghost@example.com", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid login credentials");
        assert!(sessions.current_session().await.is_none());
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_the_backend_is_called() {
        let backend = Arc::new(InMemoryBackend::new());
        let sessions = manager(&backend);

        assert_eq!(
            sessions.sign_up("", "x").await.unwrap_err(),
            AuthError::MissingCredentials
        );
        assert_eq!(
            sessions.sign_in("a@example.com", "").await.unwrap_err(),
            AuthError::MissingCredentials
        );
    }

    #[tokio::test]
    async fn watcher_sees_each_transition() {
        let backend = Arc::new(InMemoryBackend::new());
        let sessions = manager(&backend);
        let mut watcher = sessions.watch();

        sessions.sign_up("a@example.com", "secret").await.unwrap();
        backend.confirm_email("a@example.com").await;
        sessions.sign_in("a@example.com", "secret").await.unwrap();

        watcher.changed().await.unwrap();
        assert!(watcher.borrow_and_update().is_some());

        sessions.sign_out().await;
        watcher.changed().await.unwrap();
        assert!(watcher.borrow_and_update().is_none());
    }
}
