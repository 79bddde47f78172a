//! Session: the authenticated identity context for the current client.

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// 認証済みアイデンティティの読み取り専用プロジェクション。
///
/// 正本はバックエンド側にあり、クライアントは auth-state 通知のたびに
/// この値を丸ごと差し替えます（フィールド単位の更新はしない）。
/// サインアウトで `None` に遷移します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user_id: UserId,
    email: String,
    access_token: String,
}

impl Session {
    pub fn new(user_id: UserId, email: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            access_token: access_token.into(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Opaque bearer token. The in-memory backend only checks presence.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}
