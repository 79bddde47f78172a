//! Errors - エラー型と分類
//!
//! # 分類（spec のタクソノミに対応）
//! - AuthError: 認証系。唯一ユーザーにメッセージとして見せるエラー
//! - QueryError: テーブル CRUD の失敗。呼び出し側でログに書いて握りつぶす
//! - UploadError: ストレージ転送の失敗。同上
//!
//! どのエラーも致命的ではなく、失敗した操作は以前の状態を変えません。
//! 自動リトライはしない（ユーザーが同じ操作をやり直す）。

use std::time::Duration;

use thiserror::Error;

use super::ids::TaskId;

/// 認証 API のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("email not confirmed")]
    EmailNotConfirmed,

    #[error("user already registered")]
    AlreadyRegistered,

    #[error("email and password are required")]
    MissingCredentials,

    #[error("auth transport: {0}")]
    Transport(String),

    #[error("auth request timed out after {0:?}")]
    Timeout(Duration),
}

/// テーブル API のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// update/delete が既存行にマッチしなかった
    #[error("no row matched id {0}")]
    RowNotFound(TaskId),

    #[error("query transport: {0}")]
    Transport(String),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}

/// オブジェクトストレージ API のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    /// 同じキーのオブジェクトが既に存在する
    #[error("object already exists at {bucket}/{key}")]
    AlreadyExists { bucket: String, key: String },

    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    #[error("storage transport: {0}")]
    Transport(String),

    #[error("upload timed out after {0:?}")]
    Timeout(Duration),
}
