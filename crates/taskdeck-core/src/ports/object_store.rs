//! ObjectStore port - Blob ストレージ（添付画像の保存先）
//!
//! # 設計原則
//! - キーは呼び出し側が組み立てる（`{ファイル名}-{一意サフィックス}`）
//! - 同一キーへの put は拒否する（上書きしない）
//! - public URL の解決は put とは独立した読み取り操作

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::UploadError;

/// ObjectStore は hosted backend のオブジェクトストレージ面
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// blob を bucket/key に保存する
    async fn put(&self, bucket: &str, key: &str, blob: Bytes) -> Result<(), UploadError>;

    /// 保存済みオブジェクトの公開 URL を返す
    ///
    /// バックエンド仕様に合わせ、key の存在チェックはしない
    /// （存在しないオブジェクトの URL も組み立てられる）。
    fn public_url(&self, bucket: &str, key: &str) -> String;
}
