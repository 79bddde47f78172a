//! AttachmentUploader - 添付画像 1 枚のアップロード
//!
//! # ストレージキー
//! `{ファイル名}-{ULID}`。サフィックスが ULID なので、同名ファイルを
//! 同時にアップロードしても衝突しない（タイムスタンプ単体ではミリ秒内の
//! 競合で衝突し得る）。
//!
//! # エラーポリシー
//! 失敗はログに残して `None` を返すだけ。リトライも進捗報告も
//! サイズ・種別の検証もしない（入力の制約は呼び出し側 UI の責務）。

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::app::builder::with_budget;
use crate::ports::{IdGenerator, ObjectStore};

/// アップロード対象（名前付きの blob）
#[derive(Debug, Clone)]
pub struct AttachmentSource {
    pub name: String,
    pub bytes: Bytes,
}

impl AttachmentSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// AttachmentUploader はオブジェクトストレージへの窓口
pub struct AttachmentUploader {
    storage: Arc<dyn ObjectStore>,
    ids: Arc<dyn IdGenerator>,
    bucket: String,
    request_timeout: Duration,
}

impl AttachmentUploader {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        ids: Arc<dyn IdGenerator>,
        bucket: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            ids,
            bucket: bucket.into(),
            request_timeout,
        }
    }

    /// blob を保存して公開 URL を返す。失敗したら None（ログのみ）
    pub async fn upload(&self, source: AttachmentSource) -> Option<String> {
        let key = format!("{}-{}", source.name, self.ids.generate_suffix());

        let put = self.storage.put(&self.bucket, &key, source.bytes);
        match with_budget(self.request_timeout, put).await {
            Ok(Ok(())) => Some(self.storage.public_url(&self.bucket, &key)),
            Ok(Err(error)) => {
                tracing::error!(bucket = %self.bucket, %key, %error, "error uploading image");
                None
            }
            Err(budget) => {
                tracing::error!(bucket = %self.bucket, %key, ?budget, "upload timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryBackend, TASKS_IMAGES_BUCKET};
    use crate::ports::{SystemClock, UlidGenerator};

    fn uploader(backend: &Arc<InMemoryBackend>) -> AttachmentUploader {
        AttachmentUploader::new(
            backend.clone(),
            Arc::new(UlidGenerator::new(SystemClock)),
            TASKS_IMAGES_BUCKET,
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn upload_resolves_a_public_url() {
        let backend = Arc::new(InMemoryBackend::new());
        let uploader = uploader(&backend);

        let url = uploader
            .upload(AttachmentSource::new("cat.png", &b"img"[..]))
            .await
            .expect("upload succeeds");

        assert!(url.starts_with("mem://tasks-images/cat.png-"));
    }

    #[tokio::test]
    async fn same_name_twice_produces_distinct_keys() {
        let backend = Arc::new(InMemoryBackend::new());
        let uploader = uploader(&backend);

        let source = AttachmentSource::new("cat.png", &b"img"[..]);
        let url1 = uploader.upload(source.clone()).await.unwrap();
        let url2 = uploader.upload(source).await.unwrap();

        // 同名でもキーが違うので、二度目の put が AlreadyExists にならない
        assert_ne!(url1, url2);
    }

    #[tokio::test]
    async fn missing_bucket_yields_none() {
        let backend = Arc::new(InMemoryBackend::new());
        let uploader = AttachmentUploader::new(
            backend.clone(),
            Arc::new(UlidGenerator::new(SystemClock)),
            "no-such-bucket",
            Duration::from_secs(1),
        );

        let url = uploader
            .upload(AttachmentSource::new("cat.png", &b"img"[..]))
            .await;
        assert!(url.is_none());
    }
}
