//! Client configuration.

use std::time::Duration;

use crate::impls::TASKS_IMAGES_BUCKET;

/// クライアント全体の設定
///
/// # タイムアウト
/// バックエンドはタイムアウトを規定しないので、クライアント側で明示的に
/// 課す。個々のリモート呼び出しがこの時間で打ち切られる（ハングした
/// リクエストを無期限に待たない）。
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 添付画像のアップロード先バケット
    pub bucket: String,

    /// リモート呼び出し 1 件あたりの時間予算
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bucket: TASKS_IMAGES_BUCKET.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_backend_setup() {
        let config = ClientConfig::default();
        assert_eq!(config.bucket, "tasks-images");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}
