//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は hosted backend の一面（認証、テーブル CRUD、change feed、
//! オブジェクトストレージ）へのインターフェースを提供し、実装の詳細を
//! 隠蔽します。
//!
//! # 設計原則
//! - バックエンドが source of truth（正本）。クライアントは echo で追従する
//! - 本リポジトリの実装は InMemoryBackend のみ（開発・テスト用）。
//!   リモート HTTP アダプタはこの seam の別実装としてぶら下がる

pub mod auth_api;
pub mod change_feed;
pub mod clock;
pub mod id_generator;
pub mod object_store;
pub mod task_table;

pub use self::auth_api::AuthApi;
pub use self::change_feed::{ChangeFeed, FeedMessage, FeedSubscription};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::object_store::ObjectStore;
pub use self::task_table::TaskTable;
