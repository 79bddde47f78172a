//! taskdeck-core
//!
//! リアルタイム同期するタスク管理クライアントのコア。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, session, events, errors）
//! - **ports**: 抽象化レイヤー（AuthApi, TaskTable, ChangeFeed, ObjectStore, Clock, IdGenerator）
//! - **app**: クライアントコンポーネント（SessionManager, TaskSync, AttachmentUploader, ClientBuilder）
//! - **impls**: 実装（InMemoryBackend：開発・テスト用）
//!
//! # 設計の核
//! バックエンドが source of truth。create/update/delete はローカル状態を
//! 直接変更せず、change feed の echo だけがローカルリストを動かす
//! （single writer パターン）。

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
