//! # リポジトリ実装
//!
//! 永続化ポート（リポジトリトレイト）とその実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: ユースケース層はトレイト経由でのみ永続化にアクセスする
//! - **ドキュメント単位の保存**: 集約はスナップショットとして丸ごと保存する
//! - **テスタビリティ**: インメモリ実装をそのままテストで使える

pub mod family_repository;

pub use family_repository::{
    FamilyDocument,
    FamilyRepository,
    InMemoryFamilyRepository,
    PersonDocument,
};
