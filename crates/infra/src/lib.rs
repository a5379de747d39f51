//! # Familia インフラ層
//!
//! 永続化ポートとその実装を提供する。
//!
//! ## 設計方針
//!
//! ユースケース層はリポジトリトレイトにのみ依存し、保存方式の詳細は
//! このクレートにカプセル化する。参照実装として JSON ドキュメントを
//! メモリ上に保持するリポジトリを提供する。
//!
//! ## 依存関係
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリトレイトと実装
//!
//! ## 使用例
//!
//! ```rust
//! use familia_infra::repository::{FamilyRepository, InMemoryFamilyRepository};
//!
//! # tokio_test::block_on(async {
//! let repo = InMemoryFamilyRepository::new();
//! assert!(repo.find_all().await.unwrap().is_empty());
//! # });
//! ```

pub mod error;
pub mod repository;

pub use error::InfraError;
