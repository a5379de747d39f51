//! # Familia ドメイン層
//!
//! 家族（親・子・ステータス）のドメインモデルとビジネスルールを定義する。
//!
//! ## 設計方針
//!
//! - **集約**: [`family::Family`] が一貫性の境界。操作は不変のスナップショットを返す
//! - **値オブジェクト**: ID と氏名は検証付きの Newtype
//! - **バリデーションパイプライン**: 保存前にエンティティ全体のルールを評価し、
//!   違反をすべて集める
//! - **ドメインエラー**: 入力の誤りと業務ルール違反を区別する
//!
//! ## 依存関係の方向
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ドメイン層は永続化や非同期実行に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`clock`] - 現在時刻の抽象化と暦計算
//! - [`error`] - ドメインエラー
//! - [`family`] - 家族集約と不変条件
//! - [`person`] - 親・子と値オブジェクト
//! - [`validation`] - ルールとバリデーションパイプライン

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod family;
pub mod person;
pub mod validation;

pub use error::{DomainError, FamilyErrorCode};
