//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//! - **安定したエラーコード**: ビジネスルール違反は [`FamilyErrorCode`] を持ち、
//!   呼び出し側はメッセージではなくコードで分岐する
//!
//! ## エラーの種類
//!
//! | エラー種別 | 用途 |
//! |-----------|------|
//! | `Validation` | 入力値・構造的不変条件の違反（呼び出し側が入力を直せば解消する） |
//! | `BusinessRule` | 集約の操作が業務ルールにより拒否された |
//!
//! ## 使用例
//!
//! ```rust
//! use familia_domain::{DomainError, FamilyErrorCode};
//!
//! fn ensure_married(married: bool) -> Result<(), DomainError> {
//!     if !married {
//!         return Err(DomainError::business_rule(
//!             FamilyErrorCode::NotMarried,
//!             "婚姻中の家族のみ離婚できます",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! let err = ensure_married(false).unwrap_err();
//! assert_eq!(err.code(), Some(FamilyErrorCode::NotMarried));
//! ```

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

/// 業務ルール違反のエラーコード
///
/// API 利用者がプログラムで判定できるよう、文字列表現（snake_case）は安定させる。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FamilyErrorCode {
    /// 親がすでに 2 人いる
    TooManyParents,
    /// 同一 ID または同一（氏名・生年月日）の親が存在する
    DuplicateParent,
    /// 同一 ID の子が存在する
    DuplicateChild,
    /// 指定された親が家族に属していない
    ParentNotFound,
    /// 指定された子が家族に属していない
    ChildNotFound,
    /// 親はすでに死亡済み
    ParentAlreadyDeceased,
    /// 婚姻中でない家族への離婚操作
    NotMarried,
    /// 遺棄状態の家族から最後の子を取り除こうとした
    AbandonedRequiresChild,
    /// 同一 ID の家族がすでに存在する
    FamilyAlreadyExists,
}

/// ドメイン層で発生するエラー
///
/// 集約の操作は最初に違反した不変条件で即座に失敗する（集約しない）。
/// 複数ルールの違反をまとめて返すのは [`crate::validation`] の役割。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値や構造的な不変条件に違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 必須フィールドが未入力
    /// - 親子の年齢差が不足している
    /// - 死亡日が生年月日より前
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 業務ルール違反
    ///
    /// 集約の状態に対して操作そのものが許されない場合に使用する。
    #[error("{message} ({code})")]
    BusinessRule {
        /// 安定したエラーコード
        code:    FamilyErrorCode,
        /// 人間可読なメッセージ
        message: String,
    },
}

impl DomainError {
    /// バリデーションエラーを生成する
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// 業務ルール違反エラーを生成する
    pub fn business_rule(code: FamilyErrorCode, message: impl Into<String>) -> Self {
        Self::BusinessRule {
            code,
            message: message.into(),
        }
    }

    /// 業務ルール違反の場合はエラーコードを返す
    pub fn code(&self) -> Option<FamilyErrorCode> {
        match self {
            Self::BusinessRule { code, .. } => Some(*code),
            Self::Validation(_) => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
