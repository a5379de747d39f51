//! # Core Service エラー定義
//!
//! ユースケース層で発生するエラーを表現する。
//!
//! ## 構造
//!
//! インフラ層の [`InfraError`] と同じ struct + enum パターン:
//! - [`CoreError`]: エラー種別（[`CoreErrorKind`]）と、失敗したユースケース名を保持する
//! - [`CoreErrorKind`]: 呼び出し側が分岐に使う種別
//!
//! | 種別 | 発生源 |
//! |------|--------|
//! | `Validation` | 入力値の誤り、集約の構造的不変条件、バリデーションパイプライン |
//! | `Domain` | 集約の業務ルール違反（安定したエラーコード付き） |
//! | `NotFound` | 指定された家族が存在しない |
//! | `Database` | 永続化ポートの失敗 |
//! | `Cancelled` | キャンセルトークンによる中断 |
//!
//! ユースケース名を付与しても種別は変わらない。

use familia_domain::{
    DomainError,
    FamilyErrorCode,
    validation::{ValidationError, ValidationErrors},
};
use familia_infra::InfraError;
use thiserror::Error;

/// Core Service で発生するエラー
#[derive(Debug)]
pub struct CoreError {
    kind:     CoreErrorKind,
    use_case: Option<&'static str>,
}

/// Core Service エラーの種別
#[derive(Debug, Error)]
pub enum CoreErrorKind {
    /// 入力値・不変条件の違反
    #[error("バリデーションエラー: {message}")]
    Validation {
        message: String,
        /// パイプラインが集めた違反（集約の局所検証では空）
        details: Vec<ValidationError>,
    },

    /// 業務ルール違反
    #[error("{message} ({code})")]
    Domain {
        code:    FamilyErrorCode,
        message: String,
    },

    /// リソースが見つからない
    #[error("{entity}が見つかりません: {id}")]
    NotFound { entity: &'static str, id: String },

    /// 永続化エラー
    #[error("永続化エラー: {0}")]
    Database(#[source] InfraError),

    /// キャンセルされた
    #[error("操作はキャンセルされました")]
    Cancelled,
}

impl CoreError {
    pub fn kind(&self) -> &CoreErrorKind {
        &self.kind
    }

    /// 失敗したユースケース名
    pub fn use_case(&self) -> Option<&'static str> {
        self.use_case
    }

    /// ユースケース名を付与する（すでに付与されていれば維持する）
    pub fn with_use_case(mut self, use_case: &'static str) -> Self {
        if self.use_case.is_none() {
            self.use_case = Some(use_case);
        }
        self
    }

    // ===== Convenience constructors =====

    pub fn validation(message: impl Into<String>) -> Self {
        CoreErrorKind::Validation {
            message: message.into(),
            details: Vec::new(),
        }
        .into()
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreErrorKind::NotFound {
            entity,
            id: id.into(),
        }
        .into()
    }

    pub fn cancelled() -> Self {
        CoreErrorKind::Cancelled.into()
    }

    // ===== 判定 =====

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, CoreErrorKind::Validation { .. })
    }

    pub fn is_domain(&self) -> bool {
        matches!(self.kind, CoreErrorKind::Domain { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, CoreErrorKind::NotFound { .. })
    }

    pub fn is_database(&self) -> bool {
        matches!(self.kind, CoreErrorKind::Database(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, CoreErrorKind::Cancelled)
    }

    /// 業務ルール違反の場合はエラーコードを返す
    pub fn domain_code(&self) -> Option<FamilyErrorCode> {
        match &self.kind {
            CoreErrorKind::Domain { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// ログ・レポート用の種別名
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            CoreErrorKind::Validation { .. } => "validation",
            CoreErrorKind::Domain { .. } => "domain",
            CoreErrorKind::NotFound { .. } => "not_found",
            CoreErrorKind::Database(_) => "database",
            CoreErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.use_case {
            Some(use_case) => write!(f, "{}: {}", use_case, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

// ===== From 実装 =====

impl From<CoreErrorKind> for CoreError {
    fn from(kind: CoreErrorKind) -> Self {
        Self {
            kind,
            use_case: None,
        }
    }
}

impl From<DomainError> for CoreError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation(message) => CoreErrorKind::Validation {
                message,
                details: Vec::new(),
            }
            .into(),
            DomainError::BusinessRule { code, message } => {
                CoreErrorKind::Domain { code, message }.into()
            }
        }
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreErrorKind::Validation {
            message: errors.to_string(),
            details: errors.into_errors(),
        }
        .into()
    }
}

impl From<InfraError> for CoreError {
    fn from(error: InfraError) -> Self {
        CoreErrorKind::Database(error).into()
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_ドメインのバリデーションエラーはvalidationに変換される() {
        let err: CoreError = DomainError::validation("名は必須です").into();

        assert!(err.is_validation());
        assert_eq!(err.domain_code(), None);
        assert_eq!(err.kind_name(), "validation");
    }

    #[test]
    fn test_業務ルール違反はdomainに変換されコードを保持する() {
        let err: CoreError =
            DomainError::business_rule(FamilyErrorCode::TooManyParents, "親は 2 人まで").into();

        assert!(err.is_domain());
        assert_eq!(err.domain_code(), Some(FamilyErrorCode::TooManyParents));
    }

    #[test]
    fn test_インフラエラーはdatabaseに変換されsourceを保持する() {
        let err: CoreError = InfraError::conflict("Child", "C1").into();

        assert!(err.is_database());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_ユースケース名を付与しても種別は変わらない() {
        let err = CoreError::not_found("家族", "f1")
            .with_use_case("get_family")
            .with_use_case("outer");

        assert!(err.is_not_found());
        assert_eq!(err.use_case(), Some("get_family"));
        assert_eq!(err.to_string(), "get_family: 家族が見つかりません: f1");
    }

    #[test]
    fn test_キャンセル() {
        let err = CoreError::cancelled();

        assert!(err.is_cancelled());
        assert!(!err.is_database());
        assert_eq!(err.to_string(), "操作はキャンセルされました");
    }
}
