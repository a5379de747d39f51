//! # インフラ層エラー定義
//!
//! ドキュメントストアとの入出力で発生するエラーを表現する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターン:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別
//!
//! `From` 実装と convenience constructor は生成時点の [`SpanTrace`] を捕捉する。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::Conflict { entity, id } => { /* 競合処理 */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// ドキュメントの JSON 変換に失敗した
    #[error("シリアライズエラー: {0}")]
    Serialization(#[source] serde_json::Error),

    /// 一意性制約の違反
    ///
    /// 子がすでに別の家族に属している場合など。
    #[error("競合が発生しました: {entity}(id={id})")]
    Conflict {
        /// エンティティ名（例: "Child"）
        entity: String,
        /// エンティティの ID
        id:     String,
    },

    /// 予期しないエラー
    ///
    /// 保存済みのドキュメントが集約として復元できない場合など。
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    fn capture(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// 生成時点のスパンの呼び出し経路
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Conflict {
            entity: entity.into(),
            id:     id.into(),
        })
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Unexpected(msg.into()))
    }
}

// 種別の後に SpanTrace を複数行で出力する
impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}\n{}", self.kind, self.span_trace)
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(source: serde_json::Error) -> Self {
        Self::capture(InfraErrorKind::Serialization(source))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    /// テスト用に ErrorLayer 付き subscriber を設定する
    fn with_error_layer(f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        let _guard = tracing::subscriber::set_default(subscriber);
        f();
    }

    #[rstest]
    #[case::シリアライズ(|| serde_json::from_str::<String>("invalid").unwrap_err().into())]
    #[case::競合(|| InfraError::conflict("Child", "C1"))]
    #[case::予期しないエラー(|| InfraError::unexpected("復元できません"))]
    fn test_生成時のスパンが記録される(#[case] make: fn() -> InfraError) {
        with_error_layer(|| {
            let span = tracing::info_span!("save_family", family_id = "f1");
            let _enter = span.enter();

            let err = make();

            let trace = err.span_trace().to_string();
            assert!(trace.contains("save_family"), "スパン名が含まれていない: {trace}");
        });
    }

    #[test]
    fn test_displayは種別のメッセージを出力する() {
        assert_eq!(
            InfraError::conflict("Child", "C1").to_string(),
            "競合が発生しました: Child(id=C1)"
        );
        assert_eq!(
            InfraError::unexpected("復元できません").to_string(),
            "予期しないエラー: 復元できません"
        );
    }

    #[test]
    fn test_シリアライズエラーだけがsourceを持つ() {
        use std::error::Error;

        let serialization: InfraError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();

        assert!(matches!(serialization.kind(), InfraErrorKind::Serialization(_)));
        assert!(serialization.source().is_some());
        assert!(InfraError::conflict("Child", "C1").source().is_none());
    }
}
