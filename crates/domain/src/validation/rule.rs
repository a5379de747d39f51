//! ルールとバリデーションエラー

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// すべてのルールに渡される評価コンテキスト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    /// 年齢判定の基準時刻
    pub now: DateTime<Utc>,
}

impl RuleContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

/// エンティティ `T` に対する 1 つの判定
///
/// 副作用を持たない。同じ入力に対しては常に同じ結果を返す。
pub trait Rule<T>: Send + Sync {
    /// ルール名（エラーコードとしても使う）
    fn name(&self) -> &'static str;

    fn check(&self, ctx: &RuleContext, target: &T) -> Result<(), ValidationError>;
}

/// バリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub code:    String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field:   Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes:  Vec<ValidationError>,
}

impl ValidationError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code:    code.into(),
            message: message.into(),
            field:   None,
            causes:  Vec::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_causes(mut self, causes: Vec<ValidationError>) -> Self {
        self.causes = causes;
        self
    }

    /// 複合ルールの下にある末端の違反をすべて返す
    pub fn leaves(&self) -> Vec<&ValidationError> {
        if self.causes.is_empty() {
            return vec![self];
        }
        self.causes.iter().flat_map(ValidationError::leaves).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.causes.is_empty() {
            let causes: Vec<String> = self.causes.iter().map(ToString::to_string).collect();
            write!(f, " ({})", causes.join("; "))?;
        }
        Ok(())
    }
}

/// バリデーションパイプラインの集約エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("バリデーションエラー（{} 件）: {}", .errors.len(), join(.errors))]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub(super) fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
