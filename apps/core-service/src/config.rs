//! # Core Service 設定
//!
//! 環境変数からユースケース層の設定を読み込む。
//!
//! | 変数名 | 既定値 | 説明 |
//! |--------|--------|------|
//! | `FAMILIA_MIN_PARENT_AGE` | 18 | 親の最低年齢（これより緩くはできない） |
//! | `FAMILIA_MIN_PARENT_CHILD_GAP` | 12 | 親子の最低年齢差（これより緩くはできない） |
//! | `LOG_FORMAT` | `pretty` | `json` または `pretty` |

use std::env;

use familia_domain::{DomainError, validation::RulePolicy};
use familia_shared::observability::{LogFormat, UnknownLogFormat};
use thiserror::Error;

pub const MIN_PARENT_AGE_VAR: &str = "FAMILIA_MIN_PARENT_AGE";
pub const MIN_PARENT_CHILD_GAP_VAR: &str = "FAMILIA_MIN_PARENT_CHILD_GAP";
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// 設定の読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} は 0 以上の整数である必要があります（指定: {value:?}）")]
    InvalidNumber { name: &'static str, value: String },

    #[error("ルールの閾値が不正です: {0}")]
    Policy(#[source] DomainError),

    #[error("LOG_FORMAT が不正です: {0}")]
    LogFormat(#[from] UnknownLogFormat),
}

/// Core Service の設定
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// バリデーションパイプラインの閾値
    pub policy:     RulePolicy,
    /// ログ出力形式
    pub log_format: LogFormat,
}

impl CoreConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = RulePolicy::default();
        let min_age = read_u32(&lookup, MIN_PARENT_AGE_VAR)?
            .unwrap_or(defaults.min_parent_age_years());
        let min_gap = read_u32(&lookup, MIN_PARENT_CHILD_GAP_VAR)?
            .unwrap_or(defaults.min_parent_child_gap_years());
        let policy = RulePolicy::new(min_age, min_gap).map_err(ConfigError::Policy)?;

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self { policy, log_format })
    }
}

fn read_u32(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<u32>, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}
