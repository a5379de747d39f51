//! 家族ステータス

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

/// 家族ステータス
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FamilyStatus {
    /// 独身（生存している親が 1 人）
    Single,
    /// 婚姻中（生存している親が 2 人）
    Married,
    /// 離婚（生存している親が 1 人）
    Divorced,
    /// 死別（死亡した親がいる）
    Widowed,
    /// 遺棄（子が 1 人以上）
    Abandoned,
}

impl FamilyStatus {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl std::str::FromStr for FamilyStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "married" => Ok(Self::Married),
            "divorced" => Ok(Self::Divorced),
            "widowed" => Ok(Self::Widowed),
            "abandoned" => Ok(Self::Abandoned),
            _ => Err(DomainError::Validation(format!(
                "不正な家族ステータス: {}",
                s
            ))),
        }
    }
}
