//! # Clock（時刻プロバイダ）と暦計算
//!
//! 年齢判定は「現在時刻」に依存するため、ユースケース層での `Utc::now()`
//! 直接呼び出しを [`Clock`] に置き換え、テストで固定時刻を注入可能にする。
//!
//! 年数の計算は暦に従う（うるう年・月末を考慮）。年の引き算だけで
//! 年齢を求めると誕生日前の 1 年を数え過ぎるため、必ず [`years_after`] を使う。

use chrono::{DateTime, Months, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 実際のシステム時刻を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻を返すテスト用実装
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// `at` から暦上 `years` 年後の時刻を返す
///
/// 2 月 29 日起点で移動先が平年の場合は 2 月 28 日に丸める。
/// 表現可能な範囲を超える場合は最大値に張り付く。
pub fn years_after(at: DateTime<Utc>, years: u32) -> DateTime<Utc> {
    years
        .checked_mul(12)
        .and_then(|months| at.checked_add_months(Months::new(months)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
