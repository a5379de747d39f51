//! テスト共通フィクスチャ
//!
//! 統合テストで共通利用する固定時刻・家族の生成ヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use familia_domain::{
    family::{Family, FamilyId, FamilyStatus, NewFamily},
    person::{Child, FirstName, LastName, NewPerson, Parent, Person, PersonId},
};

/// テストの基準時刻
pub fn test_now() -> DateTime<Utc> {
    date(2024, 6, 1)
}

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn person(id: &str, first_name: &str, birth_date: DateTime<Utc>) -> Person {
    Person::new(NewPerson {
        id: PersonId::new(id).unwrap(),
        first_name: FirstName::new(first_name).unwrap(),
        last_name: LastName::new("山田").unwrap(),
        birth_date,
        death_date: None,
    })
    .unwrap()
}

/// 親 2 人・指定された子を持つ婚姻中の家族
pub fn married_family(id: &str, parent_ids: [&str; 2], child_ids: &[&str]) -> Family {
    Family::new(NewFamily {
        id: FamilyId::new(id).unwrap(),
        status: FamilyStatus::Married,
        parents: vec![
            Parent::new(person(parent_ids[0], "太郎", date(1980, 5, 15))),
            Parent::new(person(parent_ids[1], "花子", date(1982, 8, 22))),
        ],
        children: child_ids
            .iter()
            .map(|id| Child::new(person(id, id, date(2010, 3, 12))))
            .collect(),
        now: test_now(),
    })
    .unwrap()
}

/// 親 1 人の独身の家族
pub fn single_family(id: &str, parent_id: &str) -> Family {
    Family::new(NewFamily {
        id: FamilyId::new(id).unwrap(),
        status: FamilyStatus::Single,
        parents: vec![Parent::new(person(parent_id, "次郎", date(1985, 1, 1)))],
        children: vec![],
        now: test_now(),
    })
    .unwrap()
}
