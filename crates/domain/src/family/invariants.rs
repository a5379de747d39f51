//! # 家族の不変条件
//!
//! 集約の操作（局所検証）とバリデーションパイプラインの両方から呼ばれる判定関数。
//! 同じ関数を共有することで、2 つの検証層の判定が食い違わないようにする。
//!
//! 各関数は違反時にメッセージを返し、満たしている場合は `None` を返す。
//!
//! ステータスと親の人数の整合は **生存している親** の人数で判定する。
//! 親は削除されず死亡日が設定されるだけなので、婚姻中の家族で親が死亡すると
//! 親のレコードは 2 件のまま死別（Widowed）に遷移する。

use chrono::{DateTime, Utc};

use super::FamilyStatus;
use crate::{clock::years_after, person::Person};

/// 家族の親の最大人数
pub const MAX_PARENTS: usize = 2;

/// 親の最低年齢（満年齢）
pub const MIN_PARENT_AGE_YEARS: u32 = 18;

/// 親子の最低年齢差（暦上の年数）
pub const MIN_PARENT_CHILD_GAP_YEARS: u32 = 12;

/// 親のレコード数が 1〜2 の範囲にあるか
pub fn parent_bounds_violation(parent_count: usize) -> Option<String> {
    if parent_count == 0 {
        return Some("家族には親が 1 人以上必要です".to_string());
    }
    if parent_count > MAX_PARENTS {
        return Some(format!(
            "家族の親は {} 人までです（現在: {} 人）",
            MAX_PARENTS, parent_count
        ));
    }
    None
}

/// ステータスと生存している親の人数が整合しているか
///
/// - Married: 2 人
/// - Single / Divorced: 1 人
/// - Widowed / Abandoned: 1 人以下
///
/// 生存している親が 2 人なら Married 以外は認めない。
pub fn status_parent_count_violation(status: FamilyStatus, living_parents: usize) -> Option<String> {
    let consistent = match status {
        FamilyStatus::Married => living_parents == 2,
        FamilyStatus::Single | FamilyStatus::Divorced => living_parents == 1,
        FamilyStatus::Widowed | FamilyStatus::Abandoned => living_parents <= 1,
    };
    if consistent {
        return None;
    }
    let expected = match status {
        FamilyStatus::Married => "2 人",
        FamilyStatus::Widowed | FamilyStatus::Abandoned => "1 人以下",
        _ => "1 人",
    };
    Some(format!(
        "ステータス {} の家族の生存している親は {} である必要があります（現在: {} 人）",
        status, expected, living_parents
    ))
}

/// ステータスと構成員（死亡した親・子）が整合しているか
///
/// - Widowed: 死亡した親が 1 人以上
/// - Abandoned: 子が 1 人以上
pub fn status_membership_violation(
    status: FamilyStatus,
    deceased_parents: usize,
    children: usize,
) -> Option<String> {
    match status {
        FamilyStatus::Widowed if deceased_parents == 0 => {
            Some("死別の家族には死亡した親が 1 人以上必要です".to_string())
        }
        FamilyStatus::Abandoned if children == 0 => {
            Some("遺棄の家族には子が 1 人以上必要です".to_string())
        }
        _ => None,
    }
}

/// 子が親より後に生まれているか
pub fn birth_order_violation(parent: &Person, child: &Person) -> Option<String> {
    if child.birth_date() <= parent.birth_date() {
        return Some(format!(
            "子 {} の生年月日は親 {} の生年月日より後である必要があります",
            child.id(),
            parent.id()
        ));
    }
    None
}

/// 親子の年齢差が `min_years` 年以上あるか
///
/// 暦上の比較を行うため、ちょうど `min_years` 年 0 日は許可し、
/// 1 日でも足りなければ拒否する。
pub fn age_gap_violation(parent: &Person, child: &Person, min_years: u32) -> Option<String> {
    if child.birth_date() < years_after(parent.birth_date(), min_years) {
        return Some(format!(
            "親 {} と子 {} の年齢差は {} 年以上である必要があります",
            parent.id(),
            child.id(),
            min_years
        ));
    }
    None
}

/// 親が `now` 時点で `min_years` 歳以上か
pub fn parent_age_violation(parent: &Person, now: DateTime<Utc>, min_years: u32) -> Option<String> {
    if years_after(parent.birth_date(), min_years) > now {
        return Some(format!(
            "親 {} は {} 歳以上である必要があります",
            parent.id(),
            min_years
        ));
    }
    None
}

/// 死亡日が未来になっていないか
pub fn future_death_violation(person: &Person, now: DateTime<Utc>) -> Option<String> {
    match person.death_date() {
        Some(death_date) if death_date > now => Some(format!(
            "{} の死亡日を未来の日付にすることはできません",
            person.id()
        )),
        _ => None,
    }
}
