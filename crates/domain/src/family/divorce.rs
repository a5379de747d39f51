//! # 離婚による家族の分割
//!
//! 婚姻中の家族を 2 つの離婚済み家族に分割する。
//! 子の振り分けは呼び出し側が明示的に指定する。

use std::collections::HashSet;

use super::{Family, FamilyId, FamilyStatus};
use crate::{
    DomainError,
    FamilyErrorCode,
    person::{Child, Parent, PersonId},
};

/// 離婚のパラメータ
pub struct DivorceParams {
    /// 親権を持つ親が移る新しい家族の ID
    pub new_family_id:       FamilyId,
    /// 新しい家族へ移る親
    pub custodial_parent_id: PersonId,
    /// 新しい家族へ移る子
    pub child_ids:           Vec<PersonId>,
}

/// 離婚の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivorceOutcome {
    /// 元の ID を持ち、残る親と指定されなかった子を保持する家族
    pub remaining: Family,
    /// 新しい ID を持ち、親権を持つ親と指定された子を保持する家族
    pub departed:  Family,
}

impl Family {
    /// 婚姻中の家族を分割する
    ///
    /// 分割後の 2 家族はどちらもステータスが Divorced になる。
    ///
    /// # Errors
    ///
    /// - `DomainError::BusinessRule(NotMarried)`: 婚姻中でない
    /// - `DomainError::BusinessRule(ParentNotFound)`: 親権を持つ親が家族に属していない
    /// - `DomainError::BusinessRule(ChildNotFound)`: 指定された子が家族に属していない
    /// - `DomainError::BusinessRule(DuplicateChild)`: 子が重複して指定された
    /// - `DomainError::Validation`: 新しい家族 ID が元の家族 ID と同じ
    pub fn divorce(&self, params: DivorceParams) -> Result<DivorceOutcome, DomainError> {
        if self.status() != FamilyStatus::Married {
            return Err(DomainError::business_rule(
                FamilyErrorCode::NotMarried,
                format!(
                    "離婚できるのは婚姻中の家族のみです（家族 {}: {}）",
                    self.id(),
                    self.status()
                ),
            ));
        }
        if self.find_parent(&params.custodial_parent_id).is_none() {
            return Err(DomainError::business_rule(
                FamilyErrorCode::ParentNotFound,
                format!(
                    "親 {} は家族 {} に属していません",
                    params.custodial_parent_id,
                    self.id()
                ),
            ));
        }
        if &params.new_family_id == self.id() {
            return Err(DomainError::Validation(
                "新しい家族 ID は元の家族 ID と異なる必要があります".to_string(),
            ));
        }

        let mut moving = HashSet::new();
        for child_id in &params.child_ids {
            if self.find_child(child_id).is_none() {
                return Err(DomainError::business_rule(
                    FamilyErrorCode::ChildNotFound,
                    format!("子 {} は家族 {} に属していません", child_id, self.id()),
                ));
            }
            if !moving.insert(child_id) {
                return Err(DomainError::business_rule(
                    FamilyErrorCode::DuplicateChild,
                    format!("子 {} が重複して指定されています", child_id),
                ));
            }
        }

        let (departing_parents, remaining_parents): (Vec<Parent>, Vec<Parent>) = self
            .parents()
            .iter()
            .cloned()
            .partition(|p| p.id() == &params.custodial_parent_id);
        let (departing_children, remaining_children): (Vec<Child>, Vec<Child>) = self
            .children()
            .iter()
            .cloned()
            .partition(|c| moving.contains(c.id()));

        let remaining = Family::split_off(
            self.id().clone(),
            FamilyStatus::Divorced,
            remaining_parents,
            remaining_children,
        )?;
        let departed = Family::split_off(
            params.new_family_id,
            FamilyStatus::Divorced,
            departing_parents,
            departing_children,
        )?;

        Ok(DivorceOutcome {
            remaining,
            departed,
        })
    }
}
