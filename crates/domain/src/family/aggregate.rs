//! # 家族集約
//!
//! 家族の構成員とステータスを保持し、不変条件を守る操作だけを公開する。
//!
//! すべての操作は `&self` を受け取り、成功時に新しいスナップショットを返す。
//! 失敗した操作は元の集約に一切影響しない。各操作は最初に違反した不変条件で
//! 即座に失敗する（複数違反の集約は `validation` モジュールの役割）。
//!
//! ## 局所検証の範囲
//!
//! | 検証 | 内容 |
//! |------|------|
//! | 構造 | 親 1〜2 人、ID と（氏名・生年月日）の重複なし、親子の生年順と年齢差 |
//! | 年齢 | 親が 18 歳以上、死亡日が未来でない（現在時刻が必要な検証） |
//! | ステータス | 生存している親の人数・死亡した親・子の人数との整合 |
//!
//! `add_parent` はステータスを変更せず、ステータス整合も検証しない。
//! 独身の家族に親を追加した場合、呼び出し側が `change_status` で婚姻中へ遷移させる。

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::{
    FamilyStatus,
    invariants::{
        MAX_PARENTS,
        MIN_PARENT_AGE_YEARS,
        MIN_PARENT_CHILD_GAP_YEARS,
        age_gap_violation,
        birth_order_violation,
        future_death_violation,
        parent_age_violation,
        parent_bounds_violation,
        status_membership_violation,
        status_parent_count_violation,
    },
};
use crate::{
    DomainError,
    FamilyErrorCode,
    person::{Child, Parent, PersonId},
};

define_string_id! {
    /// 家族 ID
    pub struct FamilyId {
        label: "家族 ID",
    }
}

/// 家族エンティティ（集約ルート）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    id:       FamilyId,
    status:   FamilyStatus,
    parents:  Vec<Parent>,
    children: Vec<Child>,
}

/// 家族の新規作成パラメータ
pub struct NewFamily {
    pub id:       FamilyId,
    pub status:   FamilyStatus,
    pub parents:  Vec<Parent>,
    pub children: Vec<Child>,
    pub now:      DateTime<Utc>,
}

/// 永続化された家族の復元パラメータ
///
/// 保存時点で年齢に関する検証は済んでいるため、現在時刻は不要。
pub struct FamilyRecord {
    pub id:       FamilyId,
    pub status:   FamilyStatus,
    pub parents:  Vec<Parent>,
    pub children: Vec<Child>,
}

impl Family {
    /// 新しい家族を作成する
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 親の人数、生年順、年齢差、親の年齢、ステータス整合の違反
    /// - `DomainError::BusinessRule`: 親または子の重複
    pub fn new(params: NewFamily) -> Result<Self, DomainError> {
        let family = Self {
            id:       params.id,
            status:   params.status,
            parents:  params.parents,
            children: params.children,
        };
        family.ensure_structure()?;
        family.ensure_timely(params.now)?;
        family.ensure_status_consistency()?;
        Ok(family)
    }

    /// 永続化されたデータから復元する
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation` / `DomainError::BusinessRule`: 構造またはステータス整合の違反
    pub fn restore(record: FamilyRecord) -> Result<Self, DomainError> {
        let family = Self {
            id:       record.id,
            status:   record.status,
            parents:  record.parents,
            children: record.children,
        };
        family.ensure_structure()?;
        family.ensure_status_consistency()?;
        Ok(family)
    }

    // Getter メソッド

    pub fn id(&self) -> &FamilyId {
        &self.id
    }

    pub fn status(&self) -> FamilyStatus {
        self.status
    }

    pub fn parents(&self) -> &[Parent] {
        &self.parents
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn living_parent_count(&self) -> usize {
        self.parents.iter().filter(|p| p.is_living()).count()
    }

    pub fn deceased_parent_count(&self) -> usize {
        self.parents.len() - self.living_parent_count()
    }

    pub fn find_parent(&self, id: &PersonId) -> Option<&Parent> {
        self.parents.iter().find(|p| p.id() == id)
    }

    pub fn find_child(&self, id: &PersonId) -> Option<&Child> {
        self.children.iter().find(|c| c.id() == id)
    }

    // ビジネスロジックメソッド

    /// 親を追加した新しい家族を返す
    ///
    /// ステータスは変更しない。
    ///
    /// # Errors
    ///
    /// - `DomainError::BusinessRule(TooManyParents)`: すでに親が 2 人いる
    /// - `DomainError::BusinessRule(DuplicateParent)`: 同一 ID または同一（氏名・生年月日）の親がいる
    /// - `DomainError::Validation`: 親が 18 歳未満、既存の子との生年順・年齢差の違反
    pub fn add_parent(&self, parent: Parent, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if self.parents.len() >= MAX_PARENTS {
            return Err(DomainError::business_rule(
                FamilyErrorCode::TooManyParents,
                format!("家族 {} にはすでに親が {} 人います", self.id, MAX_PARENTS),
            ));
        }
        if self.find_parent(parent.id()).is_some() {
            return Err(DomainError::business_rule(
                FamilyErrorCode::DuplicateParent,
                format!("親 {} はすでに家族 {} に属しています", parent.id(), self.id),
            ));
        }
        if self
            .parents
            .iter()
            .any(|p| p.has_same_identity(parent.person()))
        {
            return Err(DomainError::business_rule(
                FamilyErrorCode::DuplicateParent,
                "同じ氏名・生年月日の親がすでに登録されています",
            ));
        }
        if let Some(message) = parent_age_violation(&parent, now, MIN_PARENT_AGE_YEARS)
            .or_else(|| future_death_violation(&parent, now))
        {
            return Err(DomainError::Validation(message));
        }
        for child in &self.children {
            ensure_parent_child_dates(&parent, child)?;
        }

        let mut parents = self.parents.clone();
        parents.push(parent);
        let family = Self {
            parents,
            ..self.clone()
        };
        family.ensure_structure()?;
        Ok(family)
    }

    /// ステータスを明示的に変更した新しい家族を返す
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 新しいステータスが構成員と整合しない
    pub fn change_status(&self, status: FamilyStatus) -> Result<Self, DomainError> {
        let family = Self {
            status,
            ..self.clone()
        };
        family.ensure_status_consistency()?;
        Ok(family)
    }

    /// 子を追加した新しい家族を返す
    ///
    /// # Errors
    ///
    /// - `DomainError::BusinessRule(DuplicateChild)`: 同一 ID の子がいる
    /// - `DomainError::Validation`: いずれかの親との生年順・年齢差の違反、死亡日が未来
    pub fn add_child(&self, child: Child, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if self.find_child(child.id()).is_some() {
            return Err(DomainError::business_rule(
                FamilyErrorCode::DuplicateChild,
                format!("子 {} はすでに家族 {} に属しています", child.id(), self.id),
            ));
        }
        if let Some(message) = future_death_violation(&child, now) {
            return Err(DomainError::Validation(message));
        }
        for parent in &self.parents {
            ensure_parent_child_dates(parent, &child)?;
        }

        let mut children = self.children.clone();
        children.push(child);
        let family = Self {
            children,
            ..self.clone()
        };
        family.ensure_structure()?;
        Ok(family)
    }

    /// 子を取り除いた新しい家族を返す
    ///
    /// # Errors
    ///
    /// - `DomainError::BusinessRule(ChildNotFound)`: 子が家族に属していない
    /// - `DomainError::BusinessRule(AbandonedRequiresChild)`: 遺棄の家族の最後の子
    pub fn remove_child(&self, child_id: &PersonId) -> Result<Self, DomainError> {
        if self.find_child(child_id).is_none() {
            return Err(DomainError::business_rule(
                FamilyErrorCode::ChildNotFound,
                format!("子 {} は家族 {} に属していません", child_id, self.id),
            ));
        }
        if self.status == FamilyStatus::Abandoned && self.children.len() == 1 {
            return Err(DomainError::business_rule(
                FamilyErrorCode::AbandonedRequiresChild,
                "遺棄の家族から最後の子を取り除くことはできません。先にステータスを変更してください",
            ));
        }

        let family = Self {
            children: self
                .children
                .iter()
                .filter(|c| c.id() != child_id)
                .cloned()
                .collect(),
            ..self.clone()
        };
        family.ensure_status_consistency()?;
        Ok(family)
    }

    /// 親の死亡を登録した新しい家族を返す
    ///
    /// ステータス遷移:
    /// - Married → Widowed
    /// - 生存している親がいなくなった Single / Divorced / Widowed → Widowed
    /// - Abandoned は変更しない
    ///
    /// # Errors
    ///
    /// - `DomainError::BusinessRule(ParentNotFound)`: 親が家族に属していない
    /// - `DomainError::BusinessRule(ParentAlreadyDeceased)`: 親はすでに死亡済み
    /// - `DomainError::Validation`: 死亡日が生年月日以前、または未来
    pub fn mark_parent_deceased(
        &self,
        parent_id: &PersonId,
        death_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let Some(index) = self.parents.iter().position(|p| p.id() == parent_id) else {
            return Err(DomainError::business_rule(
                FamilyErrorCode::ParentNotFound,
                format!("親 {} は家族 {} に属していません", parent_id, self.id),
            ));
        };
        let parent = &self.parents[index];
        if !parent.is_living() {
            return Err(DomainError::business_rule(
                FamilyErrorCode::ParentAlreadyDeceased,
                format!("親 {} はすでに死亡しています", parent_id),
            ));
        }
        if death_date > now {
            return Err(DomainError::Validation(
                "死亡日を未来の日付にすることはできません".to_string(),
            ));
        }

        let mut parents = self.parents.clone();
        parents[index] = parent.deceased(death_date)?;
        let living_after = parents.iter().filter(|p| p.is_living()).count();
        let status = match self.status {
            FamilyStatus::Married => FamilyStatus::Widowed,
            FamilyStatus::Abandoned => FamilyStatus::Abandoned,
            FamilyStatus::Single | FamilyStatus::Divorced | FamilyStatus::Widowed
                if living_after == 0 =>
            {
                FamilyStatus::Widowed
            }
            other => other,
        };

        let family = Self {
            status,
            parents,
            ..self.clone()
        };
        family.ensure_structure()?;
        family.ensure_status_consistency()?;
        Ok(family)
    }

    // 不変条件の検証

    /// 構造的な不変条件を検証する（現在時刻に依存しない）
    pub(super) fn ensure_structure(&self) -> Result<(), DomainError> {
        if let Some(message) = parent_bounds_violation(self.parents.len()) {
            return Err(DomainError::Validation(message));
        }

        let mut parent_ids = HashSet::new();
        for (i, parent) in self.parents.iter().enumerate() {
            if !parent_ids.insert(parent.id()) {
                return Err(DomainError::business_rule(
                    FamilyErrorCode::DuplicateParent,
                    format!("親 {} が重複しています", parent.id()),
                ));
            }
            if self.parents[..i]
                .iter()
                .any(|other| other.has_same_identity(parent.person()))
            {
                return Err(DomainError::business_rule(
                    FamilyErrorCode::DuplicateParent,
                    "同じ氏名・生年月日の親が重複しています",
                ));
            }
        }

        let mut child_ids = HashSet::new();
        for child in &self.children {
            if !child_ids.insert(child.id()) {
                return Err(DomainError::business_rule(
                    FamilyErrorCode::DuplicateChild,
                    format!("子 {} が重複しています", child.id()),
                ));
            }
            if parent_ids.contains(child.id()) {
                return Err(DomainError::Validation(format!(
                    "{} が親と子の両方に登録されています",
                    child.id()
                )));
            }
        }

        for parent in &self.parents {
            for child in &self.children {
                ensure_parent_child_dates(parent, child)?;
            }
        }
        Ok(())
    }

    /// 現在時刻に依存する不変条件を検証する
    fn ensure_timely(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        for parent in &self.parents {
            if let Some(message) = parent_age_violation(parent, now, MIN_PARENT_AGE_YEARS)
                .or_else(|| future_death_violation(parent, now))
            {
                return Err(DomainError::Validation(message));
            }
        }
        for child in &self.children {
            if let Some(message) = future_death_violation(child, now) {
                return Err(DomainError::Validation(message));
            }
        }
        Ok(())
    }

    /// ステータスと構成員の整合を検証する
    pub(super) fn ensure_status_consistency(&self) -> Result<(), DomainError> {
        let message =
            status_parent_count_violation(self.status, self.living_parent_count()).or_else(|| {
                status_membership_violation(
                    self.status,
                    self.deceased_parent_count(),
                    self.children.len(),
                )
            });
        match message {
            Some(message) => Err(DomainError::Validation(message)),
            None => Ok(()),
        }
    }

    /// 分割後の家族を組み立てる（離婚用）
    pub(super) fn split_off(
        id: FamilyId,
        status: FamilyStatus,
        parents: Vec<Parent>,
        children: Vec<Child>,
    ) -> Result<Self, DomainError> {
        let family = Self {
            id,
            status,
            parents,
            children,
        };
        family.ensure_structure()?;
        family.ensure_status_consistency()?;
        Ok(family)
    }
}

fn ensure_parent_child_dates(parent: &Parent, child: &Child) -> Result<(), DomainError> {
    match birth_order_violation(parent, child)
        .or_else(|| age_gap_violation(parent, child, MIN_PARENT_CHILD_GAP_YEARS))
    {
        Some(message) => Err(DomainError::Validation(message)),
        None => Ok(()),
    }
}
