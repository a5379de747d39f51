//! # 家族のルール
//!
//! 判定は [`crate::family::invariants`] の関数に委ねる。集約の局所検証と
//! 同じ関数を使うため、両者の判定は一致する。
//!
//! 標準パイプライン（[`family_pipeline`]）の構成:
//!
//! ```text
//! membership ─ UniqueMembers
//! age        ─ ParentMinimumAge, ChildBornAfterParents, ParentChildAgeGap
//! status     ─ FamilyConsistency, StatusMembership
//! ```

use std::collections::HashSet;

use super::{CompositeRule, Rule, RuleContext, RuleNode, ValidationError, ValidationPipeline};
use crate::{
    DomainError,
    family::{
        Family,
        FamilyStatus,
        invariants::{
            MIN_PARENT_AGE_YEARS,
            MIN_PARENT_CHILD_GAP_YEARS,
            age_gap_violation,
            birth_order_violation,
            parent_age_violation,
            parent_bounds_violation,
            status_membership_violation,
            status_parent_count_violation,
        },
    },
};

/// ルールの閾値
///
/// 既定値は集約の定数と同じ。設定で厳しくすることはできるが、緩めることはできない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulePolicy {
    min_parent_age_years:       u32,
    min_parent_child_gap_years: u32,
}

impl Default for RulePolicy {
    fn default() -> Self {
        Self {
            min_parent_age_years:       MIN_PARENT_AGE_YEARS,
            min_parent_child_gap_years: MIN_PARENT_CHILD_GAP_YEARS,
        }
    }
}

impl RulePolicy {
    /// 閾値を指定して作成する
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: いずれかの閾値が集約の最低値を下回る
    pub fn new(
        min_parent_age_years: u32,
        min_parent_child_gap_years: u32,
    ) -> Result<Self, DomainError> {
        if min_parent_age_years < MIN_PARENT_AGE_YEARS {
            return Err(DomainError::Validation(format!(
                "親の最低年齢は {} 歳未満にできません（指定: {}）",
                MIN_PARENT_AGE_YEARS, min_parent_age_years
            )));
        }
        if min_parent_child_gap_years < MIN_PARENT_CHILD_GAP_YEARS {
            return Err(DomainError::Validation(format!(
                "親子の最低年齢差は {} 年未満にできません（指定: {}）",
                MIN_PARENT_CHILD_GAP_YEARS, min_parent_child_gap_years
            )));
        }
        Ok(Self {
            min_parent_age_years,
            min_parent_child_gap_years,
        })
    }

    pub fn min_parent_age_years(&self) -> u32 {
        self.min_parent_age_years
    }

    pub fn min_parent_child_gap_years(&self) -> u32 {
        self.min_parent_child_gap_years
    }
}

/// 標準の家族パイプラインを組み立てる
pub fn family_pipeline(policy: &RulePolicy) -> ValidationPipeline<Family> {
    ValidationPipeline::new()
        .with_node(RuleNode::Composite(CompositeRule::new(
            "membership",
            vec![RuleNode::leaf(UniqueMembers)],
        )))
        .with_node(RuleNode::Composite(CompositeRule::new(
            "age",
            vec![
                RuleNode::leaf(ParentMinimumAge {
                    min_years: policy.min_parent_age_years,
                }),
                RuleNode::leaf(ChildBornAfterParents),
                RuleNode::leaf(ParentChildAgeGap {
                    min_years: policy.min_parent_child_gap_years,
                }),
            ],
        )))
        .with_node(RuleNode::Composite(CompositeRule::new(
            "status",
            vec![
                RuleNode::leaf(FamilyConsistency),
                RuleNode::leaf(StatusMembership),
            ],
        )))
}

fn violation(rule: &impl Rule<Family>, message: Option<String>) -> Result<(), ValidationError> {
    match message {
        Some(message) => Err(ValidationError::new(rule.name(), message)),
        None => Ok(()),
    }
}

/// 親が基準時刻に `min_years` 歳以上である
pub struct ParentMinimumAge {
    pub min_years: u32,
}

impl Rule<Family> for ParentMinimumAge {
    fn name(&self) -> &'static str {
        "parent_minimum_age"
    }

    fn check(&self, ctx: &RuleContext, family: &Family) -> Result<(), ValidationError> {
        let message = family
            .parents()
            .iter()
            .find_map(|p| parent_age_violation(p, ctx.now, self.min_years));
        violation(self, message)
    }
}

/// すべての子がすべての親より後に生まれている
pub struct ChildBornAfterParents;

impl Rule<Family> for ChildBornAfterParents {
    fn name(&self) -> &'static str {
        "child_born_after_parents"
    }

    fn check(&self, _ctx: &RuleContext, family: &Family) -> Result<(), ValidationError> {
        let message = family.parents().iter().find_map(|p| {
            family
                .children()
                .iter()
                .find_map(|c| birth_order_violation(p, c))
        });
        violation(self, message)
    }
}

/// 親子の年齢差が `min_years` 年以上ある
pub struct ParentChildAgeGap {
    pub min_years: u32,
}

impl Rule<Family> for ParentChildAgeGap {
    fn name(&self) -> &'static str {
        "parent_child_age_gap"
    }

    fn check(&self, _ctx: &RuleContext, family: &Family) -> Result<(), ValidationError> {
        let message = family.parents().iter().find_map(|p| {
            family
                .children()
                .iter()
                .find_map(|c| age_gap_violation(p, c, self.min_years))
        });
        violation(self, message)
    }
}

/// Single / Married の家族の生存している親の人数
///
/// 他のステータスは判定しない（[`FamilyConsistency`] が全ステータスを扱う）。
pub struct StatusParentCount;

impl Rule<Family> for StatusParentCount {
    fn name(&self) -> &'static str {
        "status_parent_count"
    }

    fn check(&self, _ctx: &RuleContext, family: &Family) -> Result<(), ValidationError> {
        let message = match family.status() {
            FamilyStatus::Single | FamilyStatus::Married => {
                status_parent_count_violation(family.status(), family.living_parent_count())
            }
            _ => None,
        };
        violation(self, message)
    }
}

/// 親のレコード数と、全ステータスについての生存している親の人数
pub struct FamilyConsistency;

impl Rule<Family> for FamilyConsistency {
    fn name(&self) -> &'static str {
        "family_consistency"
    }

    fn check(&self, _ctx: &RuleContext, family: &Family) -> Result<(), ValidationError> {
        let message = parent_bounds_violation(family.parents().len()).or_else(|| {
            status_parent_count_violation(family.status(), family.living_parent_count())
        });
        violation(self, message)
    }
}

/// 死別の家族の死亡した親と、遺棄の家族の子
pub struct StatusMembership;

impl Rule<Family> for StatusMembership {
    fn name(&self) -> &'static str {
        "status_membership"
    }

    fn check(&self, _ctx: &RuleContext, family: &Family) -> Result<(), ValidationError> {
        let message = status_membership_violation(
            family.status(),
            family.deceased_parent_count(),
            family.children().len(),
        );
        violation(self, message)
    }
}

/// 構成員の ID の重複と、同一（氏名・生年月日）の親の重複
pub struct UniqueMembers;

impl Rule<Family> for UniqueMembers {
    fn name(&self) -> &'static str {
        "unique_members"
    }

    fn check(&self, _ctx: &RuleContext, family: &Family) -> Result<(), ValidationError> {
        let mut ids = HashSet::new();
        let members = family
            .parents()
            .iter()
            .map(|p| p.person())
            .chain(family.children().iter().map(|c| c.person()));
        for member in members {
            if !ids.insert(member.id()) {
                return Err(ValidationError::new(
                    self.name(),
                    format!("{} が家族内で重複しています", member.id()),
                ));
            }
        }

        let parents = family.parents();
        for (i, parent) in parents.iter().enumerate() {
            if parents[i + 1..]
                .iter()
                .any(|other| other.has_same_identity(parent.person()))
            {
                return Err(ValidationError::new(
                    self.name(),
                    "同じ氏名・生年月日の親が重複しています",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{
        family::{FamilyId, NewFamily},
        person::{Child, FirstName, LastName, NewPerson, Parent, Person, PersonId},
        validation::COMPOSITE_RULE_FAILED,
    };

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn person(id: &str, first: &str, birth_date: DateTime<Utc>) -> Person {
        Person::new(NewPerson {
            id: PersonId::new(id).unwrap(),
            first_name: FirstName::new(first).unwrap(),
            last_name: LastName::new("鈴木").unwrap(),
            birth_date,
            death_date: None,
        })
        .unwrap()
    }

    #[fixture]
    fn ctx() -> RuleContext {
        RuleContext::new(date(2024, 6, 1))
    }

    #[fixture]
    fn married(ctx: RuleContext) -> Family {
        Family::new(NewFamily {
            id: FamilyId::new("f1").unwrap(),
            status: FamilyStatus::Married,
            parents: vec![
                Parent::new(person("P1", "太郎", date(1980, 5, 15))),
                Parent::new(person("P2", "花子", date(1982, 8, 22))),
            ],
            children: vec![Child::new(person("C1", "一郎", date(2000, 1, 1)))],
            now: ctx.now,
        })
        .unwrap()
    }

    /// 独身のまま親が 2 人になった家族（ステータス変更前の状態）
    #[fixture]
    fn single_with_two_parents(ctx: RuleContext) -> Family {
        Family::new(NewFamily {
            id: FamilyId::new("f2").unwrap(),
            status: FamilyStatus::Single,
            parents: vec![Parent::new(person("P3", "次郎", date(1985, 1, 1)))],
            children: vec![],
            now: ctx.now,
        })
        .unwrap()
        .add_parent(Parent::new(person("P4", "三郎", date(1984, 3, 3))), ctx.now)
        .unwrap()
    }

    #[rstest]
    fn test_整合した家族は標準パイプラインを通過する(ctx: RuleContext, married: Family) {
        let pipeline = family_pipeline(&RulePolicy::default());

        assert!(pipeline.validate(&ctx, &married).is_ok());
    }

    #[rstest]
    fn test_独身で親が2人の家族はステータス整合で失敗する(
        ctx: RuleContext,
        single_with_two_parents: Family,
    ) {
        let pipeline = family_pipeline(&RulePolicy::default());

        let result = pipeline.evaluate(&ctx, &single_with_two_parents);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        let status = &result.errors[0];
        assert_eq!(status.code, COMPOSITE_RULE_FAILED);
        assert_eq!(status.message, "composite rule 'status' failed");
        assert_eq!(status.field.as_deref(), Some("status"));
        assert_eq!(status.causes.len(), 1);
        assert_eq!(status.causes[0].code, "family_consistency");
    }

    #[rstest]
    fn test_ステータス変更後はパイプラインを通過する(
        ctx: RuleContext,
        single_with_two_parents: Family,
    ) {
        let pipeline = family_pipeline(&RulePolicy::default());
        let married = single_with_two_parents
            .change_status(FamilyStatus::Married)
            .unwrap();

        assert!(pipeline.validate(&ctx, &married).is_ok());
    }

    #[rstest]
    fn test_複数の複合ルールの違反をすべて集める(
        ctx: RuleContext,
        single_with_two_parents: Family,
    ) {
        let strict = RulePolicy::new(60, 12).unwrap();
        let pipeline = family_pipeline(&strict);

        let result = pipeline.evaluate(&ctx, &single_with_two_parents);

        let fields: Vec<Option<&str>> = result.errors.iter().map(|e| e.field.as_deref()).collect();
        assert_eq!(fields, vec![Some("age"), Some("status")]);
        assert_eq!(result.errors[0].causes[0].code, "parent_minimum_age");
    }

    #[rstest]
    fn test_厳しい年齢差の設定で親子の年齢差違反を検出する(ctx: RuleContext, married: Family) {
        // P2 と C1 の年齢差は 17 年
        let pipeline = family_pipeline(&RulePolicy::new(18, 18).unwrap());

        let result = pipeline.evaluate(&ctx, &married);

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].causes[0].code, "parent_child_age_gap");
    }

    #[rstest]
    fn test_パイプラインは冪等(ctx: RuleContext, single_with_two_parents: Family) {
        let pipeline = family_pipeline(&RulePolicy::new(60, 30).unwrap());

        let first = pipeline.evaluate(&ctx, &single_with_two_parents);
        let second = pipeline.evaluate(&ctx, &single_with_two_parents);

        assert_eq!(first, second);
    }

    #[rstest]
    fn test_標準パイプラインの構成() {
        let pipeline = family_pipeline(&RulePolicy::default());

        let names: Vec<&str> = pipeline.nodes().iter().map(RuleNode::name).collect();

        assert_eq!(names, vec!["membership", "age", "status"]);
    }

    #[rstest]
    #[case(FamilyStatus::Single, true)]
    #[case(FamilyStatus::Married, false)]
    fn test_単体ルールの判定(
        ctx: RuleContext,
        single_with_two_parents: Family,
        #[case] status: FamilyStatus,
        #[case] status_parent_count_fails: bool,
    ) {
        let family = if status == FamilyStatus::Single {
            single_with_two_parents
        } else {
            single_with_two_parents.change_status(status).unwrap()
        };

        assert_eq!(
            StatusParentCount.check(&ctx, &family).is_err(),
            status_parent_count_fails
        );
        assert!(ChildBornAfterParents.check(&ctx, &family).is_ok());
        assert!(UniqueMembers.check(&ctx, &family).is_ok());
    }

    #[rstest]
    fn test_死別の家族は構成員ルールを満たす(ctx: RuleContext, married: Family) {
        let widowed = married
            .mark_parent_deceased(&PersonId::new("P1").unwrap(), date(2023, 4, 15), ctx.now)
            .unwrap();

        assert!(StatusMembership.check(&ctx, &widowed).is_ok());
        assert!(FamilyConsistency.check(&ctx, &widowed).is_ok());
        assert!(StatusParentCount.check(&ctx, &widowed).is_ok());
    }

    #[rstest]
    #[case(17, 12)]
    #[case(18, 11)]
    fn test_最低値を下回る閾値は拒否する(#[case] age: u32, #[case] gap: u32) {
        assert!(matches!(
            RulePolicy::new(age, gap),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_既定の閾値() {
        let policy = RulePolicy::default();

        assert_eq!(policy.min_parent_age_years(), 18);
        assert_eq!(policy.min_parent_child_gap_years(), 12);
    }
}
