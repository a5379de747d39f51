//! ルールの木とパイプライン

use serde::Serialize;

use super::{Rule, RuleContext, ValidationError, ValidationErrors};

/// 複合ルールが失敗したときのエラーコード
pub const COMPOSITE_RULE_FAILED: &str = "composite_rule_failed";

/// ルールの木の節
pub enum RuleNode<T> {
    Leaf(Box<dyn Rule<T>>),
    Composite(CompositeRule<T>),
}

impl<T> RuleNode<T> {
    pub fn leaf(rule: impl Rule<T> + 'static) -> Self {
        Self::Leaf(Box::new(rule))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(rule) => rule.name(),
            Self::Composite(composite) => &composite.name,
        }
    }

    /// 帰りがけ順で評価する（配下の節を先に評価してから自身の結果を決める）
    fn evaluate(&self, ctx: &RuleContext, target: &T) -> Result<(), ValidationError> {
        match self {
            Self::Leaf(rule) => rule.check(ctx, target),
            Self::Composite(composite) => composite.evaluate(ctx, target),
        }
    }
}

/// 名前付きのルール群
///
/// 配下のいずれかが失敗すると、すべての失敗を `causes` に保持した
/// 1 件のエラーとして失敗する。
pub struct CompositeRule<T> {
    name:  String,
    nodes: Vec<RuleNode<T>>,
}

impl<T> CompositeRule<T> {
    pub fn new(name: impl Into<String>, nodes: Vec<RuleNode<T>>) -> Self {
        Self {
            name: name.into(),
            nodes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[RuleNode<T>] {
        &self.nodes
    }

    fn evaluate(&self, ctx: &RuleContext, target: &T) -> Result<(), ValidationError> {
        let causes: Vec<ValidationError> = self
            .nodes
            .iter()
            .filter_map(|node| node.evaluate(ctx, target).err())
            .collect();
        if causes.is_empty() {
            return Ok(());
        }
        Err(ValidationError::new(
            COMPOSITE_RULE_FAILED,
            format!("composite rule '{}' failed", self.name),
        )
        .with_field(self.name.clone())
        .with_causes(causes))
    }
}

/// バリデーション結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid:  bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.valid {
            Ok(())
        } else {
            Err(ValidationErrors::new(self.errors))
        }
    }
}

/// 順序付きのルールの節のリスト
///
/// 先行する節が失敗しても後続の節を必ず評価する。
pub struct ValidationPipeline<T> {
    nodes: Vec<RuleNode<T>>,
}

impl<T> Default for ValidationPipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValidationPipeline<T> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn with_node(mut self, node: RuleNode<T>) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_rule(self, rule: impl Rule<T> + 'static) -> Self {
        self.with_node(RuleNode::leaf(rule))
    }

    pub fn nodes(&self) -> &[RuleNode<T>] {
        &self.nodes
    }

    /// すべての節を評価し、違反を集めて返す
    pub fn evaluate(&self, ctx: &RuleContext, target: &T) -> ValidationResult {
        let errors: Vec<ValidationError> = self
            .nodes
            .iter()
            .filter_map(|node| node.evaluate(ctx, target).err())
            .collect();
        ValidationResult {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// すべての節を評価し、違反があれば集約エラーを返す
    ///
    /// # Errors
    ///
    /// 1 件以上の違反がある場合 [`ValidationErrors`]
    pub fn validate(&self, ctx: &RuleContext, target: &T) -> Result<(), ValidationErrors> {
        self.evaluate(ctx, target).into_result()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    /// 閾値以上であることを要求するテスト用ルール
    struct AtLeast(i32);

    impl Rule<i32> for AtLeast {
        fn name(&self) -> &'static str {
            "at_least"
        }

        fn check(&self, _ctx: &RuleContext, target: &i32) -> Result<(), ValidationError> {
            if *target >= self.0 {
                Ok(())
            } else {
                Err(ValidationError::new(self.name(), format!("{} 以上", self.0)))
            }
        }
    }

    struct Even;

    impl Rule<i32> for Even {
        fn name(&self) -> &'static str {
            "even"
        }

        fn check(&self, _ctx: &RuleContext, target: &i32) -> Result<(), ValidationError> {
            if target % 2 == 0 {
                Ok(())
            } else {
                Err(ValidationError::new(self.name(), "偶数"))
            }
        }
    }

    #[fixture]
    fn ctx() -> RuleContext {
        RuleContext::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[fixture]
    fn pipeline() -> ValidationPipeline<i32> {
        ValidationPipeline::new()
            .with_rule(AtLeast(10))
            .with_node(RuleNode::Composite(CompositeRule::new(
                "shape",
                vec![
                    RuleNode::leaf(Even),
                    RuleNode::Composite(CompositeRule::new(
                        "range",
                        vec![RuleNode::leaf(AtLeast(100))],
                    )),
                ],
            )))
    }

    #[rstest]
    fn test_すべての節を満たせば有効(ctx: RuleContext, pipeline: ValidationPipeline<i32>) {
        let result = pipeline.evaluate(&ctx, &100);

        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(pipeline.validate(&ctx, &100).is_ok());
    }

    #[rstest]
    fn test_先行する失敗があっても全節を評価する(
        ctx: RuleContext,
        pipeline: ValidationPipeline<i32>,
    ) {
        let result = pipeline.evaluate(&ctx, &3);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].code, "at_least");
        assert_eq!(result.errors[1].code, COMPOSITE_RULE_FAILED);
    }

    #[rstest]
    fn test_複合ルールは配下の失敗を原因として保持する(
        ctx: RuleContext,
        pipeline: ValidationPipeline<i32>,
    ) {
        let result = pipeline.evaluate(&ctx, &3);
        let shape = &result.errors[1];

        assert_eq!(shape.message, "composite rule 'shape' failed");
        assert_eq!(shape.field.as_deref(), Some("shape"));
        assert_eq!(shape.causes.len(), 2);
        assert_eq!(shape.causes[0].code, "even");
        assert_eq!(shape.causes[1].field.as_deref(), Some("range"));
        assert_eq!(shape.causes[1].causes[0].code, "at_least");
    }

    #[rstest]
    fn test_配下が成功した複合ルールはエラーを出さない(
        ctx: RuleContext,
        pipeline: ValidationPipeline<i32>,
    ) {
        let result = pipeline.evaluate(&ctx, &12);

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].causes.len(), 1);
        assert_eq!(result.errors[0].causes[0].field.as_deref(), Some("range"));
    }

    #[rstest]
    fn test_同じ対象を2回評価すると同じ結果になる(
        ctx: RuleContext,
        pipeline: ValidationPipeline<i32>,
    ) {
        assert_eq!(pipeline.evaluate(&ctx, &3), pipeline.evaluate(&ctx, &3));
    }

    #[rstest]
    fn test_validateは全違反を集約エラーで返す(ctx: RuleContext, pipeline: ValidationPipeline<i32>) {
        let errors = pipeline.validate(&ctx, &3).unwrap_err();

        assert_eq!(errors.errors().len(), 2);
    }

    #[rstest]
    fn test_空のパイプラインは常に有効(ctx: RuleContext) {
        let pipeline = ValidationPipeline::<i32>::default();

        assert!(pipeline.evaluate(&ctx, &-1).valid);
    }

    #[test]
    fn test_節の名前() {
        let leaf: RuleNode<i32> = RuleNode::leaf(Even);
        let composite: RuleNode<i32> = RuleNode::Composite(CompositeRule::new("c", vec![]));

        assert_eq!(leaf.name(), "even");
        assert_eq!(composite.name(), "c");
    }
}
