//! # バリデーションパイプライン
//!
//! 集約の操作が行う局所検証（最初の違反で即座に失敗）とは別に、
//! エンティティ全体に対するルール群を評価し、違反を **すべて** 集めて返す。
//! ユースケース層は保存の直前にパイプラインを実行する。
//!
//! ## 構成
//!
//! | 型 | 役割 |
//! |----|------|
//! | [`Rule`] | 1 つの判定。違反は 1 件か、なし |
//! | [`RuleNode`] | ルールの木の節（葉 = ルール、内部節点 = 複合ルール） |
//! | [`CompositeRule`] | 名前付きのルール群。配下の違反を `causes` にまとめる |
//! | [`ValidationPipeline`] | 順序付きの節のリスト。全節を評価する |
//!
//! パイプラインは 1 つのエンティティ型ごとに具体化する（`ValidationPipeline<Family>`）。
//! 実行時の型判定は行わない。
//!
//! ## 使用例
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use familia_domain::validation::{
//!     CompositeRule, Rule, RuleContext, RuleNode, ValidationError, ValidationPipeline,
//! };
//!
//! struct Positive;
//!
//! impl Rule<i64> for Positive {
//!     fn name(&self) -> &'static str {
//!         "positive"
//!     }
//!
//!     fn check(&self, _ctx: &RuleContext, target: &i64) -> Result<(), ValidationError> {
//!         if *target > 0 {
//!             Ok(())
//!         } else {
//!             Err(ValidationError::new(self.name(), "正の数である必要があります"))
//!         }
//!     }
//! }
//!
//! let pipeline = ValidationPipeline::new()
//!     .with_node(RuleNode::Composite(CompositeRule::new("sign", vec![RuleNode::leaf(Positive)])));
//! let ctx = RuleContext::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
//!
//! assert!(pipeline.validate(&ctx, &1).is_ok());
//!
//! let result = pipeline.evaluate(&ctx, &-1);
//! assert!(!result.valid);
//! assert_eq!(result.errors[0].code, "composite_rule_failed");
//! assert_eq!(result.errors[0].causes[0].code, "positive");
//! ```

pub mod family_rules;
mod pipeline;
mod rule;

pub use family_rules::{RulePolicy, family_pipeline};
pub use pipeline::*;
pub use rule::*;
