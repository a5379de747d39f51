//! # Familia 共有ユーティリティ
//!
//! プロジェクト全体で使用される横断的なユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない
//! - トレーシングの依存は `observability` feature の背後に置く

pub mod event_log;
pub mod observability;
