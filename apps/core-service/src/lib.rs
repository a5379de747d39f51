//! # Core Service ライブラリ
//!
//! 家族の記録を管理するユースケースと、その入出力（DTO・エラー・設定）を公開する。
//! バイナリ `familia-import` と統合テストはこのクレートを通して利用する。

pub mod config;
pub mod dto;
pub mod error;
pub mod usecase;
