//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! `jq` で調査しやすいよう、ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! `tracing::warn!` / `tracing::error!` に `error.category` + `error.kind` フィールドを
//! 直接追加する。定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID
/// - `event.result`: 結果（[`event::result`] の定数を使用）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const FAMILY: &str = "family";
        pub const IMPORT: &str = "import";
    }

    /// イベントアクション
    pub mod action {
        pub const FAMILY_CREATED: &str = "family.created";
        pub const PARENT_ADDED: &str = "family.parent_added";
        pub const STATUS_CHANGED: &str = "family.status_changed";
        pub const CHILD_ADDED: &str = "family.child_added";
        pub const CHILD_REMOVED: &str = "family.child_removed";
        pub const PARENT_DECEASED: &str = "family.parent_deceased";
        pub const FAMILY_DIVORCED: &str = "family.divorced";
        pub const FAMILIES_IMPORTED: &str = "import.completed";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const FAMILY: &str = "family";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 入力・業務ルールに起因する（呼び出し側で対処できる）
        pub const DOMAIN: &str = "domain";
        /// 永続化
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// キャンセル
        pub const CANCELLATION: &str = "cancellation";
    }

    /// エラー種別
    pub mod kind {
        pub const VALIDATION: &str = "validation";
        pub const BUSINESS_RULE: &str = "business_rule";
        pub const NOT_FOUND: &str = "not_found";
        pub const DATABASE: &str = "database";
        pub const CANCELLED: &str = "cancelled";
    }
}
