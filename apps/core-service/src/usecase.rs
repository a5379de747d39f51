//! # ユースケース層
//!
//! 家族の記録管理のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **トレイトベースの設計**: 利用者は [`FamilyUseCase`] に依存する
//! - **依存性注入**: リポジトリと時刻プロバイダを `Arc<dyn Trait>` で外部から注入
//! - **横断的関心事の分離**: ログ出力は [`LoggingFamilyUseCase`] がデコレータとして担う
//! - **キャンセル**: 全操作が `CancellationToken` を受け取る
//!
//! ## モジュール構成
//!
//! - `family`: 家族管理ユースケースの本体
//! - `logging`: tracing のスパン・イベントを付与するデコレータ

pub mod family;
pub(crate) mod helpers;
pub mod logging;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
pub use family::{
    AddParentInput,
    CreateFamilyInput,
    DivorceInput,
    DivorceOutput,
    FamilyUseCaseImpl,
};
pub use logging::LoggingFamilyUseCase;
use tokio_util::sync::CancellationToken;

use crate::{
    dto::{FamilyDto, ImportReport, PersonDto},
    error::CoreError,
};

/// 家族管理ユースケーストレイト
///
/// 失敗したエラーには操作名（`create_family` など）が付与される。
#[async_trait]
pub trait FamilyUseCase: Send + Sync {
    /// 家族を作成する
    async fn create_family(
        &self,
        cancel: &CancellationToken,
        input: CreateFamilyInput,
    ) -> Result<FamilyDto, CoreError>;

    /// 家族を取得する
    async fn get_family(&self, cancel: &CancellationToken, id: &str)
    -> Result<FamilyDto, CoreError>;

    /// すべての家族を取得する
    async fn get_all_families(&self, cancel: &CancellationToken)
    -> Result<Vec<FamilyDto>, CoreError>;

    /// 親を追加する（必要ならステータスも同時に変更する）
    async fn add_parent(
        &self,
        cancel: &CancellationToken,
        input: AddParentInput,
    ) -> Result<FamilyDto, CoreError>;

    /// ステータスを変更する
    async fn change_status(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        status: &str,
    ) -> Result<FamilyDto, CoreError>;

    /// 子を追加する
    async fn add_child(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        child: PersonDto,
    ) -> Result<FamilyDto, CoreError>;

    /// 子を取り除く
    async fn remove_child(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        child_id: &str,
    ) -> Result<FamilyDto, CoreError>;

    /// 親の死亡を登録する
    async fn mark_parent_deceased(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        parent_id: &str,
        death_date: DateTime<Utc>,
    ) -> Result<FamilyDto, CoreError>;

    /// 離婚により家族を分割する
    async fn divorce(
        &self,
        cancel: &CancellationToken,
        input: DivorceInput,
    ) -> Result<DivorceOutput, CoreError>;

    /// 指定された人物を親に持つ家族を取得する
    async fn find_families_by_parent(
        &self,
        cancel: &CancellationToken,
        parent_id: &str,
    ) -> Result<Vec<FamilyDto>, CoreError>;

    /// 指定された子が属する家族を取得する
    async fn find_family_by_child(
        &self,
        cancel: &CancellationToken,
        child_id: &str,
    ) -> Result<FamilyDto, CoreError>;

    /// 家族をまとめて作成する
    async fn import_families(
        &self,
        cancel: &CancellationToken,
        families: Vec<FamilyDto>,
    ) -> Result<ImportReport, CoreError>;
}

/// FamilyUseCaseImpl に FamilyUseCase トレイトを実装
#[async_trait]
impl FamilyUseCase for FamilyUseCaseImpl {
    async fn create_family(
        &self,
        cancel: &CancellationToken,
        input: CreateFamilyInput,
    ) -> Result<FamilyDto, CoreError> {
        self.create_family(cancel, input)
            .await
            .map_err(|e| e.with_use_case("create_family"))
    }

    async fn get_family(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<FamilyDto, CoreError> {
        self.get_family(cancel, id)
            .await
            .map_err(|e| e.with_use_case("get_family"))
    }

    async fn get_all_families(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<FamilyDto>, CoreError> {
        self.get_all_families(cancel)
            .await
            .map_err(|e| e.with_use_case("get_all_families"))
    }

    async fn add_parent(
        &self,
        cancel: &CancellationToken,
        input: AddParentInput,
    ) -> Result<FamilyDto, CoreError> {
        self.add_parent(cancel, input)
            .await
            .map_err(|e| e.with_use_case("add_parent"))
    }

    async fn change_status(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        status: &str,
    ) -> Result<FamilyDto, CoreError> {
        self.change_status(cancel, family_id, status)
            .await
            .map_err(|e| e.with_use_case("change_status"))
    }

    async fn add_child(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        child: PersonDto,
    ) -> Result<FamilyDto, CoreError> {
        self.add_child(cancel, family_id, child)
            .await
            .map_err(|e| e.with_use_case("add_child"))
    }

    async fn remove_child(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        child_id: &str,
    ) -> Result<FamilyDto, CoreError> {
        self.remove_child(cancel, family_id, child_id)
            .await
            .map_err(|e| e.with_use_case("remove_child"))
    }

    async fn mark_parent_deceased(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        parent_id: &str,
        death_date: DateTime<Utc>,
    ) -> Result<FamilyDto, CoreError> {
        self.mark_parent_deceased(cancel, family_id, parent_id, death_date)
            .await
            .map_err(|e| e.with_use_case("mark_parent_deceased"))
    }

    async fn divorce(
        &self,
        cancel: &CancellationToken,
        input: DivorceInput,
    ) -> Result<DivorceOutput, CoreError> {
        self.divorce(cancel, input)
            .await
            .map_err(|e| e.with_use_case("divorce"))
    }

    async fn find_families_by_parent(
        &self,
        cancel: &CancellationToken,
        parent_id: &str,
    ) -> Result<Vec<FamilyDto>, CoreError> {
        self.find_families_by_parent(cancel, parent_id)
            .await
            .map_err(|e| e.with_use_case("find_families_by_parent"))
    }

    async fn find_family_by_child(
        &self,
        cancel: &CancellationToken,
        child_id: &str,
    ) -> Result<FamilyDto, CoreError> {
        self.find_family_by_child(cancel, child_id)
            .await
            .map_err(|e| e.with_use_case("find_family_by_child"))
    }

    async fn import_families(
        &self,
        cancel: &CancellationToken,
        families: Vec<FamilyDto>,
    ) -> Result<ImportReport, CoreError> {
        self.import_families(cancel, families)
            .await
            .map_err(|e| e.with_use_case("import_families"))
    }
}
