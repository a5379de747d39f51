//! 家族管理ユースケース
//!
//! すべての変更操作は同じ流れをたどる:
//!
//! 1. キャンセルの確認
//! 2. リポジトリから集約を読み込む（存在しなければ NotFound）
//! 3. 集約のメソッドで新しいスナップショットを得る
//! 4. バリデーションパイプラインで家族全体を検証する
//! 5. リポジトリに保存する
//! 6. DTO に変換して返す
//!
//! 検索系は ID の検証だけを行い、リポジトリに直接問い合わせる。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use familia_domain::{
    DomainError,
    FamilyErrorCode,
    clock::Clock,
    family::{DivorceParams, Family, FamilyId, FamilyStatus, NewFamily},
    person::{Child, Parent, PersonId},
    validation::{RuleContext, RulePolicy, ValidationPipeline, family_pipeline},
};
use familia_infra::{error::InfraErrorKind, repository::FamilyRepository};
use tokio_util::sync::CancellationToken;

use super::helpers::{FindResultExt, ensure_not_cancelled, until_cancelled};
use crate::{
    dto::{FamilyDto, ImportFailure, ImportReport, PersonDto},
    error::CoreError,
};

const FAMILY: &str = "家族";

/// 家族作成の入力
///
/// `id` を省略すると新しい ID を採番する。
#[derive(Debug, Clone)]
pub struct CreateFamilyInput {
    pub id:       Option<String>,
    pub status:   String,
    pub parents:  Vec<PersonDto>,
    pub children: Vec<PersonDto>,
}

impl CreateFamilyInput {
    /// 家族の作成パラメータに変換する
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: ID・ステータス・人物の値が不正
    pub(crate) fn to_new_family(&self, now: DateTime<Utc>) -> Result<NewFamily, DomainError> {
        let id = match &self.id {
            Some(id) => FamilyId::new(id.as_str())?,
            None => FamilyId::generate(),
        };
        Ok(NewFamily {
            id,
            status: self.status.parse::<FamilyStatus>()?,
            parents: self
                .parents
                .iter()
                .map(|p| p.to_person().map(Parent::new))
                .collect::<Result<_, _>>()?,
            children: self
                .children
                .iter()
                .map(|c| c.to_person().map(Child::new))
                .collect::<Result<_, _>>()?,
            now,
        })
    }
}

impl From<FamilyDto> for CreateFamilyInput {
    fn from(dto: FamilyDto) -> Self {
        Self {
            id:       Some(dto.id),
            status:   dto.status,
            parents:  dto.parents,
            children: dto.children,
        }
    }
}

/// 親追加の入力
///
/// `status` を指定すると、親の追加と同時にステータスを変更する。
/// 指定しない場合ステータスは変わらず、構成と整合しなければ検証で失敗する。
#[derive(Debug, Clone)]
pub struct AddParentInput {
    pub family_id: String,
    pub parent:    PersonDto,
    pub status:    Option<String>,
}

/// 離婚の入力
#[derive(Debug, Clone)]
pub struct DivorceInput {
    pub family_id:           String,
    /// 新しい家族へ移る親
    pub custodial_parent_id: String,
    /// 新しい家族へ移る子
    pub child_ids:           Vec<String>,
}

/// 離婚の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivorceOutput {
    /// 元の ID のまま残る家族
    pub original:   FamilyDto,
    /// 新しく採番された家族
    pub new_family: FamilyDto,
}

/// 家族管理ユースケース
pub struct FamilyUseCaseImpl {
    repository: Arc<dyn FamilyRepository>,
    clock:      Arc<dyn Clock>,
    pipeline:   ValidationPipeline<Family>,
}

impl FamilyUseCaseImpl {
    pub fn new(
        repository: Arc<dyn FamilyRepository>,
        clock: Arc<dyn Clock>,
        policy: RulePolicy,
    ) -> Self {
        Self {
            repository,
            clock,
            pipeline: family_pipeline(&policy),
        }
    }

    /// 家族を作成する
    ///
    /// # Errors
    ///
    /// - `Validation`: 入力値・不変条件・パイプラインの違反
    /// - `Domain(FamilyAlreadyExists)`: 同じ ID の家族がすでに存在する
    /// - `Database`: 子がすでに別の家族に属している
    ///
    /// ID の重複確認と保存はリポジトリの `insert` で不可分に行う。
    pub async fn create_family(
        &self,
        cancel: &CancellationToken,
        input: CreateFamilyInput,
    ) -> Result<FamilyDto, CoreError> {
        ensure_not_cancelled(cancel)?;

        let family = Family::new(input.to_new_family(self.clock.now())?)?;

        self.pipeline
            .validate(&RuleContext::new(self.clock.now()), &family)?;
        self.repository
            .insert(&family)
            .await
            .map_err(|e| {
                let exists = matches!(
                    e.kind(),
                    InfraErrorKind::Conflict { entity, .. } if entity == "Family"
                );
                if exists {
                    return CoreError::from(DomainError::business_rule(
                        FamilyErrorCode::FamilyAlreadyExists,
                        format!("家族 {} はすでに存在します", family.id()),
                    ));
                }
                CoreError::from(e)
            })?;
        Ok(FamilyDto::from(&family))
    }

    /// 家族を取得する
    pub async fn get_family(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<FamilyDto, CoreError> {
        ensure_not_cancelled(cancel)?;
        let id = FamilyId::new(id)?;
        let family = self.load(cancel, &id).await?;
        Ok(FamilyDto::from(&family))
    }

    /// すべての家族を ID 順で取得する
    pub async fn get_all_families(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<FamilyDto>, CoreError> {
        ensure_not_cancelled(cancel)?;
        let families = until_cancelled(cancel, self.repository.find_all()).await?;
        Ok(families.iter().map(FamilyDto::from).collect())
    }

    /// 親を追加する
    ///
    /// # Errors
    ///
    /// - `Domain(TooManyParents | DuplicateParent)`
    /// - `Validation`: 親の年齢・子との年齢差、またはステータスと構成の不整合
    pub async fn add_parent(
        &self,
        cancel: &CancellationToken,
        input: AddParentInput,
    ) -> Result<FamilyDto, CoreError> {
        ensure_not_cancelled(cancel)?;
        let id = FamilyId::new(input.family_id)?;
        let parent = Parent::new(input.parent.to_person()?);
        let status = input
            .status
            .map(|s| s.parse::<FamilyStatus>())
            .transpose()?;

        let family = self.load(cancel, &id).await?;
        let now = self.clock.now();
        let mut updated = family.add_parent(parent, now)?;
        if let Some(status) = status {
            updated = updated.change_status(status)?;
        }

        self.persist(cancel, &updated).await?;
        Ok(FamilyDto::from(&updated))
    }

    /// ステータスを変更する
    pub async fn change_status(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        status: &str,
    ) -> Result<FamilyDto, CoreError> {
        ensure_not_cancelled(cancel)?;
        let id = FamilyId::new(family_id)?;
        let status: FamilyStatus = status.parse()?;

        let family = self.load(cancel, &id).await?;
        let updated = family.change_status(status)?;

        self.persist(cancel, &updated).await?;
        Ok(FamilyDto::from(&updated))
    }

    /// 子を追加する
    ///
    /// # Errors
    ///
    /// - `Domain(DuplicateChild)`: 同じ ID の子がすでに家族にいる
    /// - `Database`: 子がすでに別の家族に属している
    pub async fn add_child(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        child: PersonDto,
    ) -> Result<FamilyDto, CoreError> {
        ensure_not_cancelled(cancel)?;
        let id = FamilyId::new(family_id)?;
        let child = Child::new(child.to_person()?);

        let family = self.load(cancel, &id).await?;
        let updated = family.add_child(child, self.clock.now())?;

        self.persist(cancel, &updated).await?;
        Ok(FamilyDto::from(&updated))
    }

    /// 子を取り除く
    pub async fn remove_child(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        child_id: &str,
    ) -> Result<FamilyDto, CoreError> {
        ensure_not_cancelled(cancel)?;
        let id = FamilyId::new(family_id)?;
        let child_id = PersonId::new(child_id)?;

        let family = self.load(cancel, &id).await?;
        let updated = family.remove_child(&child_id)?;

        self.persist(cancel, &updated).await?;
        Ok(FamilyDto::from(&updated))
    }

    /// 親の死亡を登録する
    ///
    /// ステータスの遷移は集約が決める（婚姻中なら死別になる）。
    pub async fn mark_parent_deceased(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        parent_id: &str,
        death_date: DateTime<Utc>,
    ) -> Result<FamilyDto, CoreError> {
        ensure_not_cancelled(cancel)?;
        let id = FamilyId::new(family_id)?;
        let parent_id = PersonId::new(parent_id)?;

        let family = self.load(cancel, &id).await?;
        let updated = family.mark_parent_deceased(&parent_id, death_date, self.clock.now())?;

        self.persist(cancel, &updated).await?;
        Ok(FamilyDto::from(&updated))
    }

    /// 離婚により家族を 2 つに分割する
    ///
    /// 元の家族を先に保存する。移る子の所属が元の家族から外れてから
    /// 新しい家族を保存しないと、子の一意性インデックスと衝突するため。
    /// 2 回の保存は不可分ではなく、2 回目が失敗すると元の家族だけが更新された状態になる。
    ///
    /// キャンセルは保存の開始前にだけ確認する。1 回目の保存後は 2 回目まで必ず進める。
    pub async fn divorce(
        &self,
        cancel: &CancellationToken,
        input: DivorceInput,
    ) -> Result<DivorceOutput, CoreError> {
        ensure_not_cancelled(cancel)?;
        let id = FamilyId::new(input.family_id)?;
        let params = DivorceParams {
            new_family_id:       FamilyId::generate(),
            custodial_parent_id: PersonId::new(input.custodial_parent_id)?,
            child_ids:           input
                .child_ids
                .into_iter()
                .map(PersonId::new)
                .collect::<Result<_, _>>()?,
        };

        let family = self.load(cancel, &id).await?;
        let outcome = family.divorce(params)?;

        let ctx = RuleContext::new(self.clock.now());
        self.pipeline.validate(&ctx, &outcome.remaining)?;
        self.pipeline.validate(&ctx, &outcome.departed)?;

        ensure_not_cancelled(cancel)?;
        self.repository.save(&outcome.remaining).await?;
        self.repository.save(&outcome.departed).await?;

        Ok(DivorceOutput {
            original:   FamilyDto::from(&outcome.remaining),
            new_family: FamilyDto::from(&outcome.departed),
        })
    }

    /// 指定された人物を親に持つ家族を取得する
    pub async fn find_families_by_parent(
        &self,
        cancel: &CancellationToken,
        parent_id: &str,
    ) -> Result<Vec<FamilyDto>, CoreError> {
        ensure_not_cancelled(cancel)?;
        let parent_id = PersonId::new(parent_id)?;
        let families =
            until_cancelled(cancel, self.repository.find_by_parent_id(&parent_id)).await?;
        Ok(families.iter().map(FamilyDto::from).collect())
    }

    /// 指定された子が属する家族を取得する
    pub async fn find_family_by_child(
        &self,
        cancel: &CancellationToken,
        child_id: &str,
    ) -> Result<FamilyDto, CoreError> {
        ensure_not_cancelled(cancel)?;
        let child_id = PersonId::new(child_id)?;
        let family = until_cancelled(cancel, self.repository.find_by_child_id(&child_id))
            .await
            .or_not_found("子が属する家族", child_id.as_str())?;
        Ok(FamilyDto::from(&family))
    }

    /// 家族をまとめて作成する
    ///
    /// 1 件の失敗で全体を中断せず、レコードごとの結果を報告する。
    /// 途中でキャンセルされた場合は、それまでの結果に `cancelled` を立てて返す。
    ///
    /// # Errors
    ///
    /// - `Cancelled`: 開始時点ですでにキャンセルされている
    pub async fn import_families(
        &self,
        cancel: &CancellationToken,
        families: Vec<FamilyDto>,
    ) -> Result<ImportReport, CoreError> {
        ensure_not_cancelled(cancel)?;

        let mut report = ImportReport {
            imported:  Vec::new(),
            failed:    Vec::new(),
            cancelled: false,
        };
        for (index, dto) in families.into_iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let family_id = dto.id.clone();
            match self.create_family(cancel, dto.into()).await {
                Ok(created) => report.imported.push(created.id),
                Err(e) if e.is_cancelled() => {
                    report.cancelled = true;
                    break;
                }
                Err(e) => {
                    let e = e.with_use_case("create_family");
                    report.failed.push(ImportFailure {
                        index,
                        family_id,
                        kind: e.kind_name().to_string(),
                        code: e.domain_code().map(|code| code.to_string()),
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    async fn load(&self, cancel: &CancellationToken, id: &FamilyId) -> Result<Family, CoreError> {
        until_cancelled(cancel, self.repository.find_by_id(id))
            .await
            .or_not_found(FAMILY, id.as_str())
    }

    /// パイプラインで検証してから保存する
    async fn persist(&self, cancel: &CancellationToken, family: &Family) -> Result<(), CoreError> {
        self.pipeline
            .validate(&RuleContext::new(self.clock.now()), family)?;
        until_cancelled(cancel, self.repository.save(family)).await
    }
}
