//! 家族テストビルダー
//!
//! 固定時刻・インメモリリポジトリを使ったユースケースのセットアップと、
//! 標準的なテストデータを提供する。
//!
//! # 使用例
//!
//! ```ignore
//! let builder = FamilyTestBuilder::new();
//! let setup = builder.build();
//! setup.sut.create_family(&setup.cancel, builder.married_input("f1", &[])).await?;
//! ```

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use familia_core_service::{
    dto::PersonDto,
    usecase::{CreateFamilyInput, FamilyUseCaseImpl},
};
use familia_domain::{
    clock::FixedClock,
    family::{Family, FamilyId},
    person::PersonId,
    validation::RulePolicy,
};
use familia_infra::{
    InfraError,
    repository::{FamilyRepository, InMemoryFamilyRepository},
};
use tokio_util::sync::CancellationToken;

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn person(id: &str, first_name: &str, birth_date: DateTime<Utc>) -> PersonDto {
    PersonDto {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: "山田".to_string(),
        birth_date,
        death_date: None,
    }
}

/// 2010-03-12 生まれの子
pub fn child(id: &str) -> PersonDto {
    person(id, id, date(2010, 3, 12))
}

/// ビルドされたテスト環境
pub struct FamilyTestSetup {
    pub sut:        FamilyUseCaseImpl,
    /// `sut` と同じストアを共有するリポジトリ
    pub repository: InMemoryFamilyRepository,
    pub cancel:     CancellationToken,
}

/// 家族テストビルダー
pub struct FamilyTestBuilder {
    now:    DateTime<Utc>,
    policy: RulePolicy,
}

impl FamilyTestBuilder {
    pub fn new() -> Self {
        Self {
            now:    date(2024, 6, 1),
            policy: RulePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RulePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn build(&self) -> FamilyTestSetup {
        let repository = InMemoryFamilyRepository::new();
        FamilyTestSetup {
            sut: self.build_with(Arc::new(repository.clone())),
            repository,
            cancel: CancellationToken::new(),
        }
    }

    /// 任意のリポジトリでユースケースを組み立てる
    pub fn build_with(&self, repository: Arc<dyn FamilyRepository>) -> FamilyUseCaseImpl {
        FamilyUseCaseImpl::new(
            repository,
            Arc::new(FixedClock::new(self.now)),
            self.policy,
        )
    }

    /// P1（1980 年生）と P2（1982 年生）が婚姻中の家族
    pub fn married_input(&self, id: &str, children: &[&str]) -> CreateFamilyInput {
        CreateFamilyInput {
            id:       Some(id.to_string()),
            status:   "married".to_string(),
            parents:  vec![
                person("P1", "太郎", date(1980, 5, 15)),
                person("P2", "花子", date(1982, 8, 22)),
            ],
            children: children.iter().map(|id| child(id)).collect(),
        }
    }

    /// 指定された親 1 人（1985 年生）の家族
    pub fn single_parent_input(
        &self,
        id: &str,
        status: &str,
        parent_id: &str,
        children: &[&str],
    ) -> CreateFamilyInput {
        CreateFamilyInput {
            id:       Some(id.to_string()),
            status:   status.to_string(),
            parents:  vec![person(parent_id, "次郎", date(1985, 1, 1))],
            children: children.iter().map(|id| child(id)).collect(),
        }
    }
}

/// `save` が完了した直後にトークンをキャンセルするリポジトリ
///
/// 複数回の保存の途中でキャンセルされた場合の挙動を確認するために使う。
pub struct CancelOnSaveRepository {
    pub inner:  InMemoryFamilyRepository,
    pub cancel: CancellationToken,
}

#[async_trait]
impl FamilyRepository for CancelOnSaveRepository {
    async fn find_by_id(&self, id: &FamilyId) -> Result<Option<Family>, InfraError> {
        self.inner.find_by_id(id).await
    }

    async fn save(&self, family: &Family) -> Result<(), InfraError> {
        let result = self.inner.save(family).await;
        self.cancel.cancel();
        result
    }

    async fn insert(&self, family: &Family) -> Result<(), InfraError> {
        self.inner.insert(family).await
    }

    async fn find_all(&self) -> Result<Vec<Family>, InfraError> {
        self.inner.find_all().await
    }

    async fn find_by_parent_id(&self, parent_id: &PersonId) -> Result<Vec<Family>, InfraError> {
        self.inner.find_by_parent_id(parent_id).await
    }

    async fn find_by_child_id(&self, child_id: &PersonId) -> Result<Option<Family>, InfraError> {
        self.inner.find_by_child_id(child_id).await
    }
}
