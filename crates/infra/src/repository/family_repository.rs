//! # FamilyRepository
//!
//! 家族集約の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **ドキュメント形式**: 家族 1 件を JSON の [`FamilyDocument`] として保存する
//! - **子の一意性インデックス**: 子は同時に 1 つの家族にしか属せない。
//!   別の家族が所有する子を含む家族の保存は Conflict で失敗する
//! - **同一 ID への同時書き込み**: `save` は後勝ち。`insert` は既存の ID があれば
//!   Conflict で失敗し、確認と書き込みを 1 つのロック内で行う

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use familia_domain::{
    DomainError,
    family::{Family, FamilyId, FamilyRecord, FamilyStatus},
    person::{Child, FirstName, LastName, NewPerson, Parent, Person, PersonId},
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::InfraError;

/// 家族リポジトリトレイト
#[async_trait]
pub trait FamilyRepository: Send + Sync {
    /// ID で家族を検索する
    async fn find_by_id(&self, id: &FamilyId) -> Result<Option<Family>, InfraError>;

    /// 家族を保存する（同一 ID が存在すれば置き換える）
    ///
    /// # Errors
    ///
    /// - Conflict: 子がすでに別の家族に属している
    async fn save(&self, family: &Family) -> Result<(), InfraError>;

    /// 新しい家族を保存する（同一 ID が存在すれば失敗する）
    ///
    /// # Errors
    ///
    /// - Conflict(`Family`): 同じ ID の家族がすでに存在する
    /// - Conflict(`Child`): 子がすでに別の家族に属している
    async fn insert(&self, family: &Family) -> Result<(), InfraError>;

    /// すべての家族を ID 順で取得する
    async fn find_all(&self) -> Result<Vec<Family>, InfraError>;

    /// 指定された人物を親に持つ家族を取得する
    ///
    /// 離婚後の家族の系譜をたどれるよう、複数件を返しうる。
    async fn find_by_parent_id(&self, parent_id: &PersonId) -> Result<Vec<Family>, InfraError>;

    /// 指定された子が属する家族を取得する
    async fn find_by_child_id(&self, child_id: &PersonId) -> Result<Option<Family>, InfraError>;
}

/// 家族ドキュメント（永続化形式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyDocument {
    pub id:       String,
    pub status:   String,
    pub parents:  Vec<PersonDocument>,
    pub children: Vec<PersonDocument>,
}

/// 人物ドキュメント（永続化形式）
///
/// 日時は RFC 3339 文字列として保存される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDocument {
    pub id:         String,
    pub first_name: String,
    pub last_name:  String,
    pub birth_date: DateTime<Utc>,
    pub death_date: Option<DateTime<Utc>>,
}

impl From<&Person> for PersonDocument {
    fn from(person: &Person) -> Self {
        Self {
            id:         person.id().as_str().to_string(),
            first_name: person.first_name().as_str().to_string(),
            last_name:  person.last_name().as_str().to_string(),
            birth_date: person.birth_date(),
            death_date: person.death_date(),
        }
    }
}

impl From<&Family> for FamilyDocument {
    fn from(family: &Family) -> Self {
        Self {
            id:       family.id().as_str().to_string(),
            status:   family.status().as_str().to_string(),
            parents:  family
                .parents()
                .iter()
                .map(|p| PersonDocument::from(p.person()))
                .collect(),
            children: family
                .children()
                .iter()
                .map(|c| PersonDocument::from(c.person()))
                .collect(),
        }
    }
}

impl PersonDocument {
    fn into_person(self) -> Result<Person, InfraError> {
        let id = self.id.clone();
        restore_person(self).map_err(|e| {
            InfraError::unexpected(format!("保存された人物 {} を復元できません: {}", id, e))
        })
    }
}

fn restore_person(document: PersonDocument) -> Result<Person, DomainError> {
    Person::new(NewPerson {
        id:         PersonId::new(document.id)?,
        first_name: FirstName::new(document.first_name)?,
        last_name:  LastName::new(document.last_name)?,
        birth_date: document.birth_date,
        death_date: document.death_date,
    })
}

impl FamilyDocument {
    /// 集約に復元する
    ///
    /// # Errors
    ///
    /// - Unexpected: 保存されたドキュメントが集約の不変条件を満たさない
    pub fn into_family(self) -> Result<Family, InfraError> {
        let id = self.id.clone();
        let corrupted = |e: DomainError| {
            InfraError::unexpected(format!("保存された家族 {} を復元できません: {}", id, e))
        };

        let status: FamilyStatus = self.status.parse().map_err(corrupted)?;
        let parents = self
            .parents
            .into_iter()
            .map(|p| p.into_person().map(Parent::new))
            .collect::<Result<Vec<_>, _>>()?;
        let children = self
            .children
            .into_iter()
            .map(|c| c.into_person().map(Child::new))
            .collect::<Result<Vec<_>, _>>()?;

        Family::restore(FamilyRecord {
            id: FamilyId::new(self.id).map_err(corrupted)?,
            status,
            parents,
            children,
        })
        .map_err(corrupted)
    }
}

#[derive(Debug, Default)]
struct Store {
    /// 家族 ID → JSON ドキュメント
    documents:   BTreeMap<String, String>,
    /// 子 ID → 所属する家族 ID
    child_index: HashMap<String, String>,
}

/// インメモリ実装の FamilyRepository
///
/// 家族ごとに JSON ドキュメントを保持する参照実装。
/// クローンしたインスタンスは同じストアを共有する。
#[derive(Debug, Clone, Default)]
pub struct InMemoryFamilyRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryFamilyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// ID と子の一意性を確認してから書き込む
    async fn write(&self, family: &Family, replace: bool) -> Result<(), InfraError> {
        let document = FamilyDocument::from(family);
        let json = serde_json::to_string(&document)?;

        let mut store = self.store.write().await;
        if !replace && store.documents.contains_key(&document.id) {
            return Err(InfraError::conflict("Family", document.id));
        }
        for child in &document.children {
            match store.child_index.get(&child.id) {
                Some(owner) if owner != &document.id => {
                    return Err(InfraError::conflict("Child", child.id.clone()));
                }
                _ => {}
            }
        }

        store.child_index.retain(|_, owner| owner != &document.id);
        for child in &document.children {
            store
                .child_index
                .insert(child.id.clone(), document.id.clone());
        }
        store.documents.insert(document.id, json);
        Ok(())
    }
}

fn decode(json: &str) -> Result<Family, InfraError> {
    serde_json::from_str::<FamilyDocument>(json)?.into_family()
}

#[async_trait]
impl FamilyRepository for InMemoryFamilyRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &FamilyId) -> Result<Option<Family>, InfraError> {
        let store = self.store.read().await;
        store
            .documents
            .get(id.as_str())
            .map(|json| decode(json))
            .transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %family.id()))]
    async fn save(&self, family: &Family) -> Result<(), InfraError> {
        self.write(family, true).await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %family.id()))]
    async fn insert(&self, family: &Family) -> Result<(), InfraError> {
        self.write(family, false).await
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Family>, InfraError> {
        let store = self.store.read().await;
        store.documents.values().map(|json| decode(json)).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%parent_id))]
    async fn find_by_parent_id(&self, parent_id: &PersonId) -> Result<Vec<Family>, InfraError> {
        let store = self.store.read().await;
        let mut families = Vec::new();
        for json in store.documents.values() {
            let family = decode(json)?;
            if family.find_parent(parent_id).is_some() {
                families.push(family);
            }
        }
        Ok(families)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%child_id))]
    async fn find_by_child_id(&self, child_id: &PersonId) -> Result<Option<Family>, InfraError> {
        let store = self.store.read().await;
        store
            .child_index
            .get(child_id.as_str())
            .and_then(|family_id| store.documents.get(family_id))
            .map(|json| decode(json))
            .transpose()
    }
}
