//! # 人物（親・子）
//!
//! 家族の構成員を表すエンティティと、その値オブジェクトを定義する。
//!
//! 親と子は同じ形（氏名・生年月日・任意の死亡日）を持つため、共通部分を
//! [`Person`] にまとめ、役割の違いは [`Parent`] / [`Child`] の Newtype で
//! 型として区別する。親の配列に子を入れるような取り違えはコンパイル時に防がれる。
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use chrono::{TimeZone, Utc};
//! use familia_domain::person::{FirstName, LastName, NewPerson, Parent, Person, PersonId};
//!
//! let parent = Parent::new(Person::new(NewPerson {
//!     id:         PersonId::new("p1")?,
//!     first_name: FirstName::new("太郎")?,
//!     last_name:  LastName::new("山田")?,
//!     birth_date: Utc.with_ymd_and_hms(1980, 5, 15, 0, 0, 0).unwrap(),
//!     death_date: None,
//! })?);
//!
//! assert!(parent.is_living());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use derive_more::Deref;

use crate::DomainError;

define_string_id! {
    /// 人物 ID
    ///
    /// 親・子で共通の ID 空間を使う。
    pub struct PersonId {
        label: "人物 ID",
    }
}

define_personal_name! {
    /// 名
    pub struct FirstName {
        label: "名",
        max_length: 100,
    }
}

define_personal_name! {
    /// 姓
    pub struct LastName {
        label: "姓",
        max_length: 100,
    }
}

/// 人物の新規作成パラメータ
pub struct NewPerson {
    pub id:         PersonId,
    pub first_name: FirstName,
    pub last_name:  LastName,
    pub birth_date: DateTime<Utc>,
    pub death_date: Option<DateTime<Utc>>,
}

/// 人物エンティティ
///
/// # 不変条件
///
/// - 死亡日が設定されている場合、生年月日より後である
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    id:         PersonId,
    first_name: FirstName,
    last_name:  LastName,
    birth_date: DateTime<Utc>,
    death_date: Option<DateTime<Utc>>,
}

impl Person {
    /// 新しい人物を作成する
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 死亡日が生年月日以前の場合
    pub fn new(params: NewPerson) -> Result<Self, DomainError> {
        if let Some(death_date) = params.death_date {
            ensure_death_after_birth(params.birth_date, death_date)?;
        }

        Ok(Self {
            id:         params.id,
            first_name: params.first_name,
            last_name:  params.last_name,
            birth_date: params.birth_date,
            death_date: params.death_date,
        })
    }

    pub fn id(&self) -> &PersonId {
        &self.id
    }

    pub fn first_name(&self) -> &FirstName {
        &self.first_name
    }

    pub fn last_name(&self) -> &LastName {
        &self.last_name
    }

    pub fn birth_date(&self) -> DateTime<Utc> {
        self.birth_date
    }

    pub fn death_date(&self) -> Option<DateTime<Utc>> {
        self.death_date
    }

    pub fn is_living(&self) -> bool {
        self.death_date.is_none()
    }

    /// 氏名と生年月日が一致するか（同一人物の重複登録の検出用）
    pub fn has_same_identity(&self, other: &Person) -> bool {
        self.first_name == other.first_name
            && self.last_name == other.last_name
            && self.birth_date == other.birth_date
    }

    /// 死亡日を設定した新しい人物を返す
    fn deceased(&self, death_date: DateTime<Utc>) -> Result<Self, DomainError> {
        ensure_death_after_birth(self.birth_date, death_date)?;
        Ok(Self {
            death_date: Some(death_date),
            ..self.clone()
        })
    }
}

fn ensure_death_after_birth(
    birth_date: DateTime<Utc>,
    death_date: DateTime<Utc>,
) -> Result<(), DomainError> {
    if death_date <= birth_date {
        return Err(DomainError::Validation(format!(
            "死亡日（{}）は生年月日（{}）より後である必要があります",
            death_date.to_rfc3339(),
            birth_date.to_rfc3339()
        )));
    }
    Ok(())
}

/// 親
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct Parent(Person);

impl Parent {
    pub fn new(person: Person) -> Self {
        Self(person)
    }

    pub fn person(&self) -> &Person {
        &self.0
    }

    pub fn into_person(self) -> Person {
        self.0
    }

    /// 死亡日を設定した新しい親を返す
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 死亡日が生年月日以前の場合
    pub(crate) fn deceased(&self, death_date: DateTime<Utc>) -> Result<Self, DomainError> {
        self.0.deceased(death_date).map(Self)
    }
}

/// 子
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct Child(Person);

impl Child {
    pub fn new(person: Person) -> Self {
        Self(person)
    }

    pub fn person(&self) -> &Person {
        &self.0
    }

    pub fn into_person(self) -> Person {
        self.0
    }
}
