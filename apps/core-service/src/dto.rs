//! # データ転送オブジェクト
//!
//! アプリケーションの利用者とやり取りする形式。ID は文字列、ステータスは
//! 小文字の文字列、日時は ISO 8601 で表現する。
//!
//! 集約 → DTO の変換は失敗しない。DTO → 集約の変換は値オブジェクトの検証を通る。

use chrono::{DateTime, Utc};
use familia_domain::{
    DomainError,
    family::Family,
    person::{FirstName, LastName, NewPerson, Person, PersonId},
};
use serde::{Deserialize, Serialize};

/// 人物（親・子）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDto {
    pub id:         String,
    pub first_name: String,
    pub last_name:  String,
    pub birth_date: DateTime<Utc>,
    #[serde(default)]
    pub death_date: Option<DateTime<Utc>>,
}

/// 家族
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyDto {
    pub id:       String,
    pub status:   String,
    pub parents:  Vec<PersonDto>,
    #[serde(default)]
    pub children: Vec<PersonDto>,
}

impl From<&Person> for PersonDto {
    fn from(person: &Person) -> Self {
        Self {
            id:         person.id().to_string(),
            first_name: person.first_name().as_str().to_string(),
            last_name:  person.last_name().as_str().to_string(),
            birth_date: person.birth_date(),
            death_date: person.death_date(),
        }
    }
}

impl From<&Family> for FamilyDto {
    fn from(family: &Family) -> Self {
        Self {
            id:       family.id().to_string(),
            status:   family.status().to_string(),
            parents:  family
                .parents()
                .iter()
                .map(|p| PersonDto::from(p.person()))
                .collect(),
            children: family
                .children()
                .iter()
                .map(|c| PersonDto::from(c.person()))
                .collect(),
        }
    }
}

impl PersonDto {
    /// 人物エンティティに変換する
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: ID・氏名が空、氏名が長すぎる、死亡日が生年月日以前
    pub fn to_person(&self) -> Result<Person, DomainError> {
        Person::new(NewPerson {
            id:         PersonId::new(self.id.as_str())?,
            first_name: FirstName::new(self.first_name.as_str())?,
            last_name:  LastName::new(self.last_name.as_str())?,
            birth_date: self.birth_date,
            death_date: self.death_date,
        })
    }
}

/// 一括インポートの結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// 作成された家族の ID（入力順）
    pub imported:  Vec<String>,
    /// 作成できなかったレコード
    pub failed:    Vec<ImportFailure>,
    /// キャンセルにより途中で打ち切られたか
    pub cancelled: bool,
}

/// インポートに失敗したレコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    /// 入力配列内の位置
    pub index:     usize,
    pub family_id: String,
    /// エラー種別（validation / domain / database など）
    pub kind:      String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code:      Option<String>,
    pub message:   String,
}
