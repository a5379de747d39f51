//! # 家族
//!
//! 家族集約（Family → Parent / Child）と、その状態遷移を管理する。
//!
//! ## 概念モデル
//!
//! - **Family**: 一貫性の境界となる集約ルート。1〜2 人の親と 0 人以上の子を持つ
//! - **FamilyStatus**: 構成員と整合しなければならないライフサイクル状態
//! - **invariants**: 集約とバリデーションルールが共有する不変条件の判定関数
//!
//! 状態遷移表は持たない。遷移は各操作（死亡登録・離婚・明示的な状態変更）の
//! 副作用として起こり、操作ごとに整合性を再検証してから新しいスナップショットを返す。
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use chrono::{TimeZone, Utc};
//! use familia_domain::{
//!     family::{Family, FamilyId, FamilyStatus, NewFamily},
//!     person::{FirstName, LastName, NewPerson, Parent, Person, PersonId},
//! };
//!
//! let parent = Parent::new(Person::new(NewPerson {
//!     id:         PersonId::new("p3")?,
//!     first_name: FirstName::new("花子")?,
//!     last_name:  LastName::new("佐藤")?,
//!     birth_date: Utc.with_ymd_and_hms(1985, 1, 1, 0, 0, 0).unwrap(),
//!     death_date: None,
//! })?);
//!
//! let family = Family::new(NewFamily {
//!     id:       FamilyId::new("f2")?,
//!     status:   FamilyStatus::Single,
//!     parents:  vec![parent],
//!     children: vec![],
//!     now:      Utc::now(),
//! })?;
//! assert_eq!(family.status(), FamilyStatus::Single);
//! # Ok(())
//! # }
//! ```

mod aggregate;
mod divorce;
pub mod invariants;
mod status;

pub use aggregate::*;
pub use divorce::*;
pub use status::*;
