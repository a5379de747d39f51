/// 文字列ベースの不透明な ID 型を定義する宣言型マクロ
///
/// 以下のボイラープレートを一括生成する:
/// - Newtype 構造体（`String` をラップ）
/// - `derive(Debug, Clone, PartialEq, Eq, Hash, Ord, Serialize, Deserialize, Display)`
/// - `new()`: trim + 空チェック付きで既存の ID から作成
/// - `generate()`: UUID v7 文字列で新規採番
/// - `as_str()`: 文字列参照
///
/// # 使用例
///
/// ```rust
/// use familia_domain::family::FamilyId;
///
/// let id = FamilyId::new("f1").unwrap();
/// assert_eq!(id.as_str(), "f1");
/// assert!(FamilyId::new("  ").is_err());
///
/// let generated = FamilyId::generate();
/// assert!(!generated.as_str().is_empty());
/// ```
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[serde(transparent)]
        #[display("{_0}")]
        $vis struct $Name(String);

        impl $Name {
            /// 既存の ID 文字列から作成する
            pub fn new(value: impl Into<String>) -> Result<Self, $crate::DomainError> {
                let value = value.into().trim().to_string();
                if value.is_empty() {
                    return Err($crate::DomainError::Validation(format!(
                        "{}は必須です",
                        $label
                    )));
                }
                Ok(Self(value))
            }

            /// 新しい ID を採番する（UUID v7）
            pub fn generate() -> Self {
                Self(uuid::Uuid::now_v7().to_string())
            }

            /// 文字列参照を取得する
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// 所有権を持つ文字列に変換する
            pub fn into_string(self) -> String {
                self.0
            }
        }
    };
}

/// バリデーション付き String Newtype を定義する宣言型マクロ（PII 保護）
///
/// 以下のボイラープレートを一括生成する:
/// - Newtype 構造体（`String` をラップ）
/// - `new()`: trim + 空チェック + 最大長チェック
/// - `as_str()`: 文字列参照
/// - `into_string()`: 所有権を持つ文字列に変換
/// - `Debug` 出力を `[REDACTED]` にマスクする（`Display` は生成しない）
///
/// # 引数
///
/// - `$label`: エラーメッセージに使うラベル（例: `"名"`）
/// - `$max_length`: 最大文字数（`chars().count()` でカウント）
///
/// # 使用例
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use familia_domain::person::FirstName;
///
/// let name = FirstName::new("  花子 ")?;
/// assert_eq!(name.as_str(), "花子");
/// assert!(format!("{:?}", name).contains("[REDACTED]"));
/// # Ok(())
/// # }
/// ```
macro_rules! define_personal_name {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:expr,
            max_length: $max_length:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl std::fmt::Debug for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($Name)).field(&"[REDACTED]").finish()
            }
        }

        impl $Name {
            pub fn new(value: impl Into<String>) -> Result<Self, $crate::DomainError> {
                let value = value.into().trim().to_string();

                if value.is_empty() {
                    return Err($crate::DomainError::Validation(format!(
                        "{}は必須です",
                        $label
                    )));
                }

                if value.chars().count() > $max_length {
                    return Err($crate::DomainError::Validation(format!(
                        "{}は {} 文字以内である必要があります",
                        $label, $max_length
                    )));
                }

                Ok(Self(value))
            }

            /// 文字列参照を取得する
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// 所有権を持つ文字列に変換する
            pub fn into_string(self) -> String {
                self.0
            }
        }
    };
}
