//! ユースケース層の共通ヘルパー
//!
//! キャンセルの確認、ポート呼び出しとキャンセルの競合、検索結果の変換など、
//! 複数のユースケースで繰り返されるパターンを共通化する。

use std::future::Future;

use familia_infra::InfraError;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// キャンセル済みなら処理を開始しない
pub(crate) fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), CoreError> {
    if cancel.is_cancelled() {
        return Err(CoreError::cancelled());
    }
    Ok(())
}

/// ポート呼び出しをキャンセルと競合させる
///
/// キャンセルが先に完了した場合、呼び出し中の future は破棄される。
pub(crate) async fn until_cancelled<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T, InfraError>>,
) -> Result<T, CoreError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CoreError::cancelled()),
        result = call => result.map_err(CoreError::from),
    }
}

/// 検索結果の `Result<Option<T>, CoreError>` を `Result<T, CoreError>` に変換する
///
/// ```ignore
/// let family = until_cancelled(cancel, self.repository.find_by_id(&id))
///     .await
///     .or_not_found("家族", id.as_str())?;
/// ```
pub(crate) trait FindResultExt<T> {
    /// `None` の場合は `CoreError::NotFound` を返す
    fn or_not_found(self, entity_name: &'static str, id: &str) -> Result<T, CoreError>;
}

impl<T> FindResultExt<T> for Result<Option<T>, CoreError> {
    fn or_not_found(self, entity_name: &'static str, id: &str) -> Result<T, CoreError> {
        self?.ok_or_else(|| CoreError::not_found(entity_name, id))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    // === FindResultExt ===

    #[test]
    fn test_or_not_found_ok_some_は値を返す() {
        let result: Result<Option<i32>, CoreError> = Ok(Some(42));

        assert_eq!(result.or_not_found("テスト", "t1").unwrap(), 42);
    }

    #[test]
    fn test_or_not_found_ok_none_はnotfoundエラーを返す() {
        let result: Result<Option<i32>, CoreError> = Ok(None);

        let err = result.or_not_found("家族", "f1").unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "家族が見つかりません: f1");
    }

    #[test]
    fn test_or_not_found_err_はエラーをそのまま返す() {
        let result: Result<Option<i32>, CoreError> = Err(CoreError::cancelled());

        assert!(result.or_not_found("家族", "f1").unwrap_err().is_cancelled());
    }

    // === キャンセル ===

    #[test]
    fn test_キャンセル済みなら開始しない() {
        let cancel = CancellationToken::new();
        assert!(ensure_not_cancelled(&cancel).is_ok());

        cancel.cancel();

        assert!(ensure_not_cancelled(&cancel).unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_完了した呼び出しの結果を返す() {
        let cancel = CancellationToken::new();

        let result = until_cancelled(&cancel, async { Ok::<_, InfraError>(7) }).await;

        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_インフラエラーはdatabaseに変換される() {
        let cancel = CancellationToken::new();

        let result = until_cancelled(&cancel, async {
            Err::<(), _>(InfraError::unexpected("壊れたドキュメント"))
        })
        .await;

        assert!(result.unwrap_err().is_database());
    }

    #[tokio::test]
    async fn test_呼び出し中にキャンセルされるとcancelledを返す() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = until_cancelled(&cancel, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, InfraError>(())
        })
        .await;

        assert!(result.unwrap_err().is_cancelled());
    }
}
