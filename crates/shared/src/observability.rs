//! # Observability 基盤
//!
//! トレーシング初期化とログ出力形式の設定を提供する。
//! 出力形式は JSON / Pretty を切り替えられる（値の読み込みは呼び出し側の設定で行う）。
//!
//! ログは標準エラー出力に書き出す。標準出力はバイナリの結果出力（JSON）に使う。

use std::str::FromStr;

use thiserror::Error;

/// 既定のフィルタ（`RUST_LOG` 未設定時）
pub const DEFAULT_FILTER: &str = "info,familia=debug";

/// ログ出力形式
///
/// 未設定の場合は [`Pretty`](LogFormat::Pretty) を使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON 形式（本番環境向け）
    Json,
    /// 人間が読みやすい形式（開発環境向け）
    #[default]
    Pretty,
}

/// 不明なログ形式
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("不明なログ形式です: {0:?}（json または pretty）")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(UnknownLogFormat(other.to_string())),
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// サービス名（ルートスパンの `service` フィールドに出力）
    pub service_name: String,
    /// ログ出力形式
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
        }
    }
}

/// トレーシングを初期化する
///
/// `RUST_LOG` 環境変数でログレベルを制御可能。未設定の場合は [`DEFAULT_FILTER`]。
///
/// `tracing_error::ErrorLayer` を登録するため、インフラ層のエラーが捕捉する
/// SpanTrace にはスパンの呼び出し経路が記録される。
///
/// 戻り値のスパンはサービス名を持つルートスパン。呼び出し元で `enter` する。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) -> tracing::Span {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();

    tracing::info_span!("app", service = %config.service_name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("pretty", LogFormat::Pretty)]
    #[case(" json ", LogFormat::Json)]
    fn test_既知の形式をパースできる(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(input.parse::<LogFormat>(), Ok(expected));
    }

    #[rstest]
    #[case("unknown")]
    #[case("")]
    #[case("JSON")]
    fn test_不正な値はエラーになる(#[case] input: &str) {
        assert_eq!(
            input.parse::<LogFormat>(),
            Err(UnknownLogFormat(input.trim().to_string()))
        );
    }

    #[test]
    fn test_defaultでprettyを返す() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }

    #[test]
    fn test_newでフィールドが正しく設定される() {
        let config = TracingConfig::new("familia-import", LogFormat::Json);

        assert_eq!(config.service_name, "familia-import");
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
