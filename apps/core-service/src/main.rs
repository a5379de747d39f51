//! # familia-import
//!
//! JSON ファイルから家族の記録を一括でインポートし、結果を標準出力に JSON で出力する。
//!
//! 入力は `FamilyDto` の配列。各レコードは家族管理ユースケースの作成処理と
//! 同じ検証を通り、失敗したレコードはレポートの `failed` に記録される。
//! Ctrl-C を受け取ると、処理中のレコードを最後にインポートを打ち切る。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `FAMILIA_MIN_PARENT_AGE` | No | 親の最低年齢（デフォルト: 18） |
//! | `FAMILIA_MIN_PARENT_CHILD_GAP` | No | 親子の最低年齢差（デフォルト: 12） |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | No | ログフィルタ |
//!
//! ## 起動方法
//!
//! ```bash
//! cargo run -p familia-core-service --bin familia-import -- families.json
//! ```

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use familia_core_service::{
    config::CoreConfig,
    dto::FamilyDto,
    usecase::{FamilyUseCase, FamilyUseCaseImpl, LoggingFamilyUseCase},
};
use familia_domain::clock::SystemClock;
use familia_infra::repository::InMemoryFamilyRepository;
use familia_shared::observability::{TracingConfig, init_tracing};
use tokio_util::sync::CancellationToken;

/// 家族の記録を JSON ファイルから一括インポートする
#[derive(Debug, Parser)]
#[command(name = "familia-import", version)]
struct Args {
    /// `FamilyDto` の配列を含む JSON ファイル
    path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = CoreConfig::from_env().context("設定の読み込みに失敗しました")?;

    let _guard = init_tracing(TracingConfig::new("familia-import", config.log_format)).entered();

    let input = fs::read_to_string(&args.path)
        .with_context(|| format!("{} を読み込めません", args.path.display()))?;
    let families: Vec<FamilyDto> = serde_json::from_str(&input)
        .with_context(|| format!("{} は家族の配列ではありません", args.path.display()))?;
    tracing::info!(count = families.len(), path = %args.path.display(), "インポートを開始します");

    let usecase = LoggingFamilyUseCase::new(FamilyUseCaseImpl::new(
        Arc::new(InMemoryFamilyRepository::new()),
        Arc::new(SystemClock),
        config.policy,
    ));

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("中断シグナルを受信しました");
            on_signal.cancel();
        }
    });

    let report = usecase.import_families(&cancel, families).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
