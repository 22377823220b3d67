mod commands;

use capbridge_autoscalr::{BridgeProvider, CapacityBridge};
use capbridge_cloud::{StaticCloudProvider, StaticNodeGroup};
use capbridge_config::BridgeConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "capbridge")]
#[command(about = "ノード数のスケール操作を AutoScalr の vCPU ターゲットに橋渡しする", long_about = None)]
struct Cli {
    /// 設定ファイルのパス (省略時は CAPBRIDGE_CONFIG_PATH, ./capbridge.yaml の順に検索)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// デバッグログを出力
    #[arg(short, long, global = true)]
    verbose: bool,

    /// ノードグループの最小ノード数
    #[arg(long, global = true, default_value_t = 0)]
    min_size: usize,

    /// ノードグループの最大ノード数
    #[arg(long, global = true, default_value_t = 100)]
    max_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// AutoScalr にアプリ定義が存在するか確認
    Exist,
    /// 設定からアプリ定義を作成
    Create,
    /// アプリ定義を削除
    Delete,
    /// 現在のターゲットノード数を表示
    TargetSize,
    /// ターゲットノード数を増やす
    IncreaseSize {
        /// 追加するノード数 (1以上)
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// ターゲットノード数を減らす (AutoScalr では何もしない)
    DecreaseTargetSize {
        /// 減らすノード数
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// 指定したノードを削除
    DeleteNodes {
        /// プロバイダーID (例: aws:///us-east-1a/i-0abc)
        #[arg(required = true)]
        provider_ids: Vec<String>,
    },
    /// アプリ定義を JSON で表示
    Show,
    /// クラスタ状態を AutoScalr に送信
    Report {
        /// deployments / nodes を含む JSON ファイル
        #[arg(long)]
        snapshot: PathBuf,
        /// 送信失敗をエラーとして扱う
        #[arg(long)]
        strict: bool,
    },
    /// 組み込みのインスタンスタイプ一覧を表示
    InstanceTypes,
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrに出力（stdoutはコマンドの結果用）
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    // 設定不要なコマンド
    match cli.command {
        Commands::Version => {
            println!("capbridge {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::InstanceTypes => {
            commands::instance_types::handle();
            return Ok(());
        }
        _ => {}
    }

    let config = Arc::new(BridgeConfig::load(cli.config.as_deref())?);
    tracing::debug!("Resolved config: {:?}", config);

    if let Commands::Report { snapshot, strict } = &cli.command {
        return commands::report::handle(&config, snapshot, *strict).await;
    }

    let bridge = build_bridge(config, cli.min_size, cli.max_size)?;

    // コマンドディスパッチ
    match cli.command {
        Commands::Exist => commands::exist::handle(&bridge).await?,
        Commands::Create => commands::create::handle(&bridge).await?,
        Commands::Delete => commands::delete::handle(&bridge).await?,
        Commands::TargetSize => commands::target_size::handle(&bridge).await?,
        Commands::IncreaseSize { delta } => {
            commands::increase_size::handle(&bridge, delta).await?;
        }
        Commands::DecreaseTargetSize { delta } => {
            commands::decrease_target_size::handle(&bridge, delta).await?;
        }
        Commands::DeleteNodes { provider_ids } => {
            commands::delete_nodes::handle(&bridge, provider_ids).await?;
        }
        Commands::Show => commands::show::handle(&bridge).await?,
        Commands::Version | Commands::InstanceTypes | Commands::Report { .. } => {
            unreachable!("handled before bridge construction");
        }
    }

    Ok(())
}

/// 設定されたグループ1つだけを持つプロバイダーから bridge を組み立てる
fn build_bridge(
    config: Arc<BridgeConfig>,
    min_size: usize,
    max_size: usize,
) -> anyhow::Result<CapacityBridge> {
    if min_size > max_size {
        anyhow::bail!(
            "--min-size ({}) は --max-size ({}) 以下にしてください",
            min_size,
            max_size
        );
    }

    let underlying = StaticCloudProvider::new().with_group(StaticNodeGroup::new(
        config.group_id.clone(),
        min_size,
        max_size,
    ));
    let provider = BridgeProvider::new(Arc::new(underlying), config)?;

    provider.bridge().ok_or_else(|| {
        anyhow::anyhow!(
            "ノードグループ '{}' が見つかりません",
            provider.config().group_id
        )
    })
}
