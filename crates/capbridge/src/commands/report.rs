use anyhow::Context;
use capbridge_autoscalr::{ClusterSnapshot, ClusterState, ClusterStateReporter};
use capbridge_config::BridgeConfig;
use colored::Colorize;
use std::path::Path;

pub async fn handle(config: &BridgeConfig, snapshot: &Path, strict: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(snapshot)
        .with_context(|| format!("スナップショットを読み込めません: {}", snapshot.display()))?;
    let snapshot: ClusterSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("スナップショットの形式が不正です: {}", snapshot.display()))?;

    let state = ClusterState::new(config, snapshot);
    println!(
        "クラスタ状態を送信中... (deployments: {}, nodes: {})",
        state.deployments.len(),
        state.nodes.len()
    );

    let reporter = ClusterStateReporter::new(config)?;
    match reporter.report(&state).await {
        Ok(_) => {
            println!("{}", "✓ 送信しました".green());
            Ok(())
        }
        Err(e) if strict => Err(e.into()),
        Err(e) => {
            tracing::warn!("Cluster state push failed: {}", e);
            println!("{} {}", "⚠ 送信に失敗しました:".yellow(), e);
            Ok(())
        }
    }
}
