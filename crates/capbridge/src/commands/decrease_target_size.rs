use capbridge_autoscalr::CapacityBridge;
use capbridge_cloud::NodeGroup;
use colored::Colorize;

pub async fn handle(bridge: &CapacityBridge, delta: i64) -> anyhow::Result<()> {
    bridge.decrease_target_size(delta).await?;

    println!(
        "{}",
        "ターゲットは変更されません。縮小は delete-nodes で行ってください".dimmed()
    );
    Ok(())
}
